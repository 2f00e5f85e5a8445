// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency ordering for bulk enable.
//!
//! Kahn's algorithm over `Requires` edges restricted to the requested set.
//! Edges to plugins outside the set are ignored here; the manager's own
//! enable check reports them.

use std::collections::{HashMap, VecDeque};

/// Result of ordering a set of plugins by their dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnableOrder {
    /// Dependencies before dependents. Ties keep the caller's order.
    pub ordered: Vec<String>,
    /// Plugins caught in (or behind) a dependency cycle.
    pub cyclic: Vec<String>,
}

/// Orders `plugins` (name plus its `Requires`) so every dependency inside the
/// set precedes the plugins that need it.
pub fn dependency_order(plugins: &[(String, Vec<String>)]) -> EnableOrder {
    let index: HashMap<&str, usize> = plugins
        .iter()
        .enumerate()
        .map(|(i, (name, _))| (name.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; plugins.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
    for (i, (_, requires)) in plugins.iter().enumerate() {
        for dep in requires {
            match index.get(dep.as_str()) {
                // A plugin requiring itself can never be satisfied.
                Some(&d) if d == i => in_degree[i] += 1,
                Some(&d) => {
                    in_degree[i] += 1;
                    dependents[d].push(i);
                }
                None => {}
            }
        }
    }

    let mut queue: VecDeque<usize> = (0..plugins.len()).filter(|i| in_degree[*i] == 0).collect();
    let mut placed = vec![false; plugins.len()];
    let mut ordered = Vec::with_capacity(plugins.len());

    while let Some(i) = queue.pop_front() {
        placed[i] = true;
        ordered.push(plugins[i].0.clone());
        for &dependent in &dependents[i] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                queue.push_back(dependent);
            }
        }
    }

    let cyclic = plugins
        .iter()
        .zip(&placed)
        .filter(|(_, placed)| !**placed)
        .map(|((name, _), _)| name.clone())
        .collect();

    EnableOrder { ordered, cyclic }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugin(name: &str, requires: &[&str]) -> (String, Vec<String>) {
        (
            name.to_string(),
            requires.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn independent_plugins_keep_caller_order() {
        let order = dependency_order(&[plugin("c", &[]), plugin("a", &[]), plugin("b", &[])]);
        assert_eq!(order.ordered, vec!["c", "a", "b"]);
        assert!(order.cyclic.is_empty());
    }

    #[test]
    fn dependencies_come_first() {
        let order = dependency_order(&[
            plugin("overlay", &["clock", "jobs"]),
            plugin("jobs", &["clock"]),
            plugin("clock", &[]),
        ]);
        assert_eq!(order.ordered, vec!["clock", "jobs", "overlay"]);
    }

    #[test]
    fn external_dependencies_are_ignored() {
        let order = dependency_order(&[plugin("b", &["outside"]), plugin("a", &[])]);
        assert_eq!(order.ordered, vec!["b", "a"]);
    }

    #[test]
    fn cycles_are_reported_separately() {
        let order = dependency_order(&[
            plugin("a", &["b"]),
            plugin("b", &["a"]),
            plugin("c", &["a"]),
            plugin("d", &[]),
        ]);
        assert_eq!(order.ordered, vec!["d"]);
        assert_eq!(order.cyclic, vec!["a", "b", "c"]);
    }

    #[test]
    fn self_dependency_is_cyclic() {
        let order = dependency_order(&[plugin("loop", &["loop"])]);
        assert!(order.ordered.is_empty());
        assert_eq!(order.cyclic, vec!["loop"]);
    }
}
