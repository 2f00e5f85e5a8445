// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared, ordered record of plugin calls.
//!
//! Several mock plugins can write to one journal so tests can assert on the
//! relative order of calls across plugins (e.g. shutdown ordering).

use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to an append-only list of `"<plugin>:<call>"` entries.
#[derive(Debug, Clone, Default)]
pub struct CallJournal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `"<plugin>:<call>"`.
    pub fn record(&self, plugin: &str, call: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{plugin}:{call}"));
    }

    /// Snapshot of every entry in call order.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Entries for one kind of call (e.g. `"stop"`), as plugin names in order.
    pub fn calls(&self, call: &str) -> Vec<String> {
        let suffix = format!(":{call}");
        self.entries()
            .into_iter()
            .filter_map(|e| e.strip_suffix(&suffix).map(str::to_string))
            .collect()
    }

    /// Index of the first `"<plugin>:<call>"` entry.
    pub fn position(&self, plugin: &str, call: &str) -> Option<usize> {
        let needle = format!("{plugin}:{call}");
        self.entries().iter().position(|e| *e == needle)
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order_across_clones() {
        let journal = CallJournal::new();
        let other = journal.clone();
        journal.record("a", "start");
        other.record("b", "start");
        journal.record("a", "stop");

        assert_eq!(journal.entries(), vec!["a:start", "b:start", "a:stop"]);
        assert_eq!(journal.calls("start"), vec!["a", "b"]);
        assert_eq!(journal.position("a", "stop"), Some(2));
        assert_eq!(journal.position("b", "stop"), None);

        other.clear();
        assert!(journal.entries().is_empty());
    }
}
