// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependency-safe shutdown.
//!
//! Plugins are stopped in passes. A plugin may stop once no other
//! not-yet-stopped plugin requires it, so dependents always stop before their
//! dependencies. Passes repeat until one makes no progress; anything left is
//! part of a dependency cycle and stays running.

use std::collections::HashSet;

use tracing::{info, warn};

use slurmdeck_core::PluginContext;

use crate::manager::PluginManager;
use crate::registry::RegisteredPlugin;

/// Outcome of [`PluginManager::stop`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Plugins whose `stop` was called, in call order.
    pub stopped: Vec<String>,
    /// Running plugins left alone because of a dependency cycle.
    pub stuck: Vec<String>,
}

impl PluginManager {
    /// Cancels the lifetime context, waits for the health supervisor and
    /// stops every running plugin, dependents first.
    ///
    /// Plugin `stop` calls get a fresh context that is not cancelled. Their
    /// errors are logged and otherwise ignored. Every plugin ends disabled,
    /// including crashed ones whose `stop` is not called again. Safe to call
    /// more than once.
    pub async fn stop(&self) -> ShutdownReport {
        self.shared.lifetime.cancel();

        let supervisor = self.shared.supervisor.lock().await.take();
        if let Some(handle) = supervisor
            && let Err(e) = handle.await
        {
            warn!(error = %e, "health supervisor ended abnormally");
        }

        let mut guard = self.shared.state.write().await;
        let st = &mut *guard;
        let ctx = PluginContext::background();
        let mut report = ShutdownReport::default();
        let mut pending: Vec<RegisteredPlugin> = st.registry.list_sorted();

        loop {
            let required: HashSet<String> = pending
                .iter()
                .flat_map(|entry| {
                    entry
                        .info
                        .requires
                        .iter()
                        .filter(move |dep| *dep != entry.name())
                        .cloned()
                })
                .collect();
            let (eligible, blocked): (Vec<_>, Vec<_>) = pending
                .into_iter()
                .partition(|entry| !required.contains(entry.name()));
            pending = blocked;
            if eligible.is_empty() {
                break;
            }

            for entry in eligible {
                let name = entry.name().to_string();
                if !st.states.get(&name).is_some_and(|s| s.running) {
                    // Crashed plugins are not stopped again, only disabled.
                    if let Some(state) = st.states.get_mut(&name) {
                        state.enabled = false;
                    }
                    continue;
                }
                let result = entry.plugin.stop(&ctx).await;
                let state = st.states.entry(name.clone()).or_default();
                if let Err(e) = result {
                    warn!(plugin = %name, error = %e, "plugin stop failed during shutdown");
                    state.last_error = Some(e.to_string());
                }
                state.running = false;
                state.enabled = false;
                info!(plugin = %name, "plugin stopped");
                report.stopped.push(name);
            }
        }

        report.stuck = pending
            .iter()
            .filter(|entry| st.states.get(entry.name()).is_some_and(|s| s.running))
            .map(|entry| entry.info.name.clone())
            .collect();
        if !report.stuck.is_empty() {
            warn!(plugins = ?report.stuck, "dependency cycle; plugins left running");
        }
        info!(stopped = report.stopped.len(), "plugin manager stopped");
        report
    }
}
