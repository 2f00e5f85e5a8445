// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic health supervision with bounded self-healing restarts.
//!
//! Each sweep polls every running plugin. An unhealthy plugin is restarted
//! (`stop` then `start`) while its restart count is below the budget; once
//! the budget is spent it is disabled and left alone.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::manager::{PluginManager, Shared, probe_health, running_entries};

/// Shortest sweep period; `interval_at` rejects a zero period.
pub const MIN_HEALTH_CHECK_INTERVAL: Duration = Duration::from_millis(10);

impl PluginManager {
    /// Spawns the periodic health supervisor.
    ///
    /// Does nothing if the supervisor is already running or the manager has
    /// been stopped. The first sweep happens one interval after this call.
    pub async fn start_health_checks(&self) {
        if self.is_shut_down() {
            debug!("manager is stopped; health checks not started");
            return;
        }
        let mut slot = self.shared.supervisor.lock().await;
        if slot.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("health supervisor already running");
            return;
        }

        let configured = self.shared.options.health_check_interval;
        let period = configured.max(MIN_HEALTH_CHECK_INTERVAL);
        if period != configured {
            warn!(
                configured = ?configured,
                period = ?period,
                "health check interval too short; clamped"
            );
        }
        let task = supervise(
            Arc::downgrade(&self.shared),
            self.shared.lifetime.clone(),
            period,
        );
        *slot = Some(tokio::spawn(task));
        info!(interval = ?period, "health supervisor started");
    }

    /// Runs one health sweep over every running plugin.
    ///
    /// Holds the manager's write lock for the whole sweep, so it never
    /// interleaves with enable, disable, reconfigure or stop. Skipped once
    /// the manager has been stopped.
    pub async fn run_health_sweep(&self) {
        if self.is_shut_down() {
            return;
        }
        let mut guard = self.shared.state.write().await;
        let st = &mut *guard;
        let ctx = self.lifetime_context();
        let max_restarts = self.shared.options.max_restarts;

        let running = running_entries(st);
        debug!(running = running.len(), "health sweep");

        for entry in running {
            let name = entry.name().to_string();
            let health = probe_health(entry.plugin.as_ref()).await;
            let state = st.states.entry(name.clone()).or_default();
            let healthy = health.healthy;
            state.health = health;
            if healthy {
                continue;
            }

            if state.restart_count >= max_restarts {
                state.running = false;
                state.enabled = false;
                error!(
                    plugin = %name,
                    restart_count = state.restart_count,
                    "restart budget exhausted; plugin disabled"
                );
                continue;
            }

            warn!(
                plugin = %name,
                restart_count = state.restart_count,
                message = %state.health.message,
                "plugin unhealthy; restarting"
            );
            if let Err(e) = entry.plugin.stop(&ctx).await {
                warn!(plugin = %name, error = %e, "stop before restart failed");
            }
            let started = entry.plugin.start(&ctx).await;
            let state = st.states.entry(name.clone()).or_default();
            match started {
                Ok(()) => {
                    state.restart_count += 1;
                    state.start_time = Some(Utc::now());
                    info!(plugin = %name, restart_count = state.restart_count, "plugin restarted");
                }
                Err(e) => {
                    warn!(plugin = %name, error = %e, "plugin restart failed");
                    state.running = false;
                    state.last_error = Some(e.to_string());
                }
            }
        }
    }
}

async fn supervise(shared: Weak<Shared>, lifetime: CancellationToken, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = lifetime.cancelled() => break,
            _ = ticker.tick() => {
                // The manager was dropped without being stopped.
                let Some(shared) = shared.upgrade() else { break };
                PluginManager { shared }.run_health_sweep().await;
            }
        }
    }
    debug!("health supervisor exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ManagerOptions;
    use slurmdeck_core::{PluginConfig, SlurmdeckError};
    use slurmdeck_test_utils::{Call, MockPlugin};

    async fn enabled(manager: &PluginManager, plugin: Arc<MockPlugin>) -> Arc<MockPlugin> {
        let name = plugin.name().to_string();
        manager.register_plugin(plugin.clone()).await.unwrap();
        manager.enable_plugin(&name, PluginConfig::new()).await.unwrap();
        plugin
    }

    #[tokio::test]
    async fn healthy_plugins_are_left_alone() {
        let manager = PluginManager::new();
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;

        manager.run_health_sweep().await;

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(state.health.healthy);
        assert_eq!(state.restart_count, 0);
        assert_eq!(plugin.calls(Call::Start), 1);
        assert_eq!(plugin.calls(Call::Health), 2);
    }

    #[tokio::test]
    async fn unhealthy_plugin_is_restarted() {
        let manager = PluginManager::new();
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;
        plugin.set_healthy(false);

        manager.run_health_sweep().await;

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(!state.health.healthy);
        assert_eq!(state.restart_count, 1);
        assert!(state.running && state.enabled);
        assert_eq!(plugin.calls(Call::Stop), 1);
        assert_eq!(plugin.calls(Call::Start), 2);
    }

    #[tokio::test]
    async fn failed_restart_leaves_plugin_enabled_but_not_running() {
        let manager = PluginManager::new();
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;
        plugin.set_healthy(false);
        plugin.fail(Call::Start, true);

        manager.run_health_sweep().await;

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(state.enabled);
        assert!(!state.running);
        assert_eq!(state.restart_count, 0);
        assert!(state.last_error.is_some());

        // Not running, so the next sweep does not touch it.
        manager.run_health_sweep().await;
        assert_eq!(plugin.calls(Call::Start), 2);
    }

    #[tokio::test]
    async fn erroring_health_probe_counts_as_unhealthy() {
        let manager = PluginManager::new();
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;
        plugin.fail(Call::Health, true);

        manager.run_health_sweep().await;

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(!state.health.healthy);
        assert!(state.health.message.contains("health failed"));
        assert_eq!(state.restart_count, 1);
    }

    #[tokio::test]
    async fn custom_budget_is_honoured() {
        let manager = PluginManager::with_options(ManagerOptions {
            max_restarts: 1,
            ..ManagerOptions::default()
        });
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;
        plugin.set_healthy(false);

        manager.run_health_sweep().await;
        manager.run_health_sweep().await;

        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert_eq!(state.restart_count, 1);
        assert!(!state.enabled && !state.running);
    }

    #[tokio::test]
    async fn sweeps_are_skipped_after_stop() {
        let manager = PluginManager::new();
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;
        manager.stop().await;
        let before = plugin.calls(Call::Health);

        manager.run_health_sweep().await;
        manager.start_health_checks().await;

        assert_eq!(plugin.calls(Call::Health), before);
        assert!(manager.shared.supervisor.lock().await.is_none());
    }

    #[tokio::test]
    async fn zero_interval_is_clamped_instead_of_panicking() {
        let manager = PluginManager::with_options(ManagerOptions {
            health_check_interval: Duration::ZERO,
            ..ManagerOptions::default()
        });
        let plugin = enabled(&manager, MockPlugin::new("jobs")).await;
        plugin.set_healthy(false);

        manager.start_health_checks().await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let alive = manager
            .shared
            .supervisor
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished());
        assert!(alive, "supervisor task should still be running");
        let state = manager.get_plugin_state("jobs").await.unwrap();
        assert!(state.restart_count >= 1);
        manager.stop().await;
    }

    #[tokio::test]
    async fn start_health_checks_is_idempotent() {
        let manager = PluginManager::new();
        manager.start_health_checks().await;
        manager.start_health_checks().await;
        assert!(manager.shared.supervisor.lock().await.is_some());

        let report = manager.stop().await;
        assert!(report.stopped.is_empty());
        assert!(manager.shared.supervisor.lock().await.is_none());
        assert!(matches!(
            manager.enable_plugin("none", PluginConfig::new()).await,
            Err(SlurmdeckError::NotFound { .. })
        ));
    }
}
