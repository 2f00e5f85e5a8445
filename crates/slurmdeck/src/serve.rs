// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `slurmdeck serve`: run the plugin manager until a shutdown signal.

use std::sync::Arc;

use tracing::{debug, info, warn};

use slurmdeck_config::SlurmdeckConfig;
use slurmdeck_core::{DataCallback, SlurmdeckError};
use slurmdeck_plugin::{Capability, EnableReport, PluginManager};

use crate::builtin::{self, session_clock};
use crate::shutdown::install_signal_handler;

/// Builds a manager from `config`, registers the built-ins and enables the
/// configured plugins. Enable failures are logged, not fatal.
pub async fn build_manager(config: &SlurmdeckConfig) -> Result<PluginManager, SlurmdeckError> {
    let manager = PluginManager::with_options(config.plugins.manager_options());
    builtin::register_builtins(&manager).await?;
    let report = enable_configured(&manager, config).await;
    for (name, error) in &report.failed {
        warn!(plugin = %name, error = %error, "plugin not enabled");
    }
    Ok(manager)
}

async fn enable_configured(manager: &PluginManager, config: &SlurmdeckConfig) -> EnableReport {
    manager
        .enable_all(
            config.plugins.enabled.iter().cloned(),
            &config.plugins.plugin_configs(),
        )
        .await
}

/// Logs every uptime update from running data providers at debug level.
async fn subscribe_uptime(manager: &PluginManager) {
    for plugin in manager.plugins_with(Capability::DataProvider).await {
        let Some(provider) = plugin.as_data_provider() else {
            continue;
        };
        let callback: DataCallback = Arc::new(|feed: &str, payload: &serde_json::Value| {
            debug!(feed, %payload, "data update");
        });
        if let Err(e) = provider.subscribe(session_clock::UPTIME_FEED, callback) {
            debug!(plugin = %plugin.info().name, error = %e, "no uptime feed");
        }
    }
}

pub async fn run_serve(config: SlurmdeckConfig) -> Result<(), SlurmdeckError> {
    init_tracing(&config.logging.level);

    let manager = build_manager(&config).await?;
    subscribe_uptime(&manager).await;
    manager.start_health_checks().await;

    let summary = manager.summary().await;
    info!(
        registered = summary.registered,
        enabled = summary.enabled,
        running = summary.running,
        interval_secs = config.plugins.health_check_interval_secs,
        "slurmdeck serving"
    );

    let shutdown = install_signal_handler();
    shutdown.cancelled().await;

    let report = manager.stop().await;
    info!(
        stopped = report.stopped.len(),
        stuck = report.stuck.len(),
        "slurmdeck stopped"
    );
    Ok(())
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise every `slurmdeck*` target logs at
/// `log_level` and everything else at `warn`.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let level = log_level.to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("slurmdeck={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
