// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `slurmdeck plugins`: print the plugin table.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use slurmdeck_config::SlurmdeckConfig;
use slurmdeck_core::SlurmdeckError;
use slurmdeck_plugin::PluginSummary;

use crate::serve::build_manager;

pub async fn run_plugins(config: SlurmdeckConfig) -> Result<(), SlurmdeckError> {
    let manager = build_manager(&config).await?;
    print!("{}", render_plugin_table(manager.list_plugins().await));
    manager.stop().await;
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Time since `start` as `1h02m`, `3m04s` or `12s`; `-` when not started.
fn format_since(start: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(start) = start else {
        return "-".to_string();
    };
    let secs = (now - start).num_seconds().max(0);
    match secs {
        s if s >= 3600 => format!("{}h{:02}m", s / 3600, (s / 60) % 60),
        s if s >= 60 => format!("{}m{:02}s", s / 60, s % 60),
        s => format!("{s}s"),
    }
}

/// Name-sorted table of plugin info, state and capabilities.
pub fn render_plugin_table(mut plugins: Vec<PluginSummary>) -> String {
    let now = Utc::now();
    plugins.sort_by(|a, b| a.info.name.cmp(&b.info.name));

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<8} {:<7} {:<7} {:<11} {:>8} {:>7}  {:<40} REQUIRES",
        "NAME", "VERSION", "ENABLED", "RUNNING", "HEALTH", "RESTARTS", "UPTIME", "CAPABILITIES"
    );
    for plugin in &plugins {
        let requires = if plugin.info.requires.is_empty() {
            "-".to_string()
        } else {
            plugin.info.requires.join(",")
        };
        let _ = writeln!(
            out,
            "{:<16} {:<8} {:<7} {:<7} {:<11} {:>8} {:>7}  {:<40} {}",
            plugin.info.name,
            plugin.info.version.to_string(),
            yes_no(plugin.state.enabled),
            yes_no(plugin.state.running),
            plugin.state.health.status.to_string(),
            plugin.state.restart_count,
            format_since(plugin.state.start_time, now),
            plugin.capabilities.to_string(),
            requires,
        );
        if let Some(error) = &plugin.state.last_error {
            let _ = writeln!(out, "  last error: {error}");
        }
    }
    out
}
