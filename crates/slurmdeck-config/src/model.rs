// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use slurmdeck_core::PluginConfig;
use slurmdeck_plugin::ManagerOptions;

use crate::diagnostic::ConfigError;

/// Top-level Slurmdeck configuration.
///
/// Every section is optional and falls back to the compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SlurmdeckConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Plugin manager and per-plugin settings.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

impl SlurmdeckConfig {
    /// Effective configuration rendered back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Other(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[plugins]` section.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Seconds between health sweeps.
    #[serde(default = "default_health_check_interval_secs")]
    pub health_check_interval_secs: u64,

    /// Supervised restarts before an unhealthy plugin is disabled.
    #[serde(default = "default_max_restarts")]
    pub max_restarts: u32,

    /// Plugins to enable at startup. Order does not matter; dependencies are
    /// enabled first.
    #[serde(default)]
    pub enabled: Vec<String>,

    /// `[plugins.settings.<name>]` tables, handed to each plugin as its
    /// configuration map.
    #[serde(default)]
    pub settings: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            health_check_interval_secs: default_health_check_interval_secs(),
            max_restarts: default_max_restarts(),
            enabled: Vec::new(),
            settings: BTreeMap::new(),
        }
    }
}

impl PluginsConfig {
    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            health_check_interval: Duration::from_secs(self.health_check_interval_secs),
            max_restarts: self.max_restarts,
        }
    }

    /// Settings for `name`, empty if none are configured.
    pub fn plugin_config(&self, name: &str) -> PluginConfig {
        self.settings
            .get(name)
            .map(|table| table.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Settings for every configured plugin, keyed by plugin name.
    pub fn plugin_configs(&self) -> std::collections::HashMap<String, PluginConfig> {
        self.settings
            .keys()
            .map(|name| (name.clone(), self.plugin_config(name)))
            .collect()
    }
}

fn default_health_check_interval_secs() -> u64 {
    30
}

fn default_max_restarts() -> u32 {
    3
}
