// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde cannot express and reports every
//! problem at once instead of stopping at the first.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::SlurmdeckConfig;

/// Log levels accepted by `[logging] level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest accepted health check interval (one day).
pub const MAX_HEALTH_CHECK_INTERVAL_SECS: u64 = 86_400;

pub const MAX_RESTARTS_LIMIT: u32 = 100;

/// Validates a deserialized configuration, collecting all errors.
pub fn validate_config(config: &SlurmdeckConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    let plugins = &config.plugins;
    if plugins.health_check_interval_secs == 0 {
        errors.push(ConfigError::validation(
            "plugins.health_check_interval_secs must be greater than 0",
        ));
    } else if plugins.health_check_interval_secs > MAX_HEALTH_CHECK_INTERVAL_SECS {
        errors.push(ConfigError::validation(format!(
            "plugins.health_check_interval_secs must be at most {MAX_HEALTH_CHECK_INTERVAL_SECS}, got {}",
            plugins.health_check_interval_secs
        )));
    }

    if plugins.max_restarts > MAX_RESTARTS_LIMIT {
        errors.push(ConfigError::validation(format!(
            "plugins.max_restarts must be at most {MAX_RESTARTS_LIMIT}, got {}",
            plugins.max_restarts
        )));
    }

    let mut seen = HashSet::new();
    for (i, name) in plugins.enabled.iter().enumerate() {
        if name.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "plugins.enabled[{i}] must not be empty"
            )));
        } else if !seen.insert(name.as_str()) {
            errors.push(ConfigError::validation(format!(
                "duplicate plugin `{name}` in plugins.enabled"
            )));
        }
    }

    for (plugin, table) in &plugins.settings {
        if plugin.trim().is_empty() {
            errors.push(ConfigError::validation(
                "plugins.settings contains a table with an empty plugin name",
            ));
        }
        if table.keys().any(|key| key.trim().is_empty()) {
            errors.push(ConfigError::validation(format!(
                "plugins.settings.{plugin} contains an empty key"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn messages(config: &SlurmdeckConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&SlurmdeckConfig::default()).is_ok());
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = SlurmdeckConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = SlurmdeckConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(messages(&config)[0].contains("logging.level"));
    }

    #[test]
    fn interval_bounds() {
        let mut config = SlurmdeckConfig::default();
        config.plugins.health_check_interval_secs = 0;
        assert!(messages(&config)[0].contains("greater than 0"));

        config.plugins.health_check_interval_secs = MAX_HEALTH_CHECK_INTERVAL_SECS + 1;
        assert!(messages(&config)[0].contains("at most 86400"));

        config.plugins.health_check_interval_secs = MAX_HEALTH_CHECK_INTERVAL_SECS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = SlurmdeckConfig::default();
        config.logging.level = "loud".to_string();
        config.plugins.max_restarts = 1000;
        config.plugins.enabled = vec![
            "session-clock".to_string(),
            " ".to_string(),
            "session-clock".to_string(),
        ];
        config.plugins.settings.insert(
            "session-clock".to_string(),
            BTreeMap::from([(String::new(), serde_json::json!(1))]),
        );

        let all = messages(&config);
        assert_eq!(all.len(), 5, "{all:?}");
        assert!(all.iter().any(|m| m.contains("max_restarts")));
        assert!(all.iter().any(|m| m.contains("enabled[1]")));
        assert!(all.iter().any(|m| m.contains("duplicate plugin `session-clock`")));
        assert!(all.iter().any(|m| m.contains("empty key")));
    }
}
