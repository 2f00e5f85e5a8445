// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Slurmdeck.
//!
//! TOML files layered with environment overrides, strict key checking
//! (`deny_unknown_fields`), semantic validation that reports every problem,
//! and miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use slurmdeck_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("health interval: {}s", config.plugins.health_check_interval_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{LoggingConfig, PluginsConfig, SlurmdeckConfig};
pub use validation::validate_config;

/// Loads the layered configuration and validates it.
///
/// Figment errors are turned into diagnostics pointing into whichever
/// config file they came from.
pub fn load_and_validate() -> Result<SlurmdeckConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Loads `path` (plus defaults and environment) and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<SlurmdeckConfig, Vec<ConfigError>> {
    if !path.exists() {
        return Err(vec![ConfigError::Other(format!(
            "config file {} does not exist",
            path.display()
        ))]);
    }
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Loads `toml_content` over the defaults and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SlurmdeckConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// `(path, content)` for every config file that exists, for error spans.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![Path::new(loader::SYSTEM_CONFIG_PATH).to_path_buf()];
    candidates.extend(loader::user_config_path());
    candidates.push(
        std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_PATH))
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_PATH.into()),
    );

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
