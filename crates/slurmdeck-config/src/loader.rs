// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later wins:
//! 1. Compiled defaults
//! 2. `/etc/slurmdeck/slurmdeck.toml`
//! 3. `$XDG_CONFIG_HOME/slurmdeck/slurmdeck.toml`
//! 4. `./slurmdeck.toml`
//! 5. `SLURMDECK_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::SlurmdeckConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/slurmdeck/slurmdeck.toml";
pub const LOCAL_CONFIG_PATH: &str = "slurmdeck.toml";

/// `$XDG_CONFIG_HOME/slurmdeck/slurmdeck.toml`, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slurmdeck").join("slurmdeck.toml"))
}

/// The full layered Figment, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(SlurmdeckConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG_PATH)).merge(env_provider())
}

/// Loads configuration from the standard hierarchy plus environment.
pub fn load_config() -> Result<SlurmdeckConfig, figment::Error> {
    build_figment().extract()
}

/// Loads defaults, then `path` only, then environment overrides.
pub fn load_config_from_path(path: &Path) -> Result<SlurmdeckConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlurmdeckConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads defaults overlaid with `toml_content`. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<SlurmdeckConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SlurmdeckConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Maps `SLURMDECK_<SECTION>_<KEY>` onto `<section>.<key>`.
///
/// Only the section prefix is rewritten, so underscores inside key names
/// survive: `SLURMDECK_PLUGINS_MAX_RESTARTS` becomes `plugins.max_restarts`.
fn env_provider() -> Env {
    Env::prefixed("SLURMDECK_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    key.replacen("logging_", "logging.", 1)
        .replacen("plugins_", "plugins.", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_keep_inner_underscores() {
        assert_eq!(
            map_env_key("plugins_health_check_interval_secs"),
            "plugins.health_check_interval_secs"
        );
        assert_eq!(map_env_key("logging_level"), "logging.level");
    }

    #[test]
    fn user_path_ends_with_file_name() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("slurmdeck/slurmdeck.toml"));
        }
    }
}
