// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configurable capability: runtime reconfiguration with validation.

use crate::error::SlurmdeckError;
use crate::traits::PluginView;
use crate::types::PluginConfig;

/// Plugins whose configuration can be inspected and replaced at runtime.
///
/// The manager always calls `validate_config` before `set_config`, and
/// re-applies the previous `get_config` value if a config-change hook fails.
pub trait Configurable: Send + Sync {
    fn get_config(&self) -> PluginConfig;

    fn set_config(&self, config: &PluginConfig) -> Result<(), SlurmdeckError>;

    fn validate_config(&self, config: &PluginConfig) -> Result<(), SlurmdeckError>;

    /// Optional editor screen for this plugin's settings.
    fn config_view(&self) -> Option<Box<dyn PluginView>> {
        None
    }
}
