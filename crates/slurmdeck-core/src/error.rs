// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Slurmdeck plugin core.

use thiserror::Error;

/// Boxed cause carried by wrapped plugin failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used by plugin traits and the plugin manager.
///
/// Structural violations (`DuplicateRegistration`, `NotFound`,
/// `MissingDependency`, ...) are raised before any state is touched.
/// Wrapped variants (`InitializationFailure`, `StartFailure`, ...) keep the
/// plugin's own error as their `source`.
#[derive(Debug, Error)]
pub enum SlurmdeckError {
    /// A plugin with this name is already registered.
    #[error("plugin `{name}` is already registered")]
    DuplicateRegistration { name: String },

    /// No plugin with this name is registered.
    #[error("plugin `{name}` not found")]
    NotFound { name: String },

    /// Enable was requested for a plugin that is already enabled.
    #[error("plugin `{name}` is already enabled")]
    AlreadyEnabled { name: String },

    /// Disable was requested for a plugin that is not enabled.
    #[error("plugin `{name}` is not enabled")]
    NotEnabled { name: String },

    /// A required plugin is not registered or not running.
    #[error("plugin `{plugin}` requires `{dependency}`, which is not running")]
    MissingDependency { plugin: String, dependency: String },

    /// An enabled plugin still requires the plugin being disabled.
    #[error("plugin `{plugin}` is required by enabled plugin `{dependent}`")]
    DependencyInUse { plugin: String, dependent: String },

    /// The plugin's `init` call failed.
    #[error("plugin `{name}` failed to initialize: {source}")]
    InitializationFailure { name: String, source: BoxError },

    /// The plugin's `start` call failed.
    #[error("plugin `{name}` failed to start: {source}")]
    StartFailure { name: String, source: BoxError },

    /// The plugin rejected a submitted configuration.
    #[error("invalid configuration for plugin `{name}`: {source}")]
    ConfigValidationFailure { name: String, source: BoxError },

    /// Applying a configuration failed; the previous configuration was restored.
    #[error("failed to apply configuration for plugin `{name}`: {source}")]
    ConfigApplyFailure { name: String, source: BoxError },

    /// A best-effort lifecycle hook failed.
    #[error("{hook} hook failed for plugin `{name}`: {source}")]
    HookFailure {
        name: String,
        hook: &'static str,
        source: BoxError,
    },

    /// An error raised by plugin code itself.
    #[error("plugin error: {message}")]
    Plugin {
        message: String,
        source: Option<BoxError>,
    },

    /// Configuration errors outside of a specific plugin.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SlurmdeckError {
    /// Shorthand for a plugin-originated error with no underlying cause.
    pub fn plugin(message: impl Into<String>) -> Self {
        SlurmdeckError::Plugin {
            message: message.into(),
            source: None,
        }
    }

    /// Plugin-originated error wrapping an underlying cause.
    pub fn plugin_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        SlurmdeckError::Plugin {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn wrapped_failures_expose_source() {
        let err = SlurmdeckError::StartFailure {
            name: "jobs".into(),
            source: Box::new(SlurmdeckError::plugin("socket closed")),
        };
        assert_eq!(
            err.to_string(),
            "plugin `jobs` failed to start: plugin error: socket closed"
        );
        let source = err.source().expect("source should be kept");
        assert_eq!(source.to_string(), "plugin error: socket closed");
    }

    #[test]
    fn dependency_errors_name_both_plugins() {
        let missing = SlurmdeckError::MissingDependency {
            plugin: "overlay".into(),
            dependency: "clock".into(),
        };
        assert!(missing.to_string().contains("`overlay`"));
        assert!(missing.to_string().contains("`clock`"));

        let in_use = SlurmdeckError::DependencyInUse {
            plugin: "clock".into(),
            dependent: "overlay".into(),
        };
        assert_eq!(
            in_use.to_string(),
            "plugin `clock` is required by enabled plugin `overlay`"
        );
    }

    #[test]
    fn plugin_with_source_chains() {
        let io = std::io::Error::other("disk gone");
        let err = SlurmdeckError::plugin_with_source("cache flush", io);
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("disk gone"));
    }
}
