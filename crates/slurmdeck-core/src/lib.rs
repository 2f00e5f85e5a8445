// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Slurmdeck plugin system.
//!
//! Defines the mandatory [`Plugin`] lifecycle trait, the optional capability
//! traits a plugin may additionally satisfy, the cancellation context passed
//! into plugin calls, and the error and data types shared by the plugin
//! manager and every plugin implementation.

pub mod context;
pub mod error;
pub mod schema;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use context::PluginContext;
pub use error::{BoxError, SlurmdeckError};
pub use schema::{ConfigField, ConfigSchema, FieldType, ValidationRule};
pub use types::{HealthState, HealthStatus, PluginConfig, PluginInfo, PluginState};

pub use traits::{
    Configurable, DataCallback, DataProvider, HookCallback, Hookable, LifecycleAware, Overlay,
    OverlayProvider, Plugin, PluginView, Prioritizable, ResourceManager, ViewProvider,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_capability_traits_are_object_safe() {
        // Fails to compile if any capability stops being usable as `dyn`.
        fn _plugin(_: &dyn Plugin) {}
        fn _view(_: &dyn ViewProvider) {}
        fn _overlay(_: &dyn OverlayProvider) {}
        fn _data(_: &dyn DataProvider) {}
        fn _configurable(_: &dyn Configurable) {}
        fn _hookable(_: &dyn Hookable) {}
        fn _lifecycle(_: &dyn LifecycleAware) {}
        fn _priority(_: &dyn Prioritizable) {}
        fn _resources(_: &dyn ResourceManager) {}
    }

    #[test]
    fn plugin_trait_objects_are_shareable() {
        fn _assert_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_send_sync::<dyn Plugin>();
        _assert_send_sync::<std::sync::Arc<dyn Plugin>>();
    }
}
