// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The mandatory lifecycle trait every plugin implements.

use async_trait::async_trait;

use crate::context::PluginContext;
use crate::error::SlurmdeckError;
use crate::traits::{
    Configurable, DataProvider, Hookable, LifecycleAware, OverlayProvider, Prioritizable,
    ResourceManager, ViewProvider,
};
use crate::types::{HealthStatus, PluginConfig, PluginInfo};

/// The base trait for all Slurmdeck plugins.
///
/// Plugins are linked-in objects handed to the manager as `Arc<dyn Plugin>`;
/// every method takes `&self`, so implementations keep mutable state behind
/// their own locks or atomics.
///
/// Optional capabilities are exposed through the `as_*` accessors. Each
/// defaults to `None`; a plugin that implements, say, [`Configurable`]
/// overrides `as_configurable` to return `Some(self)`. The manager probes the
/// accessors once at registration and caches the result.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Static metadata. Read once when the plugin is registered.
    fn info(&self) -> PluginInfo;

    /// Prepares the plugin with its configuration. May be called again after
    /// a failed enable.
    async fn init(&self, ctx: &PluginContext, config: &PluginConfig)
        -> Result<(), SlurmdeckError>;

    async fn start(&self, ctx: &PluginContext) -> Result<(), SlurmdeckError>;

    async fn stop(&self, ctx: &PluginContext) -> Result<(), SlurmdeckError>;

    /// Reports current health. An `Err` is recorded as unhealthy.
    async fn health(&self) -> Result<HealthStatus, SlurmdeckError>;

    fn as_view_provider(&self) -> Option<&dyn ViewProvider> {
        None
    }

    fn as_overlay_provider(&self) -> Option<&dyn OverlayProvider> {
        None
    }

    fn as_data_provider(&self) -> Option<&dyn DataProvider> {
        None
    }

    fn as_configurable(&self) -> Option<&dyn Configurable> {
        None
    }

    fn as_hookable(&self) -> Option<&dyn Hookable> {
        None
    }

    fn as_lifecycle_aware(&self) -> Option<&dyn LifecycleAware> {
        None
    }

    fn as_prioritizable(&self) -> Option<&dyn Prioritizable> {
        None
    }

    fn as_resource_manager(&self) -> Option<&dyn ResourceManager> {
        None
    }
}
