// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hookable and lifecycle-aware capabilities.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::PluginContext;
use crate::error::SlurmdeckError;
use crate::types::{HookInfo, PluginConfig};

/// Callback registered against a named hook.
pub type HookCallback = Arc<dyn Fn(&serde_json::Value) -> Result<(), SlurmdeckError> + Send + Sync>;

/// Plugins exposing named extension points other code can attach to.
pub trait Hookable: Send + Sync {
    fn hooks(&self) -> Vec<HookInfo>;

    fn register_hook(&self, hook: &str, callback: HookCallback) -> Result<(), SlurmdeckError>;
}

/// Plugins that want to observe their own lifecycle transitions.
///
/// All three callbacks are best-effort: failures are logged by the manager
/// and never undo the transition, except `on_config_change`, whose failure
/// rolls the configuration back.
#[async_trait]
pub trait LifecycleAware: Send + Sync {
    async fn on_enable(&self, ctx: &PluginContext) -> Result<(), SlurmdeckError>;

    async fn on_disable(&self, ctx: &PluginContext) -> Result<(), SlurmdeckError>;

    async fn on_config_change(
        &self,
        ctx: &PluginContext,
        old: &PluginConfig,
        new: &PluginConfig,
    ) -> Result<(), SlurmdeckError>;
}
