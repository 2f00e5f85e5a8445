// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! View-provider capability: plugins that contribute whole screens.

use async_trait::async_trait;

use crate::context::PluginContext;
use crate::error::SlurmdeckError;
use crate::types::ViewInfo;

/// A screen instantiated from a [`ViewProvider`].
///
/// Rendering belongs to the host's terminal layer; the plugin side only
/// supplies identity and refreshes its backing data.
#[async_trait]
pub trait PluginView: Send + Sync {
    fn id(&self) -> &str;

    fn title(&self) -> String;

    /// Reloads the data shown by this view.
    async fn refresh(&self) -> Result<(), SlurmdeckError>;
}

/// Plugins that enumerate and instantiate views.
pub trait ViewProvider: Send + Sync {
    fn views(&self) -> Vec<ViewInfo>;

    fn create_view(
        &self,
        view_id: &str,
        ctx: &PluginContext,
    ) -> Result<Box<dyn PluginView>, SlurmdeckError>;
}
