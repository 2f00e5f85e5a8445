// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data-provider capability: named feeds with subscribe and one-shot query.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SlurmdeckError;
use crate::types::{DataFeedInfo, PluginConfig, SubscriptionId};

/// Subscriber callback, invoked with the feed id and the new payload.
pub type DataCallback = Arc<dyn Fn(&str, &serde_json::Value) + Send + Sync>;

#[async_trait]
pub trait DataProvider: Send + Sync {
    fn data_feeds(&self) -> Vec<DataFeedInfo>;

    /// One-shot read of `feed` with optional query parameters.
    async fn query(
        &self,
        feed: &str,
        params: &PluginConfig,
    ) -> Result<serde_json::Value, SlurmdeckError>;

    fn subscribe(&self, feed: &str, callback: DataCallback)
        -> Result<SubscriptionId, SlurmdeckError>;

    fn unsubscribe(&self, id: SubscriptionId) -> Result<(), SlurmdeckError>;
}
