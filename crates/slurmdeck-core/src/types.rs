// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared types for the Slurmdeck plugin core.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::schema::ConfigSchema;

/// Opaque per-plugin configuration map.
pub type PluginConfig = HashMap<String, serde_json::Value>;

/// Static plugin metadata, read once at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: semver::Version,
    pub description: String,
    pub author: String,
    pub license: String,
    /// Names of plugins that must be running before this one may be enabled.
    pub requires: Vec<String>,
    /// Capability tags advertised to the host.
    pub provides: Vec<String>,
    pub config_schema: ConfigSchema,
}

impl PluginInfo {
    /// Metadata with the given name and version and everything else empty.
    pub fn new(name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            name: name.into(),
            version,
            description: String::new(),
            author: String::new(),
            license: String::new(),
            requires: Vec::new(),
            provides: Vec::new(),
            config_schema: ConfigSchema::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_requires<I, S>(mut self, requires: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires = requires.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_provides<I, S>(mut self, provides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.provides = provides.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_config_schema(mut self, schema: ConfigSchema) -> Self {
        self.config_schema = schema;
        self
    }

    /// Returns true if this plugin lists `name` in its `requires` set.
    pub fn depends_on(&self, name: &str) -> bool {
        self.requires.iter().any(|r| r == name)
    }
}

/// Coarse health label reported alongside the `healthy` flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Registered but never probed.
    Initialized,
    Healthy,
    /// Operational but impaired.
    Degraded,
    Unhealthy,
    Unknown,
}

/// Result of a plugin health probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub status: HealthState,
    pub message: String,
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn healthy(message: impl Into<String>) -> Self {
        Self::with_state(true, HealthState::Healthy, message)
    }

    /// Operational but impaired. Counts as healthy for supervision.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with_state(true, HealthState::Degraded, message)
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with_state(false, HealthState::Unhealthy, message)
    }

    /// Status seeded into a freshly registered plugin's state.
    pub fn initialized() -> Self {
        Self::with_state(false, HealthState::Initialized, "plugin registered")
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    fn with_state(healthy: bool, status: HealthState, message: impl Into<String>) -> Self {
        Self {
            healthy,
            status,
            message: message.into(),
            details: BTreeMap::new(),
        }
    }
}

/// Per-plugin runtime state, owned exclusively by the plugin manager.
///
/// `running` implies `enabled`. The converse does not hold: a plugin whose
/// supervised restart failed stays `enabled` with `running == false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginState {
    pub enabled: bool,
    pub running: bool,
    pub health: HealthStatus,
    pub last_error: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    /// Supervised restarts performed. Never reset.
    pub restart_count: u32,
}

impl PluginState {
    /// State seeded at registration.
    pub fn registered() -> Self {
        Self {
            enabled: false,
            running: false,
            health: HealthStatus::initialized(),
            last_error: None,
            start_time: None,
            restart_count: 0,
        }
    }
}

impl Default for PluginState {
    fn default() -> Self {
        Self::registered()
    }
}

/// Describes one view a view-provider can instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Suggested key binding, if any.
    pub shortcut: Option<String>,
}

/// Describes one overlay an overlay-provider can instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Views this overlay decorates (e.g. `jobs`, `nodes`).
    pub target_views: Vec<String>,
    pub priority: i32,
}

/// Where an overlay column is inserted into the host table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    Start,
    End,
    After(String),
}

/// An extra column contributed by an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayColumn {
    pub id: String,
    pub title: String,
    pub width: u16,
    pub position: ColumnPosition,
}

/// Styling hint for a single cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub bold: bool,
}

/// Describes one data feed exposed by a data-provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFeedInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    /// How often subscribers are notified, if the feed is periodic.
    pub refresh_interval: Option<Duration>,
}

/// Handle returned by `DataProvider::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// A named hook a hookable plugin exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookInfo {
    pub name: String,
    pub description: String,
}

/// Resource consumption reported by a resource-managing plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub memory_bytes: u64,
    pub cpu_percent: f32,
    pub background_tasks: u32,
    pub connections: u32,
    pub cache_bytes: u64,
}

/// Resource ceilings a host may impose on a plugin. `None` means unlimited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_memory_bytes: Option<u64>,
    pub max_cpu_percent: Option<f32>,
    pub max_background_tasks: Option<u32>,
    pub max_connections: Option<u32>,
    pub max_cache_bytes: Option<u64>,
}

impl ResourceLimits {
    /// Returns the names of every limit `usage` exceeds.
    pub fn exceeded_by(&self, usage: &ResourceUsage) -> Vec<&'static str> {
        let mut exceeded = Vec::new();
        if self.max_memory_bytes.is_some_and(|max| usage.memory_bytes > max) {
            exceeded.push("memory");
        }
        if self.max_cpu_percent.is_some_and(|max| usage.cpu_percent > max) {
            exceeded.push("cpu");
        }
        if self
            .max_background_tasks
            .is_some_and(|max| usage.background_tasks > max)
        {
            exceeded.push("background_tasks");
        }
        if self.max_connections.is_some_and(|max| usage.connections > max) {
            exceeded.push("connections");
        }
        if self.max_cache_bytes.is_some_and(|max| usage.cache_bytes > max) {
            exceeded.push("cache");
        }
        exceeded
    }
}
