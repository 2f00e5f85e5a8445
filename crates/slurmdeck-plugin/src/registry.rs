// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Name-keyed store of plugin instances.
//!
//! The `PluginRegistry` holds one `RegisteredPlugin` per name: the shared
//! instance, the metadata read at registration, and the capability table
//! probed at the same moment. Lookups hand out clones so no map guard is ever
//! held across an `.await`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use slurmdeck_core::{Plugin, PluginInfo, SlurmdeckError};

use crate::capability::Capabilities;

/// A single entry in the plugin registry.
#[derive(Clone)]
pub struct RegisteredPlugin {
    pub plugin: Arc<dyn Plugin>,
    /// Metadata as reported by `Plugin::info` at registration.
    pub info: PluginInfo,
    pub capabilities: Capabilities,
    pub registered_at: DateTime<Utc>,
}

impl RegisteredPlugin {
    pub fn name(&self) -> &str {
        &self.info.name
    }
}

impl std::fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("name", &self.info.name)
            .field("version", &self.info.version)
            .field("capabilities", &self.capabilities)
            .field("registered_at", &self.registered_at)
            .finish()
    }
}

/// Registry of plugin instances keyed by name.
///
/// Safe to share between threads: concurrent `register` calls for the same
/// name resolve to exactly one winner.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: DashMap<String, RegisteredPlugin>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `plugin` under the name from its `info()`.
    ///
    /// Fails with `DuplicateRegistration` if the name is taken; the existing
    /// entry is left untouched.
    pub fn register(&self, plugin: Arc<dyn Plugin>) -> Result<RegisteredPlugin, SlurmdeckError> {
        let info = plugin.info();
        match self.entries.entry(info.name.clone()) {
            Entry::Occupied(_) => Err(SlurmdeckError::DuplicateRegistration { name: info.name }),
            Entry::Vacant(slot) => {
                let capabilities = Capabilities::probe(plugin.as_ref());
                let entry = RegisteredPlugin {
                    plugin,
                    info,
                    capabilities,
                    registered_at: Utc::now(),
                };
                slot.insert(entry.clone());
                Ok(entry)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<RegisteredPlugin> {
        self.entries.get(name).map(|e| e.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries in no particular order.
    pub fn list(&self) -> Vec<RegisteredPlugin> {
        self.entries.iter().map(|e| e.value().clone()).collect()
    }

    /// All entries sorted by name.
    pub fn list_sorted(&self) -> Vec<RegisteredPlugin> {
        let mut entries = self.list();
        entries.sort_by(|a, b| a.info.name.cmp(&b.info.name));
        entries
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    /// Removes and returns the entry for `name`.
    pub fn unregister(&self, name: &str) -> Result<RegisteredPlugin, SlurmdeckError> {
        self.entries
            .remove(name)
            .map(|(_, entry)| entry)
            .ok_or_else(|| SlurmdeckError::NotFound {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
