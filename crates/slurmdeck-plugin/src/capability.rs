// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability table computed once per plugin at registration.
//!
//! The manager never re-inspects a plugin to learn what it supports. It
//! consults the cached [`Capabilities`] and only then calls the matching
//! `Plugin::as_*` accessor to reach the interface.

use std::fmt;

use slurmdeck_core::Plugin;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// An optional interface a plugin may implement in addition to [`Plugin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    ViewProvider,
    OverlayProvider,
    DataProvider,
    Configurable,
    Hookable,
    LifecycleAware,
    Prioritizable,
    ResourceManaging,
}

impl Capability {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of capabilities a registered plugin satisfies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Probes every `as_*` accessor of `plugin` once.
    pub fn probe(plugin: &dyn Plugin) -> Self {
        let mut caps = Self::default();
        let probes = [
            (Capability::ViewProvider, plugin.as_view_provider().is_some()),
            (Capability::OverlayProvider, plugin.as_overlay_provider().is_some()),
            (Capability::DataProvider, plugin.as_data_provider().is_some()),
            (Capability::Configurable, plugin.as_configurable().is_some()),
            (Capability::Hookable, plugin.as_hookable().is_some()),
            (Capability::LifecycleAware, plugin.as_lifecycle_aware().is_some()),
            (Capability::Prioritizable, plugin.as_prioritizable().is_some()),
            (Capability::ResourceManaging, plugin.as_resource_manager().is_some()),
        ];
        for (capability, present) in probes {
            if present {
                caps.insert(capability);
            }
        }
        caps
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut caps = Self::default();
        for capability in iter {
            caps.insert(capability);
        }
        caps
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        let names: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn capability_names_roundtrip() {
        for capability in Capability::iter() {
            let parsed = Capability::from_str(&capability.to_string()).expect("should parse back");
            assert_eq!(capability, parsed);
        }
        assert_eq!(Capability::LifecycleAware.to_string(), "lifecycle_aware");
    }

    #[test]
    fn set_operations() {
        let caps: Capabilities = [Capability::Configurable, Capability::OverlayProvider]
            .into_iter()
            .collect();
        assert!(caps.contains(Capability::Configurable));
        assert!(caps.contains(Capability::OverlayProvider));
        assert!(!caps.contains(Capability::ViewProvider));
        assert_eq!(caps.iter().count(), 2);
        assert_eq!(caps.to_string(), "overlay_provider,configurable");
    }

    #[test]
    fn empty_set_displays_dash() {
        assert!(Capabilities::default().is_empty());
        assert_eq!(Capabilities::default().to_string(), "-");
    }
}
