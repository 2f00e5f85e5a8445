// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin trait definitions.
//!
//! [`Plugin`] is mandatory. Everything else is an optional capability a
//! plugin opts into through the matching `Plugin::as_*` accessor.

pub mod configurable;
pub mod data;
pub mod hooks;
pub mod overlay;
pub mod plugin;
pub mod resource;
pub mod view;

pub use configurable::Configurable;
pub use data::{DataCallback, DataProvider};
pub use hooks::{HookCallback, Hookable, LifecycleAware};
pub use overlay::{Overlay, OverlayProvider};
pub use plugin::Plugin;
pub use resource::{Prioritizable, ResourceManager};
pub use view::{PluginView, ViewProvider};
