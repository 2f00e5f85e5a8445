// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin registry, lifecycle manager, health supervisor and shutdown.
//!
//! Plugins are linked-in objects implementing [`slurmdeck_core::Plugin`].
//! The [`PluginManager`] registers them, enables and disables them subject
//! to their `requires` lists, keeps them healthy with bounded restarts, and
//! stops them dependents-first on shutdown.

pub mod capability;
pub mod manager;
pub mod ordering;
pub mod registry;
pub mod shutdown;
pub mod supervisor;

pub use capability::{Capabilities, Capability};
pub use manager::{EnableReport, ManagerOptions, ManagerSummary, PluginManager, PluginSummary};
pub use ordering::{EnableOrder, dependency_order};
pub use registry::{PluginRegistry, RegisteredPlugin};
pub use shutdown::ShutdownReport;
