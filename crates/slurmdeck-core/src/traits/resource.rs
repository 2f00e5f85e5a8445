// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prioritizable and resource-managing capabilities.

use crate::error::SlurmdeckError;
use crate::types::{ResourceLimits, ResourceUsage};

/// Plugins with a host-side ordering hint. Higher runs first.
///
/// The manager does not consult priorities; hosts use them to order views
/// and overlays.
pub trait Prioritizable: Send + Sync {
    fn priority(&self) -> i32;
}

/// Plugins that report and accept limits on their resource consumption.
pub trait ResourceManager: Send + Sync {
    fn resource_usage(&self) -> ResourceUsage;

    fn resource_limits(&self) -> ResourceLimits;

    fn set_resource_limits(&self, limits: ResourceLimits) -> Result<(), SlurmdeckError>;
}
