// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugins compiled into the host binary.

pub mod session_clock;
pub mod uptime_overlay;

use std::sync::Arc;

use slurmdeck_core::{Plugin, SlurmdeckError};
use slurmdeck_plugin::PluginManager;

pub use session_clock::SessionClock;
pub use uptime_overlay::UptimeOverlay;

/// Every built-in plugin, ready for registration.
pub fn builtin_plugins() -> Vec<Arc<dyn Plugin>> {
    let clock = Arc::new(SessionClock::new());
    let overlay = Arc::new(UptimeOverlay::new(Arc::clone(&clock)));
    vec![clock as Arc<dyn Plugin>, overlay]
}

/// Registers every built-in plugin with `manager`.
pub async fn register_builtins(manager: &PluginManager) -> Result<(), SlurmdeckError> {
    for plugin in builtin_plugins() {
        manager.register_plugin(plugin).await?;
    }
    Ok(())
}
