// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Slurmdeck plugin tests.
//!
//! Provides a scriptable plugin and a shared call journal for fast,
//! deterministic tests of the plugin manager without real plugins.
//!
//! # Components
//!
//! - [`MockPlugin`] - Plugin with switchable health, injectable failures and
//!   opt-in capabilities
//! - [`CallJournal`] - Ordered record of lifecycle calls across many plugins

pub mod journal;
pub mod mock_plugin;

pub use journal::CallJournal;
pub use mock_plugin::{Call, MockPlugin, MockPluginBuilder, noop_hook};
