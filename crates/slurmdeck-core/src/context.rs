// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellation context handed to plugin lifecycle calls.

use tokio_util::sync::CancellationToken;

/// Context passed to `init`, `start`, `stop` and lifecycle hooks.
///
/// During normal operation it carries the manager's lifetime token, which is
/// cancelled exactly once when the manager shuts down. Shutdown itself calls
/// `stop` with a [`background`](PluginContext::background) context so the
/// cancellation that triggered it cannot pre-empt the stop.
#[derive(Debug, Clone, Default)]
pub struct PluginContext {
    token: CancellationToken,
}

impl PluginContext {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// A fresh context that is not cancelled and never will be by the manager.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Token for spawning background work tied to this context.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// A child context cancelled together with this one.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}
