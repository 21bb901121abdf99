//! Process-wide shutdown signal.
//!
//! One `Shutdown` is created at startup and cloned into every long-running
//! loop and event handler. It moves from live to triggered exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Set-once cancellation signal shared by the supervisor, relay and commands.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
    fired: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal.
    ///
    /// Returns `true` for the call that performed the transition and
    /// `false` for every later call.
    pub fn trigger(&self, reason: &str) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        info!(reason, "Shutdown requested");
        self.token.cancel();
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal has fired (immediately if it already has).
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }
}
