//! Reconnection timing for the IRC leg.

use std::time::Duration;

use backon::BackoffBuilder;

/// How long the supervisor waits between IRC connection attempts.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Delay after a connection error.
    pub error_delay: Duration,
    /// Pause after a clean disconnect, to avoid hammering the server.
    pub disconnect_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            error_delay: Duration::from_secs(30),
            disconnect_delay: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    /// Unlimited backoff iterator for connection errors; every delay
    /// equals `error_delay`.
    pub fn error_backoff(&self) -> impl Iterator<Item = Duration> {
        backon::ConstantBuilder::default()
            .with_delay(self.error_delay)
            .without_max_times()
            .build()
    }
}
