//! IRC connection supervisor.
//!
//! Keeps the IRC link alive until shutdown: connect, run the session until it
//! ends, wait out the reconnect delay, repeat.

use std::sync::Arc;

use serenity::async_trait;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::common::error::ConnectionResult;
use crate::common::{ReconnectPolicy, Shutdown};

/// Lifecycle of the IRC link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    ShuttingDown,
}

/// Observable link state, shared between the supervisor and its sessions.
#[derive(Debug, Clone)]
pub struct LinkStatus {
    tx: Arc<watch::Sender<LinkState>>,
}

impl LinkStatus {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LinkState::Disconnected);
        Self { tx: Arc::new(tx) }
    }

    pub fn set(&self, state: LinkState) {
        let previous = self.tx.send_replace(state);
        if previous != state {
            debug!(?previous, current = ?state, "IRC link state changed");
        }
    }

    pub fn get(&self) -> LinkState {
        *self.tx.borrow()
    }

    #[allow(dead_code)]
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.tx.subscribe()
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// One connection attempt to the IRC network.
#[async_trait]
pub trait IrcLink: Send + Sync {
    /// Connect and run a session until it ends.
    ///
    /// `Ok(())` is a clean disconnect; any error is a failed or broken
    /// connection. Implementations set `Connected` once registered.
    async fn connect(&self, status: &LinkStatus) -> ConnectionResult<()>;
}

pub struct Supervisor<L> {
    link: L,
    policy: ReconnectPolicy,
    shutdown: Shutdown,
    status: LinkStatus,
}

impl<L: IrcLink> Supervisor<L> {
    pub fn new(link: L, policy: ReconnectPolicy, shutdown: Shutdown) -> Self {
        Self {
            link,
            policy,
            shutdown,
            status: LinkStatus::new(),
        }
    }

    pub fn status(&self) -> LinkStatus {
        self.status.clone()
    }

    /// Run the reconnect loop until shutdown is triggered.
    pub async fn run(self) {
        let mut backoff = self.policy.error_backoff();

        loop {
            if self.shutdown.is_triggered() {
                info!("Shutdown signal detected, stopping IRC reconnection loop");
                break;
            }

            info!("Connecting to IRC...");
            self.status.set(LinkState::Connecting);
            let result = self.link.connect(&self.status).await;
            self.status.set(LinkState::Disconnected);

            if self.shutdown.is_triggered() {
                match result {
                    Ok(()) => info!("IRC disconnected during shutdown"),
                    Err(e) => debug!("IRC session ended during shutdown: {}", e),
                }
                break;
            }

            let delay = match result {
                Ok(()) => {
                    info!("IRC disconnected");
                    backoff = self.policy.error_backoff();
                    self.policy.disconnect_delay
                }
                Err(e) => {
                    error!("IRC connection error: {}", e);
                    backoff.next().unwrap_or(self.policy.error_delay)
                }
            };
            info!("Reconnecting to IRC in {:.1} seconds...", delay.as_secs_f64());

            tokio::select! {
                _ = sleep(delay) => {}
                _ = self.shutdown.triggered() => {
                    info!("Shutdown signal received during IRC reconnect wait");
                    break;
                }
            }
        }

        self.status.set(LinkState::ShuttingDown);
    }
}
