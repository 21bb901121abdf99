//! Shared sending handle for the current IRC session.
//!
//! The supervisor replaces the session on every reconnect; the relay and
//! command handlers keep one `IrcHandle` for the whole process lifetime.

use std::sync::RwLock;

use tokio::sync::mpsc;
use tracing::debug;

use crate::bridge::outbound::IrcOutbound;
use crate::common::error::{RelayError, RelayResult};
use crate::irc::codec::IrcLine;

const NETWORK: &str = "IRC";

#[derive(Debug)]
struct LiveSession {
    tx: mpsc::UnboundedSender<IrcLine>,
    /// Nick the server accepted at registration.
    nick: String,
}

/// Queue into whichever IRC session is live, if any.
#[derive(Debug, Default)]
pub struct IrcHandle {
    live: RwLock<Option<LiveSession>>,
}

impl IrcHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route sends to a freshly registered session.
    pub fn attach(&self, tx: mpsc::UnboundedSender<IrcLine>, nick: &str) {
        *self.live.write().unwrap_or_else(|e| e.into_inner()) = Some(LiveSession {
            tx,
            nick: nick.to_string(),
        });
    }

    /// Stop routing sends; called when a session ends.
    pub fn detach(&self) {
        *self.live.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    #[allow(dead_code)]
    pub fn is_connected(&self) -> bool {
        self.live
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|live| !live.tx.is_closed())
    }

    pub fn send_line(&self, line: IrcLine) -> RelayResult<()> {
        let guard = self.live.read().unwrap_or_else(|e| e.into_inner());
        let live = guard
            .as_ref()
            .ok_or(RelayError::NotConnected { network: NETWORK })?;
        live.tx.send(line).map_err(|e| RelayError::SendFailed {
            network: NETWORK,
            message: format!("session closed before {} could be sent", e.0.command),
        })
    }

    /// Send a QUIT notice on the live session.
    pub fn quit(&self, message: &str) -> RelayResult<()> {
        debug!(message, "Queueing IRC QUIT");
        self.send_line(IrcLine::quit(message))
    }
}

impl IrcOutbound for IrcHandle {
    fn send_message(&self, target: &str, text: &str) -> RelayResult<()> {
        self.send_line(IrcLine::privmsg(target, text))
    }

    fn current_nick(&self) -> Option<String> {
        self.live
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|live| live.nick.clone())
    }
}
