//! Outbound send contracts for the two networks.
//!
//! The relay and command handlers only talk to the networks through these
//! traits; the live implementations are `IrcHandle` and `DiscordHandle`.

use serenity::async_trait;

use crate::common::error::RelayResult;
use crate::common::IrcMessage;

/// Sending side of the IRC connection.
///
/// Sends are queued onto the live session and never block on the network.
pub trait IrcOutbound: Send + Sync {
    /// Send a PRIVMSG to a channel or nick.
    fn send_message(&self, target: &str, text: &str) -> RelayResult<()>;

    /// Answer `origin` where it came from: its channel, or the sender for
    /// private messages.
    fn reply(&self, origin: &IrcMessage, text: &str) -> RelayResult<()> {
        self.send_message(origin.reply_target(), text)
    }

    /// Nick the live session registered with, if there is one.
    fn current_nick(&self) -> Option<String> {
        None
    }
}

/// Sending side of the Discord connection.
#[async_trait]
pub trait DiscordOutbound: Send + Sync {
    async fn send_message(&self, channel_id: u64, text: &str) -> RelayResult<()>;
}
