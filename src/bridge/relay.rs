//! Relay coordinator that forwards chat between IRC and Discord.
//!
//! Runs inside each network's event loop. Filters self-authored and
//! command-prefixed messages, hands IRC lines to the command dispatcher,
//! and forwards everything else to the other network inside a relay
//! envelope.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::bridge::envelope::{format_envelope, split_envelope};
use crate::bridge::outbound::{DiscordOutbound, IrcOutbound};
use crate::commands::Dispatcher;
use crate::common::{DiscordMessage, IrcMessage, Network, Shutdown};
use crate::config::BridgeConfig;
use crate::irc::codec::privmsg_text_limit;

/// Name of the command that stops the bridge from the Discord side.
const DISCORD_DIE_COMMAND: &str = "die";

/// The identities and channels the relay works with.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Configured IRC nick. The live session may have registered a
    /// fallback; both count as our own for self-echo suppression.
    pub irc_nick: String,
    pub irc_channel: String,
    pub discord_channel_id: u64,
}

impl From<&BridgeConfig> for RelaySettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            irc_nick: config.irc.nick.clone(),
            irc_channel: config.irc.channel.clone(),
            discord_channel_id: config.discord.channel_id,
        }
    }
}

pub struct Relay {
    settings: RelaySettings,
    dispatcher: Dispatcher,
    irc: Arc<dyn IrcOutbound>,
    discord: Arc<dyn DiscordOutbound>,
    shutdown: Shutdown,
}

impl Relay {
    pub fn new(
        settings: RelaySettings,
        dispatcher: Dispatcher,
        irc: Arc<dyn IrcOutbound>,
        discord: Arc<dyn DiscordOutbound>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            settings,
            dispatcher,
            irc,
            discord,
            shutdown,
        }
    }

    /// Handle a PRIVMSG from IRC.
    ///
    /// Commands are dispatched for any target; relaying only happens for the
    /// bridge channel.
    pub async fn handle_irc(&self, msg: &IrcMessage) {
        if self.is_own_nick(&msg.source.name) {
            return;
        }

        self.dispatcher.dispatch(self.irc.as_ref(), msg);

        if !msg.target.eq_ignore_ascii_case(&self.settings.irc_channel) {
            return;
        }
        if self.dispatcher.is_prefixed(&msg.text) {
            return;
        }

        let envelope = format_envelope(Network::Irc, &msg.source.name, &msg.text);
        match self
            .discord
            .send_message(self.settings.discord_channel_id, &envelope)
            .await
        {
            Ok(()) => info!(
                source_irc_channel = %self.settings.irc_channel,
                irc_user = %msg.source.name,
                dest_discord_channel_id = self.settings.discord_channel_id,
                "Relayed message from IRC to Discord"
            ),
            Err(e) => error!(
                source_irc_channel = %self.settings.irc_channel,
                irc_user = %msg.source.name,
                dest_discord_channel_id = self.settings.discord_channel_id,
                "Error sending relayed message to Discord: {}",
                e
            ),
        }
    }

    /// Handle a message from the Discord gateway.
    pub async fn handle_discord(&self, msg: &DiscordMessage) {
        if msg.author_is_bot {
            return;
        }
        if msg.channel_id != self.settings.discord_channel_id {
            return;
        }

        if self.dispatcher.is_prefixed(&msg.content) {
            // Only the exact text `<prefix>die` stops the bridge from Discord.
            if msg.content.strip_prefix(self.dispatcher.prefix()) == Some(DISCORD_DIE_COMMAND) {
                info!(user = %msg.author, "Received 'die' command from Discord, initiating shutdown");
                self.shutdown.trigger("die command from Discord");
            }
            return;
        }

        // IRC has no line breaks and a 512-byte line limit; each line is
        // sent as one or more envelopes that fit.
        let limit = privmsg_text_limit(&self.settings.irc_channel);
        for line in msg.content.lines().filter(|l| !l.trim().is_empty()) {
            for envelope in split_envelope(Network::Discord, &msg.author, line, limit) {
                match self.irc.send_message(&self.settings.irc_channel, &envelope) {
                    Ok(()) => info!(
                        discord_user = %msg.author,
                        source_discord_channel_id = msg.channel_id,
                        dest_irc_channel = %self.settings.irc_channel,
                        "Relayed message from Discord to IRC"
                    ),
                    Err(e) => error!(
                        discord_user = %msg.author,
                        dest_irc_channel = %self.settings.irc_channel,
                        "Error sending relayed message to IRC: {}",
                        e
                    ),
                }
            }
        }

        if msg.content.trim().is_empty() {
            debug!(discord_user = %msg.author, "Skipping Discord message without text content");
        }
    }

    fn is_own_nick(&self, nick: &str) -> bool {
        nick.eq_ignore_ascii_case(&self.settings.irc_nick)
            || self
                .irc
                .current_nick()
                .is_some_and(|live| nick.eq_ignore_ascii_case(&live))
    }
}
