//! Configuration type definitions.

use std::fmt;

/// Root configuration structure. Immutable after load.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub irc: IrcConfig,
    pub quakenet: QuakeNetConfig,
    pub discord: DiscordConfig,
    /// Leading sequence that marks a chat line as a bot command.
    pub command_prefix: String,
}

/// IRC server connection and bridge channel.
#[derive(Debug, Clone)]
pub struct IrcConfig {
    pub server: String,
    pub port: u16,
    pub nick: String,
    pub user: String,
    pub name: String,
    /// The bridged IRC channel, e.g. `#spawn`.
    pub channel: String,
}

/// QuakeNet Q service credentials. The account name is the IRC nick.
#[derive(Clone)]
pub struct QuakeNetConfig {
    pub auth_pass: String,
}

/// Discord bot configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    pub token: String,
    /// The bridged Discord channel.
    pub channel_id: u64,
}

impl fmt::Debug for QuakeNetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuakeNetConfig")
            .field("auth_pass", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}
