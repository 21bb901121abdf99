//! Canonical inbound message types.
//!
//! Both network adapters convert their raw events into these types before
//! handing them to the relay, so the bridge core never sees protocol details.

use std::fmt;

/// The two bridged networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Irc,
    Discord,
}

impl Network {
    /// Tag used inside the relay envelope.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Irc => "IRC",
            Self::Discord => "DISCORD",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Identity of the sender of an IRC message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub name: String,
    pub host: String,
}

/// A PRIVMSG received from IRC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub source: Source,
    /// Channel name, or our own nick for private messages.
    pub target: String,
    pub text: String,
}

impl IrcMessage {
    /// Whether the message was sent to a channel rather than privately.
    pub fn is_from_channel(&self) -> bool {
        self.target
            .starts_with(|c: char| matches!(c, '#' | '&' | '+' | '!'))
    }

    /// Where a reply to this message should go.
    pub fn reply_target(&self) -> &str {
        if self.is_from_channel() {
            &self.target
        } else {
            &self.source.name
        }
    }
}

/// A message received from the Discord gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordMessage {
    pub author: String,
    /// Set for bot and application identities, including ourselves.
    pub author_is_bot: bool,
    pub channel_id: u64,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(target: &str) -> IrcMessage {
        IrcMessage {
            source: Source {
                name: "alice".to_string(),
                host: "example.org".to_string(),
            },
            target: target.to_string(),
            text: "hi".to_string(),
        }
    }

    #[test]
    fn test_reply_target_channel() {
        let msg = message("#test");
        assert!(msg.is_from_channel());
        assert_eq!(msg.reply_target(), "#test");
    }

    #[test]
    fn test_reply_target_private() {
        let msg = message("SpawnBot");
        assert!(!msg.is_from_channel());
        assert_eq!(msg.reply_target(), "alice");
    }

    #[test]
    fn test_network_tags() {
        assert_eq!(Network::Irc.to_string(), "IRC");
        assert_eq!(Network::Discord.to_string(), "DISCORD");
    }
}
