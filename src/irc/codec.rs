//! IRC line codec.
//!
//! Frames a TCP stream into `IrcLine`s. Only the message shape is handled
//! here (`[@tags] [:prefix] COMMAND params [:trailing]`); what the commands
//! mean is up to the session.

use std::fmt;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, Framed};
use tracing::debug;

use crate::common::error::ConnectionError;

/// Longest inbound line accepted: 512 bytes of message plus IRCv3 tags.
pub const MAX_LINE_LENGTH: usize = 8704;

/// RFC 1459 line limit, including the trailing CR-LF.
pub const MAX_MESSAGE_LENGTH: usize = 512;

/// Room left for the `:nick!user@host ` prefix servers add when relaying
/// our lines to other clients.
const SOURCE_PREFIX_RESERVE: usize = 100;

/// Most bytes of text a PRIVMSG to `target` can carry without the server
/// truncating it for other clients.
pub fn privmsg_text_limit(target: &str) -> usize {
    let overhead = SOURCE_PREFIX_RESERVE + "PRIVMSG ".len() + target.len() + " :".len() + "\r\n".len();
    MAX_MESSAGE_LENGTH.saturating_sub(overhead)
}

/// One parsed IRC protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcLine {
    /// `nick!user@host` or a server name, without the leading colon.
    pub prefix: Option<String>,
    /// Command word or three-digit numeric, upper-cased.
    pub command: String,
    pub params: Vec<String>,
}

impl IrcLine {
    pub fn new(command: &str, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command: command.to_string(),
            params,
        }
    }

    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", vec![target.to_string(), text.to_string()])
    }

    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", vec![channel.to_string()])
    }

    pub fn mode(target: &str, modes: &str) -> Self {
        Self::new("MODE", vec![target.to_string(), modes.to_string()])
    }

    pub fn nick(nick: &str) -> Self {
        Self::new("NICK", vec![nick.to_string()])
    }

    pub fn user(user: &str, realname: &str) -> Self {
        Self::new(
            "USER",
            vec![user.to_string(), "0".to_string(), "*".to_string(), realname.to_string()],
        )
    }

    pub fn pong(token: &str) -> Self {
        Self::new("PONG", vec![token.to_string()])
    }

    pub fn quit(message: &str) -> Self {
        Self::new("QUIT", vec![message.to_string()])
    }

    /// Parse a line with line endings already removed.
    ///
    /// Returns `None` for blank lines or lines without a command.
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_start();

        // IRCv3 message tags are not used by the bridge.
        if rest.starts_with('@') {
            rest = rest.split_once(' ').map(|(_, r)| r.trim_start())?;
        }

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, r) = stripped.split_once(' ')?;
                rest = r.trim_start();
                Some(prefix.to_string())
            }
            None => None,
        };

        let (command, mut rest) = match rest.split_once(' ') {
            Some((command, r)) => (command, r),
            None => (rest, ""),
        };
        if command.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((param, r)) => {
                    params.push(param.to_string());
                    rest = r;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Some(Self {
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    /// Nick part of a `nick!user@host` prefix.
    pub fn source_nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        Some(prefix.split(|c: char| c == '!' || c == '@').next().unwrap_or(prefix))
    }

    /// Host part of a `nick!user@host` prefix.
    pub fn source_host(&self) -> Option<&str> {
        self.prefix.as_deref()?.split_once('@').map(|(_, host)| host)
    }

    /// The last parameter, which carries the message text for PRIVMSG.
    pub fn trailing(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }
}

/// Drop characters that would end or corrupt the protocol line.
fn sanitize(param: &str) -> String {
    param.chars().filter(|&c| !matches!(c, '\r' | '\n' | '\0')).collect()
}

impl fmt::Display for IrcLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", sanitize(param))?;
            }
            let last = sanitize(last);
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }
        Ok(())
    }
}

/// Codec for IRC protocol lines.
///
/// Inbound bytes are decoded lossily so a single badly encoded line cannot
/// drop the connection.
#[derive(Debug, Default)]
pub struct IrcCodec {
    /// Index of the next byte to scan for a newline.
    next_index: usize,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for IrcCodec {
    type Item = IrcLine;
    type Error = ConnectionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > MAX_LINE_LENGTH {
                    return Err(ConnectionError::LineTooLong {
                        limit: MAX_LINE_LENGTH,
                    });
                }
                self.next_index = src.len();
                return Ok(None);
            };

            if self.next_index + offset > MAX_LINE_LENGTH {
                return Err(ConnectionError::LineTooLong {
                    limit: MAX_LINE_LENGTH,
                });
            }

            let raw = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            let text = String::from_utf8_lossy(&raw);
            let text = text.trim_end_matches(|c: char| c == '\r' || c == '\n');
            match IrcLine::parse(text) {
                Some(line) => return Ok(Some(line)),
                None if text.is_empty() => {}
                None => debug!(line = %text, "Skipping unparseable IRC line"),
            }
        }
    }
}

impl Encoder<IrcLine> for IrcCodec {
    type Error = ConnectionError;

    fn encode(&mut self, item: IrcLine, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let line = item.to_string();
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// A framed IRC server connection.
pub type IrcConnection<S> = Framed<S, IrcCodec>;

/// Create a new IRC connection from a stream.
pub fn new_irc_connection<S: AsyncRead + AsyncWrite>(stream: S) -> IrcConnection<S> {
    Framed::new(stream, IrcCodec::new())
}
