//! A single IRC connection: registration, QuakeNet login, channel join and
//! the read loop that feeds PRIVMSGs into the relay.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serenity::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::bridge::Relay;
use crate::common::error::{ConnectionError, ConnectionResult};
use crate::common::{IrcMessage, Source};
use crate::config::BridgeConfig;
use crate::irc::codec::{new_irc_connection, IrcConnection, IrcLine};
use crate::irc::handle::IrcHandle;
use crate::irc::supervisor::{IrcLink, LinkState, LinkStatus};

/// QuakeNet's account service.
const QUAKENET_SERVICE: &str = "Q@CServe.quakenet.org";

/// Pause between requesting the hidden host and joining, so the join is
/// not seen with the real host.
const JOIN_DELAY: Duration = Duration::from_secs(1);

const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(60);

const RPL_WELCOME: &str = "001";
const ERR_NICKNAMEINUSE: &str = "433";

struct SessionState {
    nick: String,
    registered: bool,
    quitting: bool,
    outbound: mpsc::UnboundedSender<IrcLine>,
}

/// Connects to the configured IRC server and runs one session per call.
pub struct IrcSession {
    config: Arc<BridgeConfig>,
    handle: Arc<IrcHandle>,
    relay: Arc<Relay>,
}

impl IrcSession {
    pub fn new(config: Arc<BridgeConfig>, handle: Arc<IrcHandle>, relay: Arc<Relay>) -> Self {
        Self {
            config,
            handle,
            relay,
        }
    }

    /// Run a session over an established stream until it ends.
    pub async fn run<S>(&self, stream: S, status: &LinkStatus) -> ConnectionResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let mut connection = new_irc_connection(stream);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = SessionState {
            nick: self.config.irc.nick.clone(),
            registered: false,
            quitting: false,
            outbound: tx,
        };

        let result = self
            .drive(&mut connection, &mut state, &mut rx, status)
            .await;
        self.handle.detach();
        result
    }

    async fn drive<S>(
        &self,
        connection: &mut IrcConnection<S>,
        state: &mut SessionState,
        outbound: &mut mpsc::UnboundedReceiver<IrcLine>,
        status: &LinkStatus,
    ) -> ConnectionResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let irc = &self.config.irc;
        connection.send(IrcLine::nick(&state.nick)).await?;
        connection.send(IrcLine::user(&irc.user, &irc.name)).await?;

        let registration = sleep(REGISTRATION_TIMEOUT);
        tokio::pin!(registration);

        loop {
            tokio::select! {
                inbound = connection.next() => {
                    match inbound {
                        Some(Ok(line)) => {
                            if self.handle_line(connection, state, status, line).await?.is_break() {
                                return Ok(());
                            }
                        }
                        Some(Err(e)) => return Err(e),
                        None if state.quitting => return Ok(()),
                        None => return Err(ConnectionError::Closed),
                    }
                }

                Some(line) = outbound.recv() => {
                    if line.command == "QUIT" {
                        state.quitting = true;
                    }
                    connection.send(line).await?;
                }

                _ = &mut registration, if !state.registered => {
                    return Err(ConnectionError::RegistrationTimeout {
                        seconds: REGISTRATION_TIMEOUT.as_secs(),
                    });
                }
            }
        }
    }

    async fn handle_line<S>(
        &self,
        connection: &mut IrcConnection<S>,
        state: &mut SessionState,
        status: &LinkStatus,
        line: IrcLine,
    ) -> ConnectionResult<ControlFlow<()>>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        match line.command.as_str() {
            "PING" => {
                let token = line.params.first().map(String::as_str).unwrap_or_default();
                connection.send(IrcLine::pong(token)).await?;
            }
            RPL_WELCOME => {
                if let Some(nick) = line.params.first() {
                    state.nick = nick.clone();
                }
                state.registered = true;
                info!(nick = %state.nick, "Connected to IRC server");
                status.set(LinkState::Connected);
                self.handle.attach(state.outbound.clone(), &state.nick);
                self.on_welcome(connection, state).await?;
            }
            ERR_NICKNAMEINUSE if !state.registered => {
                state.nick.push('_');
                warn!(nick = %state.nick, "Nickname in use, retrying");
                connection.send(IrcLine::nick(&state.nick)).await?;
            }
            "JOIN" => {
                if line
                    .source_nick()
                    .is_some_and(|nick| nick.eq_ignore_ascii_case(&state.nick))
                {
                    info!(channel = line.trailing().unwrap_or_default(), "Joined IRC channel");
                }
            }
            "PRIVMSG" => match to_irc_message(&line) {
                Some(msg) => self.relay.handle_irc(&msg).await,
                None => debug!(?line, "Ignoring PRIVMSG without sender"),
            },
            "ERROR" => {
                let reason = line.trailing().unwrap_or_default().to_string();
                if state.registered || state.quitting {
                    info!(reason = %reason, "IRC server closed the link");
                    return Ok(ControlFlow::Break(()));
                }
                return Err(ConnectionError::ServerError { reason });
            }
            _ => {}
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Log in to Q, hide the host, then join the bridge channel.
    async fn on_welcome<S>(
        &self,
        connection: &mut IrcConnection<S>,
        state: &SessionState,
    ) -> ConnectionResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let irc = &self.config.irc;

        // Q accounts are keyed by the configured nick, not a fallback one.
        let auth = format!("AUTH {} {}", irc.nick, self.config.quakenet.auth_pass);
        connection.send(IrcLine::privmsg(QUAKENET_SERVICE, &auth)).await?;
        connection.send(IrcLine::mode(&state.nick, "+x")).await?;
        debug!("Sent QuakeNet AUTH and host cloak request");

        sleep(JOIN_DELAY).await;
        connection.send(IrcLine::join(&irc.channel)).await?;
        Ok(())
    }
}

#[async_trait]
impl IrcLink for IrcSession {
    async fn connect(&self, status: &LinkStatus) -> ConnectionResult<()> {
        let irc = &self.config.irc;
        info!(server = %irc.server, port = irc.port, "Opening IRC connection");

        let stream = TcpStream::connect((irc.server.as_str(), irc.port))
            .await
            .map_err(|source| ConnectionError::ConnectFailed {
                host: irc.server.clone(),
                port: irc.port,
                source,
            })?;

        self.run(stream, status).await
    }
}

/// Convert a PRIVMSG line into the relay's message type.
fn to_irc_message(line: &IrcLine) -> Option<IrcMessage> {
    let [target, text] = line.params.as_slice() else {
        return None;
    };
    Some(IrcMessage {
        source: Source {
            name: line.source_nick()?.to_string(),
            host: line.source_host().unwrap_or_default().to_string(),
        },
        target: target.clone(),
        text: text.clone(),
    })
}
