//! Discord gateway client.
//!
//! Serenity calls the event handler concurrently; the handler only queues
//! events, and a single loop hands them to the relay in arrival order.

use std::sync::Arc;
use std::time::Duration;

use serenity::async_trait;
use serenity::gateway::ShardManager;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use serenity::Client;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bridge::Relay;
use crate::common::error::DiscordError;
use crate::common::DiscordMessage;
use crate::discord::handle::DiscordHandle;

/// How long the gateway gets to report ready at startup.
pub const READY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug)]
enum DiscordEvent {
    Ready(Ready),
    Message(Message),
}

struct GatewayEvents {
    events_tx: mpsc::UnboundedSender<DiscordEvent>,
    handle: Arc<DiscordHandle>,
}

#[async_trait]
impl EventHandler for GatewayEvents {
    async fn ready(&self, context: Context, ready: Ready) {
        self.handle.attach(context.http.clone());
        if let Err(error) = self.events_tx.send(DiscordEvent::Ready(ready)) {
            warn!("Failed to process discord event: {}", error);
        }
    }

    async fn message(&self, _context: Context, message: Message) {
        if let Err(error) = self.events_tx.send(DiscordEvent::Message(message)) {
            warn!("Failed to process discord event: {}", error);
        }
    }
}

pub struct DiscordBot {
    client: Client,
    events_rx: mpsc::UnboundedReceiver<DiscordEvent>,
    relay: Arc<Relay>,
}

impl DiscordBot {
    pub async fn new(
        token: &str,
        handle: Arc<DiscordHandle>,
        relay: Arc<Relay>,
    ) -> Result<Self, DiscordError> {
        let intents = GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let client = Client::builder(token, intents)
            .event_handler(GatewayEvents { events_tx, handle })
            .await?;

        Ok(Self {
            client,
            events_rx,
            relay,
        })
    }

    /// Open the gateway and wait for it to report ready.
    ///
    /// Failing to become ready within `READY_TIMEOUT` is fatal.
    pub async fn start(self) -> Result<RunningBot, DiscordError> {
        let shard_manager = self.client.shard_manager.clone();
        let (ready_tx, ready_rx) = oneshot::channel();

        info!("Connecting to Discord...");
        let mut task = tokio::spawn(self.run(ready_tx));

        let failure = tokio::select! {
            ready = tokio::time::timeout(READY_TIMEOUT, ready_rx) => match ready {
                Ok(Ok(())) => {
                    return Ok(RunningBot {
                        task,
                        shard_manager,
                    });
                }
                Ok(Err(_)) => "gateway closed before ready".to_string(),
                Err(_) => format!("no ready event within {}s", READY_TIMEOUT.as_secs()),
            },
            finished = &mut task => match finished {
                Ok(Err(e)) => e.to_string(),
                Ok(Ok(())) => "gateway closed before ready".to_string(),
                Err(e) => format!("Discord task failed: {}", e),
            },
        };

        shard_manager.shutdown_all().await;
        task.abort();
        Err(DiscordError::GatewayOpen { message: failure })
    }

    async fn run(mut self, ready_tx: oneshot::Sender<()>) -> Result<(), DiscordError> {
        let result = tokio::select! {
            result = self.client.start() => result.map_err(DiscordError::from),
            _ = Self::process_events(&mut self.events_rx, &self.relay, ready_tx) => Ok(()),
        };
        info!("Discord task ended");
        result
    }

    async fn process_events(
        events_rx: &mut mpsc::UnboundedReceiver<DiscordEvent>,
        relay: &Relay,
        ready_tx: oneshot::Sender<()>,
    ) {
        let mut ready_tx = Some(ready_tx);

        while let Some(event) = events_rx.recv().await {
            match event {
                DiscordEvent::Ready(ready) => {
                    info!("Discord bot connected as {}", ready.user.name);
                    if let Some(tx) = ready_tx.take() {
                        if tx.send(()).is_err() {
                            debug!("Nobody waiting for Discord ready signal");
                        }
                    }
                }
                DiscordEvent::Message(message) => {
                    relay.handle_discord(&to_discord_message(&message)).await;
                }
            }
        }
        debug!("Discord events channel closed.");
    }
}

/// A Discord session that has reported ready.
pub struct RunningBot {
    pub task: JoinHandle<Result<(), DiscordError>>,
    shard_manager: Arc<ShardManager>,
}

impl RunningBot {
    /// Close the gateway session.
    pub async fn close(&self) {
        info!("Initiating graceful Discord shutdown...");
        self.shard_manager.shutdown_all().await;
        info!("Discord shutdown complete");
    }
}

fn to_discord_message(message: &Message) -> DiscordMessage {
    DiscordMessage {
        author: message.author.name.clone(),
        author_is_bot: message.author.bot,
        channel_id: message.channel_id.get(),
        content: message.content.clone(),
    }
}
