//! SpawnBot - IRC-Discord chat bridge for QuakeNet
//!
//! Joins one IRC channel and one Discord channel and relays chat between
//! them, with a small set of bot commands on the IRC side.

mod bridge;
mod commands;
mod common;
mod config;
mod discord;
mod irc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::signal;
use tracing::{debug, error, info, warn};

use bridge::Relay;
use commands::builtin_dispatcher;
use common::error::AppError;
use common::{ReconnectPolicy, Shutdown};
use config::{load_and_validate, BridgeConfig};
use discord::{DiscordBot, DiscordHandle};
use irc::{IrcHandle, IrcSession, LinkState, Supervisor};

/// Message sent with the IRC QUIT on shutdown.
const QUIT_MESSAGE: &str = "Shutting down...";

/// How long the IRC session gets to finish after QUIT.
const IRC_QUIT_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("SpawnBot v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = load_and_validate().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Settings are read from SPAWNBOT_* environment variables.");
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  IRC Server: {}:{}", config.irc.server, config.irc.port);
    info!("  IRC Nick: {}", config.irc.nick);
    info!("  IRC Channel: {}", config.irc.channel);
    info!("  Discord Channel: {}", config.discord.channel_id);
    info!("  Command Prefix: {}", config.command_prefix);

    let config = Arc::new(config);
    let shutdown = Shutdown::new();
    let irc_handle = Arc::new(IrcHandle::new());

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown.trigger("signal");
        });
    }

    // ============================================================
    // Start Discord bot
    // ============================================================
    info!("Starting Discord bot...");
    let (relay, bot) = build(&config, &shutdown, irc_handle.clone()).await?;
    let mut discord = bot.start().await.map_err(|e| {
        error!("Failed to initialize Discord client - shutting down: {}", e);
        e
    })?;

    // ============================================================
    // Start IRC supervisor
    // ============================================================
    let session = IrcSession::new(config.clone(), irc_handle.clone(), relay);
    let supervisor = Supervisor::new(session, ReconnectPolicy::default(), shutdown.clone());
    let link_status = supervisor.status();
    let mut irc_task = tokio::spawn(supervisor.run());

    let discord_ended = tokio::select! {
        _ = shutdown.triggered() => false,
        finished = &mut discord.task => {
            match finished {
                Ok(Ok(())) => error!("Discord session ended unexpectedly"),
                Ok(Err(e)) => error!("Discord client error: {}", e),
                Err(e) => error!("Discord task panicked: {}", e),
            }
            shutdown.trigger("Discord session ended");
            true
        }
    };

    // ============================================================
    // Graceful shutdown: Discord first, then IRC
    // ============================================================
    info!("Shutting down...");
    discord.close().await;

    if link_status.get() == LinkState::Connected {
        if let Err(e) = irc_handle.quit(QUIT_MESSAGE) {
            warn!("Failed to send IRC QUIT: {}", e);
        }
    } else {
        debug!(state = ?link_status.get(), "IRC not connected, skipping QUIT");
    }
    match tokio::time::timeout(IRC_QUIT_TIMEOUT, &mut irc_task).await {
        Ok(Ok(())) => info!("IRC connection closed"),
        Ok(Err(e)) => warn!("IRC task panicked: {}", e),
        Err(_) => {
            warn!("IRC disconnect timed out");
            irc_task.abort();
        }
    }

    info!("Exiting...");
    if discord_ended {
        return Err(anyhow!("Discord session ended unexpectedly"));
    }
    Ok(())
}

/// Wire the relay to both network handles and create the Discord client.
async fn build(
    config: &Arc<BridgeConfig>,
    shutdown: &Shutdown,
    irc_handle: Arc<IrcHandle>,
) -> Result<(Arc<Relay>, DiscordBot), AppError> {
    let dispatcher = builtin_dispatcher(&config.command_prefix, shutdown.clone())?;
    let discord_handle = Arc::new(DiscordHandle::new());

    let relay = Arc::new(Relay::new(
        config.as_ref().into(),
        dispatcher,
        irc_handle,
        discord_handle.clone(),
        shutdown.clone(),
    ));
    let bot = DiscordBot::new(&config.discord.token, discord_handle, relay.clone()).await?;
    Ok((relay, bot))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
