//! Sending side of the Discord connection.

use std::sync::{Arc, RwLock};

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tracing::debug;

use crate::bridge::outbound::DiscordOutbound;
use crate::common::error::{RelayError, RelayResult};

const NETWORK: &str = "Discord";

/// HTTP handle for posting into Discord channels.
///
/// Empty until the gateway reports ready.
#[derive(Default)]
pub struct DiscordHandle {
    http: RwLock<Option<Arc<Http>>>,
}

impl DiscordHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, http: Arc<Http>) {
        *self.http.write().unwrap_or_else(|e| e.into_inner()) = Some(http);
        debug!("Discord HTTP handle attached");
    }

    fn http(&self) -> Option<Arc<Http>> {
        self.http.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl DiscordOutbound for DiscordHandle {
    async fn send_message(&self, channel_id: u64, text: &str) -> RelayResult<()> {
        let http = self.http().ok_or(RelayError::NotConnected { network: NETWORK })?;
        if channel_id == 0 {
            return Err(RelayError::SendFailed {
                network: NETWORK,
                message: "channel id must be non-zero".to_string(),
            });
        }

        ChannelId::new(channel_id)
            .say(&http, text)
            .await
            .map(|_| ())
            .map_err(|e| RelayError::SendFailed {
                network: NETWORK,
                message: e.to_string(),
            })
    }
}
