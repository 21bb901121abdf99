//! Discord side of the bridge.
//!
//! `client` owns the gateway session and feeds inbound messages to the
//! relay; `handle` is what the relay uses to post into Discord.

pub mod client;
pub mod handle;

pub use client::DiscordBot;
pub use handle::DiscordHandle;
