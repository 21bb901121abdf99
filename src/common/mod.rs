//! Common utilities and types shared across the application.

pub mod error;
pub mod messages;
pub mod reconnect;
pub mod shutdown;

pub use messages::{DiscordMessage, IrcMessage, Network, Source};
pub use reconnect::ReconnectPolicy;
pub use shutdown::Shutdown;
