//! Error types for the application.

use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Discord error: {0}")]
    Discord(#[from] DiscordError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Configuration-related errors. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not set")]
    MissingVar { name: String },

    #[error("Invalid value for '{name}': {message}")]
    InvalidValue { name: String, message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors raised while building the command table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Command '{name}' is already registered")]
    DuplicateCommand { name: String },

    #[error("Invalid command name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Invalid command prefix '{prefix}': {reason}")]
    InvalidPrefix { prefix: String, reason: &'static str },
}

/// Failure to deliver a single outbound message. Never fatal.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("{network} is not connected")]
    NotConnected { network: &'static str },

    #[error("Failed to send message to {network}: {message}")]
    SendFailed {
        network: &'static str,
        message: String,
    },
}

/// IRC connection errors. Recoverable through the reconnect loop.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Inbound line exceeded {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Server closed the link: {reason}")]
    ServerError { reason: String },

    #[error("Server did not complete registration within {seconds}s")]
    RegistrationTimeout { seconds: u64 },

    #[error("Connection closed by remote")]
    Closed,
}

/// Discord-related errors. Gateway open failures are fatal.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Discord gateway did not become ready: {message}")]
    GatewayOpen { message: String },

    #[error("Serenity error: {0}")]
    Serenity(#[from] serenity::Error),
}

/// Result type alias for connection operations.
pub type ConnectionResult<T> = std::result::Result<T, ConnectionError>;

/// Result type alias for outbound sends.
pub type RelayResult<T> = std::result::Result<T, RelayError>;
