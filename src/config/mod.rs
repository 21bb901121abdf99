//! Configuration loading and validation.

pub mod env;
pub mod types;
pub mod validate;

pub use env::load_config;
pub use types::*;
pub use validate::validate_config;

use crate::common::error::ConfigError;

/// Load configuration from the environment and validate it.
pub fn load_and_validate() -> Result<BridgeConfig, ConfigError> {
    let config = load_config()?;
    validate_config(&config)?;
    Ok(config)
}
