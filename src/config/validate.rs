//! Configuration validation.
//!
//! Validates configuration values and reports every problem at once.

use crate::common::error::ConfigError;
use crate::config::types::BridgeConfig;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &BridgeConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // IRC
    if config.irc.server.trim().is_empty() {
        errors.push("irc server is required".to_string());
    }
    if config.irc.port == 0 {
        errors.push("irc port must be non-zero".to_string());
    }
    if config.irc.nick.contains(char::is_whitespace) {
        errors.push(format!("irc nick '{}' must not contain whitespace", config.irc.nick));
    }
    if config.irc.user.contains(char::is_whitespace) {
        errors.push(format!("irc user '{}' must not contain whitespace", config.irc.user));
    }
    if !config.irc.channel.starts_with(|c: char| c == '#' || c == '&') {
        errors.push(format!(
            "irc channel '{}' must start with '#' or '&'",
            config.irc.channel
        ));
    }
    if config.irc.channel.contains(|c: char| c.is_whitespace() || c == ',') {
        errors.push(format!(
            "irc channel '{}' must not contain spaces or commas",
            config.irc.channel
        ));
    }

    // Discord
    if config.discord.token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord token has not been configured (still using placeholder)".to_string());
    }
    if config.discord.channel_id == 0 {
        errors.push("discord channel id must be non-zero".to_string());
    }

    // Commands
    if config.command_prefix.is_empty() {
        errors.push("command prefix must not be empty".to_string());
    }
    if config.command_prefix.contains(char::is_whitespace) {
        errors.push("command prefix must not contain whitespace".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn make_valid_config() -> BridgeConfig {
        BridgeConfig {
            irc: IrcConfig {
                server: "irc.quakenet.org".to_string(),
                port: 6667,
                nick: "SpawnBot".to_string(),
                user: "spawnbot".to_string(),
                name: "SpawnBot IRC Bridge".to_string(),
                channel: "#spawn".to_string(),
            },
            quakenet: QuakeNetConfig {
                auth_pass: "hunter2".to_string(),
            },
            discord: DiscordConfig {
                token: "valid_token_here".to_string(),
                channel_id: 987654321,
            },
            command_prefix: "!".to_string(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        let config = make_valid_config();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_port_fails() {
        let mut config = make_valid_config();
        config.irc.port = 0;

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("port"));
    }

    #[test]
    fn test_channel_without_hash_fails() {
        let mut config = make_valid_config();
        config.irc.channel = "spawn".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("must start with"));
    }

    #[test]
    fn test_placeholder_token_fails() {
        let mut config = make_valid_config();
        config.discord.token = "YOUR_DISCORD_TOKEN_HERE".to_string();

        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("placeholder"));
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = make_valid_config();
        config.irc.nick = "Spawn Bot".to_string();
        config.discord.channel_id = 0;

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("nick"));
        assert!(message.contains("channel id"));
    }
}
