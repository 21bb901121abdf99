//! Configuration loading from environment variables.
//!
//! Required:
//! - `SPAWNBOT_IRC_SERVER` - IRC server host
//! - `SPAWNBOT_QNET_AUTH` (or legacy `QNET_AUTH`) - QuakeNet auth password
//! - `SPAWNBOT_DISCORD_TOKEN` (or legacy `SPAWNBOT_TOKEN`) - Discord bot token
//! - `SPAWNBOT_DISCORD_CHANNEL_ID` - bridged Discord channel ID
//! - `SPAWNBOT_IRC_CHANNEL` - bridged IRC channel
//!
//! Optional: `SPAWNBOT_IRC_PORT`, `SPAWNBOT_IRC_NICK`, `SPAWNBOT_IRC_USER`,
//! `SPAWNBOT_IRC_NAME`, `SPAWNBOT_COMMAND_PREFIX`.

use std::env;

use crate::common::error::ConfigError;
use crate::config::types::{BridgeConfig, DiscordConfig, IrcConfig, QuakeNetConfig};

/// Environment variable prefix for all settings.
const ENV_PREFIX: &str = "SPAWNBOT";

const DEFAULT_IRC_PORT: u16 = 6667;
const DEFAULT_IRC_NICK: &str = "SpawnBot";
const DEFAULT_IRC_USER: &str = "spawnbot";
const DEFAULT_IRC_NAME: &str = "SpawnBot IRC Bridge";
const DEFAULT_COMMAND_PREFIX: &str = "!";

/// Load configuration from the process environment.
pub fn load_config() -> Result<BridgeConfig, ConfigError> {
    load_config_from(|name| env::var(name).ok())
}

/// Load configuration using `lookup` to resolve variable names.
///
/// Empty values are treated the same as unset ones.
pub fn load_config_from<F>(lookup: F) -> Result<BridgeConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let vars = Vars { lookup };

    let server = vars.required("IRC_SERVER")?;
    let port = match vars.get(&var_name("IRC_PORT")) {
        Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
            name: var_name("IRC_PORT"),
            message: e.to_string(),
        })?,
        None => DEFAULT_IRC_PORT,
    };
    let nick = vars.or_default("IRC_NICK", DEFAULT_IRC_NICK);
    let user = vars.or_default("IRC_USER", DEFAULT_IRC_USER);
    let name = vars.or_default("IRC_NAME", DEFAULT_IRC_NAME);

    let auth_pass = vars.required_with_fallback("QNET_AUTH", "QNET_AUTH")?;
    let token = vars.required_with_fallback("DISCORD_TOKEN", "SPAWNBOT_TOKEN")?;

    let raw_channel_id = vars.required("DISCORD_CHANNEL_ID")?;
    let channel_id = raw_channel_id
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidValue {
            name: var_name("DISCORD_CHANNEL_ID"),
            message: format!("'{}' is not a numeric channel ID ({})", raw_channel_id, e),
        })?;

    let channel = vars.required("IRC_CHANNEL")?;
    let command_prefix = vars.or_default("COMMAND_PREFIX", DEFAULT_COMMAND_PREFIX);

    Ok(BridgeConfig {
        irc: IrcConfig {
            server,
            port,
            nick,
            user,
            name,
            channel,
        },
        quakenet: QuakeNetConfig { auth_pass },
        discord: DiscordConfig { token, channel_id },
        command_prefix,
    })
}

fn var_name(suffix: &str) -> String {
    format!("{}_{}", ENV_PREFIX, suffix)
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn required(&self, suffix: &str) -> Result<String, ConfigError> {
        let name = var_name(suffix);
        self.get(&name).ok_or(ConfigError::MissingVar { name })
    }

    /// Prefixed variable first, then a legacy name kept for older deployments.
    fn required_with_fallback(&self, suffix: &str, legacy: &str) -> Result<String, ConfigError> {
        let name = var_name(suffix);
        self.get(&name)
            .or_else(|| self.get(legacy))
            .ok_or_else(|| ConfigError::MissingVar {
                name: format!("{} or {}", name, legacy),
            })
    }

    fn or_default(&self, suffix: &str, default: &str) -> String {
        self.get(&var_name(suffix))
            .unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn required_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SPAWNBOT_IRC_SERVER", "irc.quakenet.org"),
            ("SPAWNBOT_QNET_AUTH", "hunter2"),
            ("SPAWNBOT_DISCORD_TOKEN", "token"),
            ("SPAWNBOT_DISCORD_CHANNEL_ID", "123456789012345678"),
            ("SPAWNBOT_IRC_CHANNEL", "#spawn"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<BridgeConfig, ConfigError> {
        load_config_from(|name| vars.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(ENV_PREFIX, "SPAWNBOT");
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&required_vars()).unwrap();

        assert_eq!(config.irc.server, "irc.quakenet.org");
        assert_eq!(config.irc.port, 6667);
        assert_eq!(config.irc.nick, "SpawnBot");
        assert_eq!(config.irc.user, "spawnbot");
        assert_eq!(config.irc.name, "SpawnBot IRC Bridge");
        assert_eq!(config.irc.channel, "#spawn");
        assert_eq!(config.discord.channel_id, 123456789012345678);
        assert_eq!(config.command_prefix, "!");
    }

    #[test]
    fn test_overrides_applied() {
        let mut vars = required_vars();
        vars.insert("SPAWNBOT_IRC_PORT", "6697");
        vars.insert("SPAWNBOT_IRC_NICK", "Bridge");
        vars.insert("SPAWNBOT_COMMAND_PREFIX", ".");

        let config = load(&vars).unwrap();
        assert_eq!(config.irc.port, 6697);
        assert_eq!(config.irc.nick, "Bridge");
        assert_eq!(config.command_prefix, ".");
    }

    #[test]
    fn test_missing_server_fails() {
        let mut vars = required_vars();
        vars.remove("SPAWNBOT_IRC_SERVER");

        let err = load(&vars).unwrap_err();
        assert_eq!(err.to_string(), "SPAWNBOT_IRC_SERVER is not set");
    }

    #[test]
    fn test_empty_value_counts_as_unset() {
        let mut vars = required_vars();
        vars.insert("SPAWNBOT_IRC_CHANNEL", "");

        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("SPAWNBOT_IRC_CHANNEL"));
    }

    #[test]
    fn test_legacy_fallbacks() {
        let mut vars = required_vars();
        vars.remove("SPAWNBOT_QNET_AUTH");
        vars.remove("SPAWNBOT_DISCORD_TOKEN");
        vars.insert("QNET_AUTH", "legacy-pass");
        vars.insert("SPAWNBOT_TOKEN", "legacy-token");

        let config = load(&vars).unwrap();
        assert_eq!(config.quakenet.auth_pass, "legacy-pass");
        assert_eq!(config.discord.token, "legacy-token");
    }

    #[test]
    fn test_missing_token_names_both_variables() {
        let mut vars = required_vars();
        vars.remove("SPAWNBOT_DISCORD_TOKEN");

        let err = load(&vars).unwrap_err();
        assert_eq!(
            err.to_string(),
            "SPAWNBOT_DISCORD_TOKEN or SPAWNBOT_TOKEN is not set"
        );
    }

    #[test]
    fn test_malformed_port_fails() {
        let mut vars = required_vars();
        vars.insert("SPAWNBOT_IRC_PORT", "not-a-port");

        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "SPAWNBOT_IRC_PORT"));
    }

    #[test]
    fn test_malformed_channel_id_fails() {
        let mut vars = required_vars();
        vars.insert("SPAWNBOT_DISCORD_CHANNEL_ID", "general");

        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("not a numeric channel ID"));
    }
}
