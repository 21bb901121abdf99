//! Built-in IRC commands (!ping, !die, !help).

use tracing::info;

use crate::commands::dispatcher::Dispatcher;
use crate::commands::registry::{Command, CommandRegistry};
use crate::common::error::RegistryError;
use crate::common::Shutdown;

/// Build the dispatcher with every built-in command registered.
pub fn builtin_dispatcher(prefix: &str, shutdown: Shutdown) -> Result<Dispatcher, RegistryError> {
    let mut registry = CommandRegistry::new();

    registry.register(Command::new(
        "ping",
        "Sends a pong reply back to the source.",
        |client, input| {
            info!(user = %input.source.name, origin = %input.origin.target, "Received 'ping' command from IRC");
            client.reply(input.origin, "pong!")?;
            Ok(())
        },
    ))?;

    registry.register(Command::new(
        "die",
        "Forces the bot to quit.",
        move |_, input| {
            info!(user = %input.source.name, "Received 'die' command from IRC, initiating shutdown");
            shutdown.trigger("die command from IRC");
            Ok(())
        },
    ))?;

    register_help(&mut registry, prefix)?;

    Dispatcher::new(prefix, registry)
}

/// Register `help`, listing every command already in `registry` plus itself.
///
/// Must be called after all other commands are registered.
fn register_help(registry: &mut CommandRegistry, prefix: &str) -> Result<(), RegistryError> {
    let help = Command::new("help", "Lists available commands.", |_, _| Ok(()));

    let mut entries: Vec<&Command> = registry.commands();
    entries.push(&help);
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    let lines: Vec<String> = entries
        .iter()
        .map(|command| {
            let synopsis = if command.help_args.is_empty() {
                format!("{}{}", prefix, command.name)
            } else {
                format!("{}{} {}", prefix, command.name, command.help_args)
            };
            format!("{} - {}", synopsis, command.help)
        })
        .collect();

    registry.register(Command::new(
        help.name.clone(),
        help.help.clone(),
        move |client, input| {
            for line in &lines {
                client.reply(input.origin, line)?;
            }
            Ok(())
        },
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::bridge::outbound::IrcOutbound;
    use crate::commands::dispatcher::DispatchOutcome;
    use crate::common::error::RelayResult;
    use crate::common::{IrcMessage, Source};

    #[derive(Default)]
    struct RecordingIrc {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl IrcOutbound for RecordingIrc {
        fn send_message(&self, target: &str, text: &str) -> RelayResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((target.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn privmsg(text: &str) -> IrcMessage {
        IrcMessage {
            source: Source {
                name: "alice".to_string(),
                host: "example.org".to_string(),
            },
            target: "#test".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_ping_replies_pong() {
        let dispatcher = builtin_dispatcher("!", Shutdown::new()).unwrap();
        let irc = RecordingIrc::default();

        assert_eq!(dispatcher.dispatch(&irc, &privmsg("!ping")), DispatchOutcome::Executed);
        assert_eq!(
            *irc.sent.lock().unwrap(),
            vec![("#test".to_string(), "pong!".to_string())]
        );
    }

    #[test]
    fn test_die_triggers_shutdown_once() {
        let shutdown = Shutdown::new();
        let dispatcher = builtin_dispatcher("!", shutdown.clone()).unwrap();
        let irc = RecordingIrc::default();

        dispatcher.dispatch(&irc, &privmsg("!die"));
        assert!(shutdown.is_triggered());

        // A second die is handled but the signal does not fire again
        dispatcher.dispatch(&irc, &privmsg("!die"));
        assert!(!shutdown.trigger("test"));
        assert!(irc.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_help_lists_all_commands() {
        let dispatcher = builtin_dispatcher("!", Shutdown::new()).unwrap();
        let irc = RecordingIrc::default();

        dispatcher.dispatch(&irc, &privmsg("!help"));

        let lines: Vec<String> = irc.sent.lock().unwrap().iter().map(|(_, t)| t.clone()).collect();
        assert_eq!(
            lines,
            vec![
                "!die - Forces the bot to quit.".to_string(),
                "!help - Lists available commands.".to_string(),
                "!ping - Sends a pong reply back to the source.".to_string(),
            ]
        );
    }

    #[test]
    fn test_custom_prefix() {
        let dispatcher = builtin_dispatcher(".", Shutdown::new()).unwrap();
        let irc = RecordingIrc::default();

        assert_eq!(dispatcher.dispatch(&irc, &privmsg("!ping")), DispatchOutcome::NotCommand);
        assert_eq!(dispatcher.dispatch(&irc, &privmsg(".ping")), DispatchOutcome::Executed);
    }
}
