//! Prefix-based command dispatch for inbound IRC lines.

use tracing::{debug, info, warn};

use crate::bridge::outbound::IrcOutbound;
use crate::commands::registry::CommandRegistry;
use crate::common::error::RegistryError;
use crate::common::{IrcMessage, Source};

/// A parsed command invocation, valid for one dispatch call.
#[derive(Debug)]
pub struct Input<'a> {
    pub source: &'a Source,
    /// Arguments after the command name; never contains empty strings.
    pub args: Vec<String>,
    /// The raw event, for routing replies.
    pub origin: &'a IrcMessage,
}

/// What `Dispatcher::dispatch` did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not prefixed, empty after the prefix, or an unknown command.
    NotCommand,
    /// Too few arguments; a usage reply was sent instead.
    Usage,
    /// The handler ran.
    Executed,
}

/// Split a chat line into command name and arguments.
///
/// Returns `None` when the line does not start with `prefix` or nothing
/// follows it.
pub fn parse_invocation<'a>(prefix: &str, line: &'a str) -> Option<(&'a str, Vec<&'a str>)> {
    let rest = line.trim().strip_prefix(prefix)?;
    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?;
    Some((name, tokens.collect()))
}

pub struct Dispatcher {
    prefix: String,
    registry: CommandRegistry,
}

impl Dispatcher {
    pub fn new(prefix: impl Into<String>, registry: CommandRegistry) -> Result<Self, RegistryError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(RegistryError::InvalidPrefix {
                prefix,
                reason: "prefix is empty",
            });
        }
        if prefix.contains(char::is_whitespace) {
            return Err(RegistryError::InvalidPrefix {
                prefix,
                reason: "prefix contains whitespace",
            });
        }
        Ok(Self { prefix, registry })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `text` carries the command prefix, regardless of whether it
    /// names a registered command.
    pub fn is_prefixed(&self, text: &str) -> bool {
        text.trim().starts_with(&self.prefix)
    }

    /// Run the command named by `msg`, if any.
    ///
    /// The handler runs to completion before this returns.
    pub fn dispatch(&self, client: &dyn IrcOutbound, msg: &IrcMessage) -> DispatchOutcome {
        let Some((name, args)) = parse_invocation(&self.prefix, &msg.text) else {
            return DispatchOutcome::NotCommand;
        };

        let Some(command) = self.registry.lookup(name) else {
            debug!(command = name, user = %msg.source.name, "Ignoring unknown command");
            return DispatchOutcome::NotCommand;
        };

        if args.len() < command.min_args {
            info!(
                command = name,
                user = %msg.source.name,
                given = args.len(),
                required = command.min_args,
                "Not enough arguments, sending usage"
            );
            let usage = format!("Usage: {}{} {}", self.prefix, command.name, command.help_args);
            if let Err(e) = client.reply(msg, &usage) {
                warn!("Failed to send usage reply: {}", e);
            }
            return DispatchOutcome::Usage;
        }

        let input = Input {
            source: &msg.source,
            args: args.into_iter().map(str::to_string).collect(),
            origin: msg,
        };

        debug!(command = name, user = %msg.source.name, args = ?input.args, "Executing command");
        if let Err(e) = (command.handler)(client, &input) {
            warn!(command = name, "Command handler failed: {:#}", e);
        }
        DispatchOutcome::Executed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::commands::registry::Command;
    use crate::common::error::RelayResult;

    /// Records every outbound IRC message.
    #[derive(Default)]
    struct RecordingIrc {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingIrc {
        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
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

    fn privmsg(nick: &str, target: &str, text: &str) -> IrcMessage {
        IrcMessage {
            source: Source {
                name: nick.to_string(),
                host: "testhost".to_string(),
            },
            target: target.to_string(),
            text: text.to_string(),
        }
    }

    /// Dispatcher with `ping` (min 0) and `testcmd` (min 1), plus a call
    /// counter and the args of the last `testcmd` call.
    fn dispatcher() -> (Dispatcher, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let captured = Arc::new(Mutex::new(Vec::new()));

        let mut registry = CommandRegistry::new();
        registry
            .register(Command::new("ping", "Replies with pong.", |client, input| {
                client.reply(input.origin, "pong!")?;
                Ok(())
            }))
            .unwrap();

        let counter = Arc::clone(&calls);
        let args = Arc::clone(&captured);
        registry
            .register(
                Command::new("testcmd", "Test command with min args.", move |_, input| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    *args.lock().unwrap() = input.args.clone();
                    Ok(())
                })
                .with_min_args(1)
                .with_help_args("<arg1>"),
            )
            .unwrap();

        (Dispatcher::new("!", registry).unwrap(), calls, captured)
    }

    #[test]
    fn test_parse_invocation() {
        assert_eq!(
            parse_invocation("!", "!ping a b"),
            Some(("ping", vec!["a", "b"]))
        );
        assert_eq!(parse_invocation("!", "  !ping  "), Some(("ping", vec![])));
        assert_eq!(parse_invocation("!", "ping"), None);
        assert_eq!(parse_invocation("!", "!"), None);
        assert_eq!(parse_invocation("!", "!   "), None);
        assert_eq!(parse_invocation("::", "::die now"), Some(("die", vec!["now"])));
    }

    #[test]
    fn test_ping_executes_without_usage() {
        let (dispatcher, _, _) = dispatcher();
        let irc = RecordingIrc::default();

        let outcome = dispatcher.dispatch(&irc, &privmsg("alice", "#test", "!ping"));

        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(irc.sent(), vec![("#test".to_string(), "pong!".to_string())]);
    }

    #[test]
    fn test_min_args_enforced_with_usage_reply() {
        let (dispatcher, calls, _) = dispatcher();
        let irc = RecordingIrc::default();

        let outcome = dispatcher.dispatch(&irc, &privmsg("testuser", "#testchannel", "!testcmd"));

        assert_eq!(outcome, DispatchOutcome::Usage);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            irc.sent(),
            vec![("#testchannel".to_string(), "Usage: !testcmd <arg1>".to_string())]
        );
    }

    #[test]
    fn test_sufficient_args_execute_once() {
        let (dispatcher, calls, captured) = dispatcher();
        let irc = RecordingIrc::default();

        let outcome = dispatcher.dispatch(&irc, &privmsg("testuser", "#testchannel", "!testcmd arg1"));

        assert_eq!(outcome, DispatchOutcome::Executed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*captured.lock().unwrap(), vec!["arg1".to_string()]);
        assert!(irc.sent().is_empty());
    }

    #[test]
    fn test_extra_whitespace_produces_no_empty_args() {
        let (dispatcher, _, captured) = dispatcher();
        let irc = RecordingIrc::default();

        dispatcher.dispatch(&irc, &privmsg("testuser", "#test", "!testcmd   arg1 \t  arg2  "));

        assert_eq!(
            *captured.lock().unwrap(),
            vec!["arg1".to_string(), "arg2".to_string()]
        );
    }

    #[test]
    fn test_unknown_command_is_silent() {
        let (dispatcher, calls, _) = dispatcher();
        let irc = RecordingIrc::default();

        let outcome = dispatcher.dispatch(&irc, &privmsg("testuser", "#test", "!nonexistent"));

        assert_eq!(outcome, DispatchOutcome::NotCommand);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(irc.sent().is_empty());
    }

    #[test]
    fn test_unprefixed_line_is_silent() {
        let (dispatcher, _, _) = dispatcher();
        let irc = RecordingIrc::default();

        let outcome = dispatcher.dispatch(&irc, &privmsg("testuser", "#test", "ping"));

        assert_eq!(outcome, DispatchOutcome::NotCommand);
        assert!(irc.sent().is_empty());
    }

    #[test]
    fn test_bare_prefix_is_not_a_command() {
        let (dispatcher, calls, _) = dispatcher();
        let irc = RecordingIrc::default();

        assert_eq!(
            dispatcher.dispatch(&irc, &privmsg("testuser", "#test", "!")),
            DispatchOutcome::NotCommand
        );
        assert_eq!(
            dispatcher.dispatch(&irc, &privmsg("testuser", "#test", "!   ")),
            DispatchOutcome::NotCommand
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(irc.sent().is_empty());
    }

    #[test]
    fn test_private_usage_reply_goes_to_sender() {
        let (dispatcher, _, _) = dispatcher();
        let irc = RecordingIrc::default();

        dispatcher.dispatch(&irc, &privmsg("testuser", "SpawnBot", "!testcmd"));

        assert_eq!(
            irc.sent(),
            vec![("testuser".to_string(), "Usage: !testcmd <arg1>".to_string())]
        );
    }

    #[test]
    fn test_is_prefixed_ignores_registration() {
        let (dispatcher, _, _) = dispatcher();
        assert!(dispatcher.is_prefixed("!nonexistent"));
        assert!(dispatcher.is_prefixed("  !ping"));
        assert!(!dispatcher.is_prefixed("hello !ping"));
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        assert!(Dispatcher::new("", CommandRegistry::new()).is_err());
        assert!(Dispatcher::new("! ", CommandRegistry::new()).is_err());
    }
}
