//! Command definitions and the name-keyed command table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::bridge::outbound::IrcOutbound;
use crate::commands::dispatcher::Input;
use crate::common::error::RegistryError;

/// Handler invoked with the live IRC client and the parsed invocation.
pub type CommandFn = Arc<dyn Fn(&dyn IrcOutbound, &Input<'_>) -> anyhow::Result<()> + Send + Sync>;

/// A registered bot command. Immutable once registered.
#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub help: String,
    /// Argument synopsis shown in usage replies, e.g. `<nick>`.
    pub help_args: String,
    pub min_args: usize,
    pub handler: CommandFn,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, help: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&dyn IrcOutbound, &Input<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            help: help.into(),
            help_args: String::new(),
            min_args: 0,
            handler: Arc::new(handler),
        }
    }

    #[allow(dead_code)]
    pub fn with_min_args(mut self, min_args: usize) -> Self {
        self.min_args = min_args;
        self
    }

    #[allow(dead_code)]
    pub fn with_help_args(mut self, help_args: impl Into<String>) -> Self {
        self.help_args = help_args.into();
        self
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("help_args", &self.help_args)
            .field("min_args", &self.min_args)
            .finish_non_exhaustive()
    }
}

/// Command table keyed by exact, case-sensitive name.
///
/// Re-registering a name is rejected with `DuplicateCommand`.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), RegistryError> {
        validate_name(&command.name)?;

        if self.commands.contains_key(&command.name) {
            return Err(RegistryError::DuplicateCommand {
                name: command.name,
            });
        }
        self.commands.insert(command.name.clone(), command);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.commands.get(name)
    }

    /// All commands sorted by name.
    pub fn commands(&self) -> Vec<&Command> {
        let mut commands: Vec<&Command> = self.commands.values().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };
    Err(RegistryError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
