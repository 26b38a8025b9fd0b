//! The command grammar: which commands exist and how many arguments each takes.
//!
//! The grammar is loaded from configuration once and never changes afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::action::{BUILD_PARAMETERS, CommandAction};

/// One configured command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDefinition {
    /// The command word, matched case-sensitively.
    pub name: String,

    /// Human-readable help text.
    #[serde(default)]
    pub description: String,

    /// Free-form tag naming where the command runs (e.g. `jenkins`).
    #[serde(default)]
    pub context: String,

    /// Number of positional arguments the command requires.
    #[serde(default)]
    pub parameters: usize,

    /// Comment posted on the pull request when the command succeeds.
    #[serde(default)]
    pub success_message: String,

    /// Message describing a failed run of the command.
    #[serde(default)]
    pub error_message: String,
}

impl CommandDefinition {
    /// Creates a definition with empty description, context and messages.
    pub fn new(name: impl Into<String>, parameters: usize) -> Self {
        CommandDefinition {
            name: name.into(),
            description: String::new(),
            context: String::new(),
            parameters,
            success_message: String::new(),
            error_message: String::new(),
        }
    }

    /// Sets the success message.
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = message.into();
        self
    }

    /// The compiled-in behavior for this command.
    pub fn action(&self) -> CommandAction {
        CommandAction::from_name(&self.name)
    }
}

/// Lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// No command with this name is configured.
    #[error("command not found: {0:?}")]
    CommandNotFound(String),
}

/// Invariant violations detected while building a [`CommandSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandSetError {
    #[error("command prefix must not be empty")]
    EmptyPrefix,

    #[error("command name must not be empty")]
    EmptyName,

    #[error("command {0:?} is defined more than once")]
    DuplicateName(String),

    /// Commands with a compiled-in behavior that reads a fixed number of
    /// arguments must be configured with that arity.
    #[error("command {name:?} must take {expected} parameters, configured with {configured}")]
    FixedArity {
        name: String,
        expected: usize,
        configured: usize,
    },
}

/// The configured commands plus the prefix that marks a comment as a command.
#[derive(Debug, Clone)]
pub struct CommandSet {
    prefix: String,
    commands: Vec<CommandDefinition>,
}

impl CommandSet {
    /// Builds a command set, enforcing a non-empty prefix and unique names.
    pub fn new(
        prefix: impl Into<String>,
        commands: Vec<CommandDefinition>,
    ) -> Result<Self, CommandSetError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CommandSetError::EmptyPrefix);
        }

        let mut seen = HashSet::new();
        for command in &commands {
            if command.name.is_empty() {
                return Err(CommandSetError::EmptyName);
            }
            if !seen.insert(command.name.as_str()) {
                return Err(CommandSetError::DuplicateName(command.name.clone()));
            }
            if command.action() == CommandAction::TriggerBuild
                && command.parameters != BUILD_PARAMETERS
            {
                return Err(CommandSetError::FixedArity {
                    name: command.name.clone(),
                    expected: BUILD_PARAMETERS,
                    configured: command.parameters,
                });
            }
        }

        Ok(CommandSet { prefix, commands })
    }

    /// The prefix a comment must start with to be treated as a command.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// All commands, in configuration order.
    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    /// Finds a command by exact, case-sensitive name.
    pub fn lookup(&self, name: &str) -> Result<&CommandDefinition, GrammarError> {
        self.commands
            .iter()
            .find(|command| command.name == name)
            .ok_or_else(|| GrammarError::CommandNotFound(name.to_string()))
    }
}
