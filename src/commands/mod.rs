//! Bot commands issued through pull request comments.
//!
//! A command comment starts with a configured prefix followed by a command
//! word and positional arguments, separated by single spaces:
//!
//! ```text
//! /bot build BRANCH main
//! ```
//!
//! The pipeline is:
//!
//! 1. [`parse_command`] strips the prefix and tokenizes
//! 2. [`CommandSet::lookup`] resolves the command word against the configured grammar
//! 3. [`Dispatcher`] checks arity and hands the command to an [`Executor`]
//! 4. [`ActionExecutor`] runs the compiled-in behavior for the command
//!
//! # Example
//!
//! ```
//! use pr_steward::commands::{parse_command, CommandAction, CommandDefinition, CommandSet};
//!
//! let set = CommandSet::new("/bot ", vec![CommandDefinition::new("build", 2)]).unwrap();
//!
//! let cmd = parse_command("/bot build BRANCH main", set.prefix()).unwrap();
//! let definition = set.lookup(cmd.name()).unwrap();
//! assert_eq!(definition.action(), CommandAction::TriggerBuild);
//! assert_eq!(cmd.args().len(), definition.parameters);
//! ```

mod action;
mod dispatch;
mod executor;
mod parser;
mod types;

pub use action::{BUILD_PARAMETERS, CommandAction};
pub use dispatch::{DispatchOutcome, Dispatcher, Rejection};
pub use executor::{
    ActionExecutor, CommandContext, ExecutionError, ExecutionStage, Executor,
};
pub use parser::{ParsedCommand, parse_command};
pub use types::{CommandDefinition, CommandSet, CommandSetError, GrammarError};
