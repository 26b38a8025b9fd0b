//! Comment-to-command dispatch.
//!
//! Takes an issue comment, decides whether it is a command, validates it against
//! the grammar and hands it to an [`Executor`]. Nothing here returns an error to
//! the caller: every way a command can fail becomes a [`Rejection`] that is
//! logged and reported in the outcome.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::PrNumber;
use crate::webhooks::{CommentAction, IssueCommentEvent};

use super::executor::{CommandContext, ExecutionStage, Executor};
use super::parser::parse_command;
use super::types::{CommandSet, GrammarError};

/// Why a command comment was not executed.
///
/// The `Display` text is the user-facing reason; details are for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("invalid command")]
    CommandNotFound(String),

    #[error("invalid number of parameters")]
    ArityMismatch {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("execution error")]
    ExecutionFailure {
        command: String,
        stage: ExecutionStage,
    },
}

/// Result of dispatching one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Not a command for this bot (wrong action, not on a PR, no prefix).
    Ignored,
    /// A command that failed validation or execution.
    Rejected(Rejection),
    /// The command ran successfully.
    Executed,
}

/// Dispatches command comments against a fixed [`CommandSet`].
pub struct Dispatcher<E> {
    commands: Arc<CommandSet>,
    executor: E,
}

impl<E: Executor> Dispatcher<E> {
    pub fn new(commands: Arc<CommandSet>, executor: E) -> Self {
        Self { commands, executor }
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub async fn dispatch(&self, event: &IssueCommentEvent) -> DispatchOutcome {
        let Some(pr) = event.pr_number else {
            return DispatchOutcome::Ignored;
        };
        if event.action != CommentAction::Created {
            return DispatchOutcome::Ignored;
        }
        let Some(command) = parse_command(&event.body, self.commands.prefix()) else {
            return DispatchOutcome::Ignored;
        };

        debug!(
            repo = %event.repo,
            pr = %pr,
            author = %event.author_login,
            command = %command.name(),
            "Command comment received"
        );

        let definition = match self.commands.lookup(command.name()) {
            Ok(definition) => definition,
            Err(GrammarError::CommandNotFound(name)) => {
                return self.reject(event, pr, Rejection::CommandNotFound(name));
            }
        };

        let got = command.args().len();
        if got != definition.parameters {
            return self.reject(
                event,
                pr,
                Rejection::ArityMismatch {
                    command: definition.name.clone(),
                    expected: definition.parameters,
                    got,
                },
            );
        }

        let context = CommandContext {
            repo: event.repo.clone(),
            pr,
        };
        match self.executor.execute(definition, &command, &context).await {
            Ok(()) => {
                info!(repo = %event.repo, pr = %pr, command = %definition.name, "Command executed");
                DispatchOutcome::Executed
            }
            Err(e) => {
                warn!(
                    repo = %event.repo,
                    pr = %pr,
                    command = %definition.name,
                    stage = %e.stage(),
                    error = %e,
                    "Command execution failed"
                );
                DispatchOutcome::Rejected(Rejection::ExecutionFailure {
                    command: definition.name.clone(),
                    stage: e.stage(),
                })
            }
        }
    }

    fn reject(
        &self,
        event: &IssueCommentEvent,
        pr: PrNumber,
        rejection: Rejection,
    ) -> DispatchOutcome {
        warn!(
            repo = %event.repo,
            pr = %pr,
            author = %event.author_login,
            reason = %rejection,
            detail = ?rejection,
            "Command rejected"
        );
        DispatchOutcome::Rejected(rejection)
    }
}
