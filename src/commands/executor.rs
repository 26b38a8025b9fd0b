//! Per-command behavior.
//!
//! The grammar decides which commands exist; this module decides what they do.
//! Behaviors are compiled in and selected by [`CommandAction`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::build::{BuildBackend, BuildConnector, BuildError, BuildParams};
use crate::github::{GitHubApi, GitHubApiError};
use crate::types::{PrNumber, RepoId};

use super::action::{BUILD_PARAMETERS, CommandAction};
use super::parser::ParsedCommand;
use super::types::CommandDefinition;

/// Where a command was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub repo: RepoId,
    pub pr: PrNumber,
}

/// The step of a command execution that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionStage {
    /// The arguments did not fit the behavior.
    Arguments,
    /// The build server client could not be created or reached.
    ClientInit,
    /// The repository job could not be found.
    JobLookup,
    /// The per-PR job could not be found.
    InnerJobLookup,
    /// The build server rejected the trigger.
    Invoke,
    /// The result comment could not be posted.
    CommentPost,
}

impl fmt::Display for ExecutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStage::Arguments => "arguments",
            ExecutionStage::ClientInit => "client-init",
            ExecutionStage::JobLookup => "job-lookup",
            ExecutionStage::InnerJobLookup => "inner-job-lookup",
            ExecutionStage::Invoke => "invoke",
            ExecutionStage::CommentPost => "comment-post",
        };
        f.write_str(s)
    }
}

/// A failed command execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("expected {expected} arguments, got {got}")]
    Arguments { expected: usize, got: usize },

    /// A build server call failed.
    #[error("{stage}: {source}")]
    Build {
        stage: ExecutionStage,
        #[source]
        source: BuildError,
    },

    /// Posting the result comment failed.
    #[error("comment-post: {0}")]
    Comment(#[source] GitHubApiError),
}

/// Wraps a build error with the stage it happened at.
fn at(stage: ExecutionStage) -> impl FnOnce(BuildError) -> ExecutionError {
    move |source| ExecutionError::Build { stage, source }
}

impl ExecutionError {
    pub fn stage(&self) -> ExecutionStage {
        match self {
            ExecutionError::Arguments { .. } => ExecutionStage::Arguments,
            ExecutionError::Build { stage, .. } => *stage,
            ExecutionError::Comment(_) => ExecutionStage::CommentPost,
        }
    }
}

/// Runs a resolved, arity-checked command.
pub trait Executor: Send + Sync {
    fn execute(
        &self,
        definition: &CommandDefinition,
        command: &ParsedCommand,
        context: &CommandContext,
    ) -> impl Future<Output = Result<(), ExecutionError>> + Send;
}

/// The production executor: talks to the build server and GitHub.
pub struct ActionExecutor<G, C> {
    github: Arc<G>,
    builds: C,
}

impl<G, C> ActionExecutor<G, C>
where
    G: GitHubApi,
    C: BuildConnector,
{
    pub fn new(github: Arc<G>, builds: C) -> Self {
        Self { github, builds }
    }

    /// Triggers `{repo}/PR-{n}` with one `key=value` parameter and reports
    /// success as a comment.
    ///
    /// One build trigger and at most one comment; nothing is retried.
    async fn trigger_build(
        &self,
        definition: &CommandDefinition,
        command: &ParsedCommand,
        context: &CommandContext,
    ) -> Result<(), ExecutionError> {
        let [key, value] = command.args() else {
            return Err(ExecutionError::Arguments {
                expected: BUILD_PARAMETERS,
                got: command.args().len(),
            });
        };

        let backend = self
            .builds
            .connect()
            .await
            .map_err(at(ExecutionStage::ClientInit))?;
        let job = backend
            .get_job(&context.repo.repo)
            .await
            .map_err(at(ExecutionStage::JobLookup))?;
        let pr_job = backend
            .get_inner_job(&job, &context.pr.job_name())
            .await
            .map_err(at(ExecutionStage::InnerJobLookup))?;

        let params = BuildParams::from([(key.clone(), value.clone())]);
        backend
            .invoke(&pr_job, &params)
            .await
            .map_err(at(ExecutionStage::Invoke))?;

        info!(
            repo = %context.repo,
            pr = %context.pr,
            command = %definition.name,
            "Build triggered"
        );

        self.github
            .create_comment(&context.repo, context.pr, &definition.success_message)
            .await
            .map_err(ExecutionError::Comment)
    }
}

impl<G, C> Executor for ActionExecutor<G, C>
where
    G: GitHubApi,
    C: BuildConnector,
{
    async fn execute(
        &self,
        definition: &CommandDefinition,
        command: &ParsedCommand,
        context: &CommandContext,
    ) -> Result<(), ExecutionError> {
        match definition.action() {
            CommandAction::TriggerBuild => self.trigger_build(definition, command, context).await,
            // Reserved for posting a review / closing the PR.
            CommandAction::Approve | CommandAction::Close | CommandAction::Noop => {
                debug!(
                    pr = %context.pr,
                    command = %definition.name,
                    action = ?definition.action(),
                    "Command has no side effects"
                );
                Ok(())
            }
        }
    }
}
