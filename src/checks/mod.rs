//! Status checks published against pull request head commits.
//!
//! [`CheckPublisher`] turns a [`CheckResult`] into one completed check run.
//! [`PullRequestChecks`] decides which results to publish for a pull request
//! event by running the configured [`ValidationRule`](crate::rules::ValidationRule)s.

mod pull_request;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::github::{CheckRunConclusion, CheckRunRequest, CheckRunStatus, GitHubApi, GitHubApiError};
use crate::types::{RepoId, Sha};

pub use pull_request::{
    CheckReport, CheckedField, PullRequestCheck, PullRequestChecks, DEFAULT_BODY_CHECK_NAME,
    DEFAULT_TITLE_CHECK_NAME,
};

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckOutcome {
    Success,
    Failure,
    Skipped,
}

impl CheckOutcome {
    pub fn from_valid(valid: bool) -> Self {
        if valid {
            CheckOutcome::Success
        } else {
            CheckOutcome::Failure
        }
    }

    pub fn conclusion(self) -> CheckRunConclusion {
        match self {
            CheckOutcome::Success => CheckRunConclusion::Success,
            CheckOutcome::Failure => CheckRunConclusion::Failure,
            CheckOutcome::Skipped => CheckRunConclusion::Skipped,
        }
    }
}

/// A check outcome addressed to one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub repo: RepoId,
    pub sha: Sha,
    pub name: String,
    pub outcome: CheckOutcome,
}

/// The check run could not be created.
#[derive(Debug, Error)]
#[error("failed to publish check {name:?} on {sha}: {source}")]
pub struct PublishError {
    pub name: String,
    pub sha: Sha,
    #[source]
    pub source: GitHubApiError,
}

/// Submits check results as completed check runs.
pub struct CheckPublisher<G> {
    github: Arc<G>,
}

impl<G> Clone for CheckPublisher<G> {
    fn clone(&self) -> Self {
        Self {
            github: Arc::clone(&self.github),
        }
    }
}

impl<G: GitHubApi> CheckPublisher<G> {
    pub fn new(github: Arc<G>) -> Self {
        Self { github }
    }

    /// Creates one completed check run. Not retried.
    pub async fn publish(&self, result: &CheckResult) -> Result<(), PublishError> {
        let request = CheckRunRequest {
            name: result.name.clone(),
            head_sha: result.sha.clone(),
            status: CheckRunStatus::Completed,
            conclusion: Some(result.outcome.conclusion()),
        };

        self.github
            .create_check_run(&result.repo, &request)
            .await
            .map_err(|source| PublishError {
                name: result.name.clone(),
                sha: result.sha.clone(),
                source,
            })?;

        debug!(
            repo = %result.repo,
            sha = %result.sha.short(),
            check = %result.name,
            outcome = ?result.outcome,
            "Check published"
        );
        Ok(())
    }
}
