//! The code-hosting operations the bot performs.
//!
//! Command execution and check publishing only ever talk to GitHub through
//! [`GitHubApi`], so both can be tested against an in-memory double.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoId, Sha};

use super::error::GitHubApiError;

/// Lifecycle state of a check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

/// Final result of a completed check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckRunConclusion {
    Success,
    Failure,
    Skipped,
}

/// Body of `POST /repos/{owner}/{repo}/check-runs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunRequest {
    pub name: String,
    pub head_sha: Sha,
    pub status: CheckRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckRunConclusion>,
}

/// GitHub operations used by the bot.
///
/// # Example (recording double for tests)
///
/// ```ignore
/// struct RecordingGitHub {
///     comments: Mutex<Vec<(RepoId, PrNumber, String)>>,
/// }
///
/// impl GitHubApi for RecordingGitHub {
///     async fn create_comment(&self, repo: &RepoId, issue: PrNumber, body: &str)
///         -> Result<(), GitHubApiError>
///     {
///         self.comments.lock().unwrap().push((repo.clone(), issue, body.to_string()));
///         Ok(())
///     }
///     // ...
/// }
/// ```
pub trait GitHubApi: Send + Sync {
    /// Posts a new comment on an issue or pull request conversation.
    fn create_comment(
        &self,
        repo: &RepoId,
        issue: PrNumber,
        body: &str,
    ) -> impl Future<Output = Result<(), GitHubApiError>> + Send;

    /// Creates a check run on a commit.
    fn create_check_run(
        &self,
        repo: &RepoId,
        request: &CheckRunRequest,
    ) -> impl Future<Output = Result<(), GitHubApiError>> + Send;
}
