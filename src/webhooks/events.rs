//! GitHub webhook event types.
//!
//! Typed representations of the webhook events the bot reacts to, carrying
//! only the fields the bot reads.
//!
//! - `issue_comment` - command comments on pull requests
//! - `pull_request` - title and description checks

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, RepoId, Sha};

/// A parsed GitHub webhook event.
///
/// Unknown or irrelevant events are represented by returning `None` from the
/// parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitHubEvent {
    /// An issue or PR comment was created, edited, or deleted.
    ///
    /// Note: In GitHub's API, PR comments on the conversation tab are delivered
    /// as `issue_comment` events, not `pull_request_review_comment` events.
    IssueComment(IssueCommentEvent),

    /// A pull request was opened, edited, synchronized, reopened or closed.
    PullRequest(PullRequestEvent),
}

impl GitHubEvent {
    /// Returns the repository this event belongs to.
    pub fn repo_id(&self) -> &RepoId {
        match self {
            GitHubEvent::IssueComment(e) => &e.repo,
            GitHubEvent::PullRequest(e) => &e.repo,
        }
    }
}

/// Action performed on an issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentAction {
    Created,
    Edited,
    Deleted,
}

/// An issue/PR comment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    pub repo: RepoId,

    pub action: CommentAction,

    /// The PR number.
    ///
    /// Only set if the comment is on a pull request, not a regular issue.
    /// Commands are only valid on PRs.
    pub pr_number: Option<PrNumber>,

    /// The comment body text. Empty for `deleted` actions.
    pub body: String,

    /// The comment author's login name.
    pub author_login: String,
}

/// Action performed on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    Opened,
    /// Title, body, or base branch changed.
    Edited,
    /// New commits pushed to the head branch.
    Synchronize,
    Reopened,
    Closed,
}

impl PrAction {
    /// Whether the title and description should be (re)checked.
    ///
    /// Every action that can change the title, the description or the head
    /// commit does.
    pub fn runs_checks(self) -> bool {
        matches!(
            self,
            PrAction::Opened | PrAction::Edited | PrAction::Synchronize | PrAction::Reopened
        )
    }
}

/// A pull request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub repo: RepoId,

    pub action: PrAction,

    pub pr_number: PrNumber,

    pub title: String,

    /// The description. GitHub sends `null` for an empty description; that
    /// becomes an empty string.
    pub body: String,

    /// The current head SHA of the PR branch.
    pub head_sha: Sha,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_triggering_actions() {
        assert!(PrAction::Opened.runs_checks());
        assert!(PrAction::Edited.runs_checks());
        assert!(PrAction::Synchronize.runs_checks());
        assert!(PrAction::Reopened.runs_checks());
        assert!(!PrAction::Closed.runs_checks());
    }

    #[test]
    fn repo_id_for_each_event() {
        let comment = GitHubEvent::IssueComment(IssueCommentEvent {
            repo: RepoId::new("a", "b"),
            action: CommentAction::Created,
            pr_number: None,
            body: String::new(),
            author_login: "octocat".to_string(),
        });
        assert_eq!(comment.repo_id(), &RepoId::new("a", "b"));
    }
}
