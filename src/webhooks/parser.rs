//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON into typed [`GitHubEvent`] values. Unknown fields
//! are ignored.
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types and irrelevant actions return `Ok(None)`
//! 4. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{PrNumber, RepoId, Sha};

use super::events::{
    CommentAction, GitHubEvent, IssueCommentEvent, PrAction, PullRequestEvent,
};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Field has invalid value (e.g., malformed SHA, unknown action).
    #[error("invalid field value for {field}: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Parses a webhook payload into a typed event.
///
/// * `Ok(Some(event))` - a comment or pull request event worth handling
/// * `Ok(None)` - any other event type, or a pull request action the bot
///   does not track (labeled, assigned...)
/// * `Err(e)` - malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use pr_steward::webhooks::{parse_webhook, GitHubEvent};
///
/// let payload = br#"{
///     "action": "created",
///     "comment": { "body": "/bot build BRANCH main", "user": { "login": "octocat" } },
///     "issue": { "number": 42, "pull_request": { "url": "..." } },
///     "repository": { "owner": { "login": "acme" }, "name": "widgets" }
/// }"#;
///
/// let Some(GitHubEvent::IssueComment(event)) = parse_webhook("issue_comment", payload).unwrap()
/// else {
///     panic!("expected a comment event");
/// };
/// assert_eq!(event.pr_number.map(|n| n.0), Some(42));
///
/// assert!(parse_webhook("push", b"{}").unwrap().is_none());
/// ```
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitHubEvent>, ParseError> {
    match event_type {
        "issue_comment" => parse_issue_comment(payload).map(|e| Some(GitHubEvent::IssueComment(e))),
        "pull_request" => parse_pull_request(payload).map(|opt| opt.map(GitHubEvent::PullRequest)),
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

// ============================================================================
// issue_comment event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssueCommentPayload {
    action: String,
    comment: RawComment,
    issue: RawIssue,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawComment {
    body: Option<String>,
    user: RawUser,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    number: u64,
    // Present only when the issue is a pull request.
    pull_request: Option<serde_json::Value>,
}

fn parse_issue_comment(payload: &[u8]) -> Result<IssueCommentEvent, ParseError> {
    let raw: RawIssueCommentPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "created" => CommentAction::Created,
        "edited" => CommentAction::Edited,
        "deleted" => CommentAction::Deleted,
        other => {
            return Err(ParseError::InvalidField {
                field: "action",
                value: other.to_string(),
            });
        }
    };

    let pr_number = raw.issue.pull_request.map(|_| PrNumber(raw.issue.number));

    Ok(IssueCommentEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action,
        pr_number,
        body: raw.comment.body.unwrap_or_default(),
        author_login: raw.comment.user.login,
    })
}

// ============================================================================
// pull_request event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    head: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
}

fn parse_pull_request(payload: &[u8]) -> Result<Option<PullRequestEvent>, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let action = match raw.action.as_str() {
        "opened" => PrAction::Opened,
        "edited" => PrAction::Edited,
        "synchronize" => PrAction::Synchronize,
        "reopened" => PrAction::Reopened,
        "closed" => PrAction::Closed,
        _ => return Ok(None),
    };

    let head_sha =
        Sha::parse(&raw.pull_request.head.sha).map_err(|_| ParseError::InvalidField {
            field: "pull_request.head.sha",
            value: raw.pull_request.head.sha.clone(),
        })?;

    Ok(Some(PullRequestEvent {
        repo: RepoId::new(raw.repository.owner.login, raw.repository.name),
        action,
        pr_number: PrNumber(raw.pull_request.number),
        title: raw.pull_request.title,
        body: raw.pull_request.body.unwrap_or_default(),
        head_sha,
    }))
}
