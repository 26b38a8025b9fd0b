//! Routes parsed webhook events to the component that handles them.
//!
//! Comment events go to the command [`Dispatcher`]; pull request events go to
//! the [`PullRequestChecks`]. Each event is handled to completion before the
//! outcome is returned, and no state survives between events.

use std::fmt;

use tracing::debug;

use crate::checks::{CheckReport, PullRequestChecks};
use crate::commands::{DispatchOutcome, Dispatcher, Executor};
use crate::github::GitHubApi;
use crate::webhooks::GitHubEvent;

/// What the router did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The event kind or action is not handled.
    Ignored,
    /// A comment was dispatched as a command.
    Command(DispatchOutcome),
    /// Pull request checks were evaluated.
    Checks(Vec<CheckReport>),
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteOutcome::Ignored | RouteOutcome::Command(DispatchOutcome::Ignored) => {
                f.write_str("ignored")
            }
            RouteOutcome::Command(DispatchOutcome::Executed) => f.write_str("command executed"),
            RouteOutcome::Command(DispatchOutcome::Rejected(rejection)) => {
                write!(f, "command rejected: {}", rejection)
            }
            RouteOutcome::Checks(reports) => {
                let published = reports.iter().filter(|r| r.published).count();
                write!(f, "checks published: {}/{}", published, reports.len())
            }
        }
    }
}

/// Top-level event entry point.
pub struct EventRouter<G, E> {
    dispatcher: Dispatcher<E>,
    checks: PullRequestChecks<G>,
}

impl<G, E> EventRouter<G, E>
where
    G: GitHubApi,
    E: Executor,
{
    pub fn new(dispatcher: Dispatcher<E>, checks: PullRequestChecks<G>) -> Self {
        Self { dispatcher, checks }
    }

    pub async fn route(&self, event: &GitHubEvent) -> RouteOutcome {
        match event {
            GitHubEvent::IssueComment(comment) => {
                RouteOutcome::Command(self.dispatcher.dispatch(comment).await)
            }
            GitHubEvent::PullRequest(pr) if pr.action.runs_checks() => {
                RouteOutcome::Checks(self.checks.run(pr).await)
            }
            GitHubEvent::PullRequest(pr) => {
                debug!(
                    repo = %pr.repo,
                    pr = %pr.pr_number,
                    action = ?pr.action,
                    "Pull request action does not run checks"
                );
                RouteOutcome::Ignored
            }
        }
    }
}
