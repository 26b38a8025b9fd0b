//! Title and description checks for pull request events.

use std::sync::Arc;

use tracing::{info, warn};

use crate::github::GitHubApi;
use crate::rules::ValidationRule;
use crate::webhooks::PullRequestEvent;

use super::{CheckOutcome, CheckPublisher, CheckResult};

pub const DEFAULT_TITLE_CHECK_NAME: &str = "Pull Request Title";
pub const DEFAULT_BODY_CHECK_NAME: &str = "Pull Request Description";

/// The pull request field a check reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckedField {
    Title,
    Body,
}

/// One named check: a rule applied to a field.
#[derive(Debug, Clone)]
pub struct PullRequestCheck {
    pub name: String,
    pub field: CheckedField,
    pub rule: ValidationRule,
}

impl PullRequestCheck {
    pub fn title(name: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            name: name.into(),
            field: CheckedField::Title,
            rule,
        }
    }

    pub fn body(name: impl Into<String>, rule: ValidationRule) -> Self {
        Self {
            name: name.into(),
            field: CheckedField::Body,
            rule,
        }
    }

    fn evaluate(&self, event: &PullRequestEvent) -> CheckOutcome {
        let text = match self.field {
            CheckedField::Title => &event.title,
            CheckedField::Body => &event.body,
        };
        CheckOutcome::from_valid(self.rule.is_valid(text))
    }
}

/// What happened to one check for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub name: String,
    pub outcome: CheckOutcome,
    pub published: bool,
}

/// The enabled checks and the publisher they report through.
pub struct PullRequestChecks<G> {
    checks: Arc<Vec<PullRequestCheck>>,
    publisher: CheckPublisher<G>,
}

impl<G: GitHubApi> PullRequestChecks<G> {
    /// `checks` holds only the enabled checks, in publishing order.
    pub fn new(checks: Vec<PullRequestCheck>, publisher: CheckPublisher<G>) -> Self {
        Self {
            checks: Arc::new(checks),
            publisher,
        }
    }

    pub fn checks(&self) -> &[PullRequestCheck] {
        &self.checks
    }

    /// Evaluates and publishes every enabled check.
    ///
    /// Checks are independent: a failing rule or a failed publish of one check
    /// never prevents the next from running.
    pub async fn run(&self, event: &PullRequestEvent) -> Vec<CheckReport> {
        let mut reports = Vec::with_capacity(self.checks.len());

        for check in self.checks.iter() {
            let outcome = check.evaluate(event);
            info!(
                repo = %event.repo,
                pr = %event.pr_number,
                check = %check.name,
                outcome = ?outcome,
                "Check evaluated"
            );

            let result = CheckResult {
                repo: event.repo.clone(),
                sha: event.head_sha.clone(),
                name: check.name.clone(),
                outcome,
            };
            let published = match self.publisher.publish(&result).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        repo = %event.repo,
                        pr = %event.pr_number,
                        check = %check.name,
                        error = %e,
                        "Failed to publish check"
                    );
                    false
                }
            };

            reports.push(CheckReport {
                name: check.name.clone(),
                outcome,
                published,
            });
        }

        reports
    }
}
