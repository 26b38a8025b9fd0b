//! GitHub API access.
//!
//! [`GitHubApi`] is the capability the rest of the crate depends on;
//! [`OctocrabClient`] implements it against the real API. Calls are made once:
//! a failure is reported to the caller and never retried.

mod api;
mod client;
mod error;

pub use api::{CheckRunConclusion, CheckRunRequest, CheckRunStatus, GitHubApi};
pub use client::OctocrabClient;
pub use error::GitHubApiError;
