//! GitHub API error type.
//!
//! Nothing in this crate retries, so errors are not classified as transient or
//! permanent. They carry enough context to be logged once and dropped.

use std::fmt;
use thiserror::Error;

/// A failed GitHub API call.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if one could be recovered.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Wraps an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let message = err.to_string();
        Self {
            status_code: extract_status_code(&message),
            message,
            source: Some(err),
        }
    }

    /// Creates an error that did not come from octocrab (used by test doubles
    /// and client construction).
    pub fn without_source(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            source: None,
        }
    }
}

/// Recovers an HTTP status code from an octocrab error message.
///
/// octocrab does not expose the status uniformly across its error variants, so
/// this looks for a `status: NNN` fragment and falls back to well-known codes.
fn extract_status_code(message: &str) -> Option<u16> {
    if let Some(idx) = message.find("status: ") {
        let digits: String = message[idx + 8..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    [401, 403, 404, 409, 422, 429, 500, 502, 503]
        .into_iter()
        .find(|code| message.contains(&code.to_string()))
}
