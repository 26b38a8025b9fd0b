//! Error types for build server access.

use thiserror::Error;

/// Errors returned by a build server.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The configured server URL cannot be used.
    #[error("invalid build server URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete (connection refused, TLS, timeout...).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server has no job with this name.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// The server answered with an unexpected status.
    #[error("unexpected HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Returned by test doubles and other non-HTTP backends.
    #[error("{0}")]
    Other(String),
}
