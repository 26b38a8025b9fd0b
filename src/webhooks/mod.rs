//! GitHub webhook deliveries.
//!
//! - [`WebhookSecret`] verifies the HMAC-SHA256 signature of a raw delivery
//! - [`parse_webhook`] turns the verified payload into a typed [`GitHubEvent`]

mod events;
mod parser;
mod signature;

pub use events::{
    CommentAction, GitHubEvent, IssueCommentEvent, PrAction, PullRequestEvent,
};
pub use parser::{ParseError, parse_webhook};
pub use signature::{SignatureError, WebhookSecret, parse_signature_header};
