//! Webhook endpoint handler.
//!
//! Verifies the delivery's signature, parses the payload and routes the event,
//! all within the request. GitHub gets the outcome once handling has finished.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::commands::Executor;
use crate::github::GitHubApi;
use crate::types::DeliveryId;
use crate::webhooks::{ParseError, SignatureError, parse_webhook};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that reject a delivery before it reaches the router.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Signature missing, malformed or wrong.
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    /// The body is not a valid payload for its event type.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-GitHub-Event`: Event type (required)
///   - `X-GitHub-Delivery`: Delivery ID (optional, used in logs)
///   - `X-Hub-Signature-256`: HMAC-SHA256 signature (required when a secret
///     is configured)
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: handled or ignored; the body names the outcome
/// - 400 Bad Request: missing event header or malformed payload
/// - 401 Unauthorized: bad signature
pub async fn webhook_handler<G, E>(
    State(app_state): State<AppState<G, E>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, String), WebhookError>
where
    G: GitHubApi + 'static,
    E: Executor + 'static,
{
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = DeliveryId::new(
        get_header(&headers, HEADER_DELIVERY).unwrap_or_else(|_| "unknown".to_string()),
    );

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    // Verify before parsing anything.
    if let Some(secret) = app_state.webhook_secret() {
        let signature = headers.get(HEADER_SIGNATURE).and_then(|v| v.to_str().ok());
        if let Err(e) = secret.verify(&body, signature) {
            warn!(delivery_id = %delivery_id, error = %e, "Rejected webhook signature");
            return Err(e.into());
        }
    }

    let event = match parse_webhook(&event_type, &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Event not handled");
            return Ok((StatusCode::OK, "ignored".to_string()));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, event_type = %event_type, error = %e, "Malformed payload");
            return Err(e.into());
        }
    };

    let outcome = app_state.router().route(&event).await;

    info!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        repo = %event.repo_id(),
        outcome = %outcome,
        "Webhook handled"
    );
    Ok((StatusCode::OK, outcome.to_string()))
}

/// Extracts a header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
