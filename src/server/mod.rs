//! HTTP server.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries and handles them inline
//! - `GET /healthz` - Returns 200 if the server is running

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

use crate::commands::Executor;
use crate::github::GitHubApi;
use crate::router::EventRouter;
use crate::webhooks::WebhookSecret;

/// Shared application state.
///
/// Passed to all handlers via Axum's `State` extractor. Everything in it is
/// read-only after startup.
pub struct AppState<G, E> {
    inner: Arc<AppStateInner<G, E>>,
}

struct AppStateInner<G, E> {
    router: EventRouter<G, E>,

    /// `None` disables signature verification.
    webhook_secret: Option<WebhookSecret>,
}

impl<G, E> Clone for AppState<G, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, E> AppState<G, E>
where
    G: GitHubApi,
    E: Executor,
{
    pub fn new(router: EventRouter<G, E>, webhook_secret: Option<WebhookSecret>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                router,
                webhook_secret,
            }),
        }
    }

    pub fn router(&self) -> &EventRouter<G, E> {
        &self.inner.router
    }

    pub fn webhook_secret(&self) -> Option<&WebhookSecret> {
        self.inner.webhook_secret.as_ref()
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<G, E>(app_state: AppState<G, E>) -> axum::Router
where
    G: GitHubApi + 'static,
    E: Executor + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<G, E>))
        .route("/healthz", get(health_handler))
        .with_state(app_state)
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::checks::{CheckPublisher, PullRequestCheck, PullRequestChecks};
    use crate::commands::{ActionExecutor, CommandDefinition, CommandSet, Dispatcher};
    use crate::github::CheckRunConclusion;
    use crate::rules::ValidationRule;
    use crate::test_utils::{FakeBuilds, FakeGitHub};

    type TestState = AppState<FakeGitHub, ActionExecutor<FakeGitHub, Arc<FakeBuilds>>>;

    fn test_app_state(
        secret: Option<&str>,
    ) -> (TestState, Arc<FakeGitHub>, Arc<FakeBuilds>) {
        let github = Arc::new(FakeGitHub::default());
        let builds = Arc::new(FakeBuilds::default());

        let commands = CommandSet::new(
            "/bot ",
            vec![CommandDefinition::new("build", 2).with_success_message("Build triggered")],
        )
        .unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(commands),
            ActionExecutor::new(github.clone(), builds.clone()),
        );
        let checks = PullRequestChecks::new(
            vec![
                PullRequestCheck::title("Pull Request Title", ValidationRule::default_title()),
                PullRequestCheck::body("Pull Request Description", ValidationRule::default_body()),
            ],
            CheckPublisher::new(github.clone()),
        );

        let state = AppState::new(
            EventRouter::new(dispatcher, checks),
            secret.map(WebhookSecret::new),
        );
        (state, github, builds)
    }

    fn webhook_request(
        secret: Option<&str>,
        event_type: &str,
        body: &serde_json::Value,
    ) -> Request<Body> {
        let body_bytes = serde_json::to_vec(body).unwrap();

        let mut builder = Request::builder()
            .method("POST")
            .uri("/webhook")
            .header("content-type", "application/json")
            .header("x-github-event", event_type)
            .header("x-github-delivery", "72d3162e-cc78-11e3-81ab-4c9367dc0958");
        if let Some(secret) = secret {
            builder = builder.header(
                "x-hub-signature-256",
                WebhookSecret::new(secret).sign(&body_bytes),
            );
        }
        builder.body(Body::from(body_bytes)).unwrap()
    }

    fn pull_request_payload(title: &str) -> serde_json::Value {
        serde_json::json!({
            "action": "opened",
            "pull_request": {
                "number": 5,
                "title": title,
                "body": "## Description\nReal text\n## Other information\n",
                "head": { "sha": "d".repeat(40) }
            },
            "repository": { "name": "widgets", "owner": { "login": "acme" } }
        })
    }

    fn comment_payload(body: &str) -> serde_json::Value {
        serde_json::json!({
            "action": "created",
            "comment": { "body": body, "user": { "login": "octocat" } },
            "issue": { "number": 5, "pull_request": {} },
            "repository": { "name": "widgets", "owner": { "login": "acme" } }
        })
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ─── Health endpoint ───

    #[tokio::test]
    async fn healthz_returns_ok() {
        let (state, _, _) = test_app_state(None);
        let app = build_router(state);

        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Ok");
    }

    // ─── Webhook endpoint ───

    #[tokio::test]
    async fn signed_pull_request_publishes_checks() {
        let (state, github, _) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(
            Some("secret"),
            "pull_request",
            &pull_request_payload("feat(api): add webhook"),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "checks published: 2/2");

        let runs = github.check_runs.lock().unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs
            .iter()
            .all(|(_, r)| r.conclusion == Some(CheckRunConclusion::Success)));
    }

    #[tokio::test]
    async fn bad_signature_returns_401_and_does_nothing() {
        let (state, github, _) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(
            Some("not-the-secret"),
            "pull_request",
            &pull_request_payload("feat: x"),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(github.check_runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_signature_returns_401_when_secret_configured() {
        let (state, _, _) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(None, "pull_request", &pull_request_payload("feat: x"));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unsigned_delivery_accepted_without_secret() {
        let (state, github, _) = test_app_state(None);
        let app = build_router(state);

        let request = webhook_request(None, "pull_request", &pull_request_payload("Add webhook"));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let runs = github.check_runs.lock().unwrap();
        assert_eq!(runs[0].1.conclusion, Some(CheckRunConclusion::Failure));
    }

    #[tokio::test]
    async fn missing_event_header_returns_400() {
        let (state, _, _) = test_app_state(None);
        let app = build_router(state);

        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .body(Body::from("{}"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_payload_returns_400() {
        let (state, _, _) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(
            Some("secret"),
            "issue_comment",
            &serde_json::json!({ "action": "created" }),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unhandled_event_returns_200_ignored() {
        let (state, _, _) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(Some("secret"), "push", &serde_json::json!({ "ref": "x" }));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ignored");
    }

    #[tokio::test]
    async fn build_comment_triggers_build() {
        let (state, github, builds) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(
            Some("secret"),
            "issue_comment",
            &comment_payload("/bot build BRANCH main"),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "command executed");
        assert_eq!(builds.invocations.lock().unwrap().len(), 1);
        assert_eq!(github.comments.lock().unwrap()[0].2, "Build triggered");
    }

    #[tokio::test]
    async fn rejected_command_still_returns_200() {
        let (state, github, builds) = test_app_state(Some("secret"));
        let app = build_router(state);

        let request = webhook_request(
            Some("secret"),
            "issue_comment",
            &comment_payload("/bot build BRANCH"),
        );
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_text(response).await,
            "command rejected: invalid number of parameters"
        );
        assert!(builds.calls.lock().unwrap().is_empty());
        assert!(github.comments.lock().unwrap().is_empty());
    }
}
