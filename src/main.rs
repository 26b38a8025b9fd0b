use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pr_steward::build::JenkinsConnector;
use pr_steward::checks::{CheckPublisher, PullRequestChecks};
use pr_steward::commands::{ActionExecutor, Dispatcher};
use pr_steward::config::{Config, GitHubAuth};
use pr_steward::github::OctocrabClient;
use pr_steward::router::EventRouter;
use pr_steward::server::{AppState, build_router};
use pr_steward::webhooks::WebhookSecret;

/// GitHub bot for pull request checks and comment commands.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path of the YAML configuration file.
    #[arg(long, env = "PR_STEWARD_CONFIG", default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // RUST_LOG wins over the configured level.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.directive()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(path = %args.config.display(), "Configuration loaded");

    let api_url = config.github.api_url.as_deref();
    let github = match config.github.auth()? {
        GitHubAuth::App {
            app_id,
            installation,
            private_key,
        } => {
            info!(app_id, installation, "Authenticating as GitHub App installation");
            OctocrabClient::from_app(app_id, installation, private_key, api_url)
        }
        GitHubAuth::Token(token) => OctocrabClient::from_token(token, api_url),
    }
    .context("creating GitHub client")?;
    let github = Arc::new(github);

    let executor = ActionExecutor::new(github.clone(), JenkinsConnector::new(config.jenkins.clone()));
    let dispatcher = Dispatcher::new(Arc::new(config.command_set()?), executor);
    let checks = PullRequestChecks::new(
        config.pull_request_checks()?,
        CheckPublisher::new(github),
    );

    let webhook_secret = config.github.webhook_secret.as_deref().map(WebhookSecret::new);
    if webhook_secret.is_none() {
        warn!("No webhookSecret configured; webhook signatures will not be verified");
    }

    let state = AppState::new(EventRouter::new(dispatcher, checks), webhook_secret);
    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
