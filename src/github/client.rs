//! Octocrab-backed implementation of [`GitHubApi`].

use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use tracing::debug;

use crate::types::{PrNumber, RepoId};

use super::api::{CheckRunRequest, GitHubApi};
use super::error::GitHubApiError;

/// A GitHub API client shared by all deliveries.
///
/// Unlike a repo-scoped client, the repository is passed per call because a
/// single installation receives events from many repositories.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
}

impl OctocrabClient {
    /// Wraps a pre-configured Octocrab instance.
    ///
    /// Use this when you need custom authentication (e.g., GitHub App
    /// installation tokens).
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Creates a client authenticated with a token.
    ///
    /// `api_url` overrides the API root for GitHub Enterprise installations.
    pub fn from_token(
        token: impl Into<String>,
        api_url: Option<&str>,
    ) -> Result<Self, GitHubApiError> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(GitHubApiError::from_octocrab)?;
        }
        let client = builder.build().map_err(GitHubApiError::from_octocrab)?;
        Ok(Self::new(client))
    }

    /// Creates a client acting as one installation of a GitHub App.
    ///
    /// `private_key` is the App's PEM-encoded RSA key. Installation tokens are
    /// minted and refreshed by octocrab as they expire.
    pub fn from_app(
        app_id: u64,
        installation: u64,
        private_key: &str,
        api_url: Option<&str>,
    ) -> Result<Self, GitHubApiError> {
        let key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key.as_bytes()).map_err(|e| {
            GitHubApiError::without_source(format!("invalid App private key: {e}"))
        })?;

        let mut builder = Octocrab::builder().app(AppId(app_id), key);
        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(GitHubApiError::from_octocrab)?;
        }
        let app = builder.build().map_err(GitHubApiError::from_octocrab)?;
        let client = app
            .installation(InstallationId(installation))
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }
}

impl GitHubApi for OctocrabClient {
    async fn create_comment(
        &self,
        repo: &RepoId,
        issue: PrNumber,
        body: &str,
    ) -> Result<(), GitHubApiError> {
        let comment = self
            .client
            .issues(&repo.owner, &repo.repo)
            .create_comment(issue.0, body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        debug!(repo = %repo, pr = %issue, comment_id = comment.id.into_inner(), "Comment posted");
        Ok(())
    }

    async fn create_check_run(
        &self,
        repo: &RepoId,
        request: &CheckRunRequest,
    ) -> Result<(), GitHubApiError> {
        let route = format!("/repos/{}/{}/check-runs", repo.owner, repo.repo);

        let _: serde_json::Value = self
            .client
            .post(route, Some(request))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        debug!(
            repo = %repo,
            sha = %request.head_sha.short(),
            check = %request.name,
            "Check run created"
        );
        Ok(())
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient").finish_non_exhaustive()
    }
}
