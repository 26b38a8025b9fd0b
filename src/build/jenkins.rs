//! Jenkins implementation of the build traits.
//!
//! Jobs are addressed by URL: a top-level job lives at `{base}/job/{name}/` and a
//! job nested in a folder or multibranch pipeline at `{parent}/job/{name}/`.
//! Existence is checked with `GET .../api/json`; builds are triggered with
//! `POST .../buildWithParameters?key=value`, which Jenkins answers with
//! `201 Created` once the build is queued.

use std::fmt;

use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::BuildError;
use super::{BuildBackend, BuildConnector, BuildParams};

const USER_AGENT: &str = concat!("pr-steward/", env!("CARGO_PKG_VERSION"));

/// Connection settings for a Jenkins server.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct JenkinsConfig {
    /// Root URL of the server, e.g. `https://ci.example.com/`.
    pub url: String,

    /// User name for HTTP basic auth.
    #[serde(default)]
    pub user: Option<String>,

    /// API token for HTTP basic auth.
    #[serde(default)]
    pub token: Option<String>,
}

impl fmt::Debug for JenkinsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JenkinsConfig")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Opens [`JenkinsClient`] sessions from a [`JenkinsConfig`].
#[derive(Debug, Clone)]
pub struct JenkinsConnector {
    config: JenkinsConfig,
}

impl JenkinsConnector {
    pub fn new(config: JenkinsConfig) -> Self {
        Self { config }
    }
}

impl BuildConnector for JenkinsConnector {
    type Backend = JenkinsClient;

    async fn connect(&self) -> Result<JenkinsClient, BuildError> {
        let base = parse_base_url(&self.config.url)?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(BuildError::Client)?;

        let credentials = self
            .config
            .user
            .clone()
            .zip(self.config.token.clone());

        let client = JenkinsClient {
            http,
            base,
            credentials,
        };

        let probe = join(&client.base, "api/json")?;
        let status = client.send(Method::GET, probe.clone()).await?;
        if !status.is_success() {
            return Err(BuildError::Status {
                url: probe.to_string(),
                status: status.as_u16(),
            });
        }

        debug!(url = %client.base, "Connected to Jenkins");
        Ok(client)
    }
}

/// A connected Jenkins session.
#[derive(Clone)]
pub struct JenkinsClient {
    http: reqwest::Client,
    base: Url,
    credentials: Option<(String, String)>,
}

impl fmt::Debug for JenkinsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

/// A job located on a Jenkins server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JenkinsJob {
    name: String,
    url: Url,
}

impl JenkinsJob {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The job URL, always ending in `/`.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl JenkinsClient {
    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some((user, token)) => builder.basic_auth(user, Some(token)),
            None => builder,
        }
    }

    async fn send(&self, method: Method, url: Url) -> Result<StatusCode, BuildError> {
        let response = self
            .request(method, url.clone())
            .send()
            .await
            .map_err(|source| BuildError::Request {
                url: url.to_string(),
                source,
            })?;
        Ok(response.status())
    }

    async fn find_job(&self, parent: &Url, name: &str) -> Result<JenkinsJob, BuildError> {
        let url = job_url(parent, name)?;
        let api = join(&url, "api/json")?;

        match self.send(Method::GET, api.clone()).await? {
            StatusCode::NOT_FOUND => Err(BuildError::JobNotFound(name.to_string())),
            status if status.is_success() => Ok(JenkinsJob {
                name: name.to_string(),
                url,
            }),
            status => Err(BuildError::Status {
                url: api.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

impl BuildBackend for JenkinsClient {
    type Job = JenkinsJob;

    async fn get_job(&self, name: &str) -> Result<JenkinsJob, BuildError> {
        self.find_job(&self.base, name).await
    }

    async fn get_inner_job(&self, parent: &JenkinsJob, name: &str) -> Result<JenkinsJob, BuildError> {
        self.find_job(&parent.url, name).await
    }

    async fn invoke(&self, job: &JenkinsJob, params: &BuildParams) -> Result<(), BuildError> {
        let mut url = join(&job.url, "buildWithParameters")?;
        url.query_pairs_mut().extend_pairs(params.iter());

        let status = self.send(Method::POST, url.clone()).await?;
        if !status.is_success() {
            return Err(BuildError::Status {
                url: job.url.to_string(),
                status: status.as_u16(),
            });
        }

        info!(job = %job.url, "Build queued");
        Ok(())
    }
}

/// Parses the server root, normalising it to end in `/` so relative joins
/// append instead of replacing the last segment.
fn parse_base_url(raw: &str) -> Result<Url, BuildError> {
    let invalid = |reason: String| BuildError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// `{parent}/job/{name}/`, with `name` percent-encoded as a single segment.
fn job_url(parent: &Url, name: &str) -> Result<Url, BuildError> {
    let mut url = parent.clone();
    url.path_segments_mut()
        .map_err(|()| BuildError::InvalidUrl {
            url: parent.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .push("job")
        .push(name)
        .push("");
    Ok(url)
}

fn join(base: &Url, path: &str) -> Result<Url, BuildError> {
    base.join(path).map_err(|e| BuildError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::extract::{Path, Query, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{get, post};

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(
            parse_base_url("https://ci.example.com").unwrap().as_str(),
            "https://ci.example.com/"
        );
        assert_eq!(
            parse_base_url("https://ci.example.com/jenkins").unwrap().as_str(),
            "https://ci.example.com/jenkins/"
        );
        assert_eq!(
            parse_base_url("https://ci.example.com/jenkins/").unwrap().as_str(),
            "https://ci.example.com/jenkins/"
        );
    }

    #[test]
    fn base_url_rejects_garbage() {
        assert!(matches!(
            parse_base_url("not a url"),
            Err(BuildError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_base_url("mailto:ci@example.com"),
            Err(BuildError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn job_urls_nest() {
        let base = parse_base_url("https://ci.example.com/jenkins").unwrap();
        let repo = job_url(&base, "my-repo").unwrap();
        assert_eq!(repo.as_str(), "https://ci.example.com/jenkins/job/my-repo/");

        let pr = job_url(&repo, "PR-7").unwrap();
        assert_eq!(
            pr.as_str(),
            "https://ci.example.com/jenkins/job/my-repo/job/PR-7/"
        );
        assert_eq!(
            join(&pr, "api/json").unwrap().as_str(),
            "https://ci.example.com/jenkins/job/my-repo/job/PR-7/api/json"
        );
    }

    #[test]
    fn job_names_are_encoded_as_one_segment() {
        let base = parse_base_url("https://ci.example.com/").unwrap();
        let url = job_url(&base, "team/repo name").unwrap();
        assert_eq!(url.as_str(), "https://ci.example.com/job/team%2Frepo%20name/");
    }

    #[test]
    fn debug_redacts_token() {
        let config = JenkinsConfig {
            url: "https://ci.example.com".to_string(),
            user: Some("bot".to_string()),
            token: Some("s3cret".to_string()),
        };
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("bot"));
        assert!(!rendered.contains("s3cret"));
    }

    // ─── Against a fake Jenkins ───

    #[derive(Clone, Default)]
    struct FakeJenkins {
        builds: Arc<Mutex<Vec<(String, String, HashMap<String, String>, Option<String>)>>>,
    }

    async fn job_api(Path(name): Path<String>) -> AxumStatus {
        if name == "my-repo" {
            AxumStatus::OK
        } else {
            AxumStatus::NOT_FOUND
        }
    }

    async fn inner_job_api(Path((name, inner)): Path<(String, String)>) -> AxumStatus {
        if name == "my-repo" && inner == "PR-7" {
            AxumStatus::OK
        } else {
            AxumStatus::NOT_FOUND
        }
    }

    async fn build_with_parameters(
        State(fake): State<FakeJenkins>,
        Path((name, inner)): Path<(String, String)>,
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> AxumStatus {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        fake.builds.lock().unwrap().push((name, inner, params, auth));
        AxumStatus::CREATED
    }

    async fn spawn_fake_jenkins(fake: FakeJenkins) -> String {
        let app = Router::new()
            .route("/api/json", get(|| async { "{}" }))
            .route("/job/{name}/api/json", get(job_api))
            .route("/job/{name}/job/{inner}/api/json", get(inner_job_api))
            .route(
                "/job/{name}/job/{inner}/buildWithParameters",
                post(build_with_parameters),
            )
            .with_state(fake);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn connector(url: String) -> JenkinsConnector {
        JenkinsConnector::new(JenkinsConfig {
            url,
            user: Some("bot".to_string()),
            token: Some("token".to_string()),
        })
    }

    #[tokio::test]
    async fn triggers_nested_job_with_parameters() {
        let fake = FakeJenkins::default();
        let url = spawn_fake_jenkins(fake.clone()).await;

        let client = connector(url).connect().await.unwrap();
        let repo = client.get_job("my-repo").await.unwrap();
        let pr = client.get_inner_job(&repo, "PR-7").await.unwrap();
        assert_eq!(pr.name(), "PR-7");

        let params = BuildParams::from([("BRANCH".to_string(), "main".to_string())]);
        client.invoke(&pr, &params).await.unwrap();

        let builds = fake.builds.lock().unwrap();
        assert_eq!(builds.len(), 1);
        let (name, inner, query, auth) = &builds[0];
        assert_eq!(name, "my-repo");
        assert_eq!(inner, "PR-7");
        assert_eq!(query.get("BRANCH").map(String::as_str), Some("main"));
        // base64("bot:token")
        assert_eq!(auth.as_deref(), Some("Basic Ym90OnRva2Vu"));
    }

    #[tokio::test]
    async fn missing_jobs_are_not_found() {
        let url = spawn_fake_jenkins(FakeJenkins::default()).await;
        let client = connector(url).connect().await.unwrap();

        assert!(matches!(
            client.get_job("other-repo").await,
            Err(BuildError::JobNotFound(name)) if name == "other-repo"
        ));

        let repo = client.get_job("my-repo").await.unwrap();
        assert!(matches!(
            client.get_inner_job(&repo, "PR-8").await,
            Err(BuildError::JobNotFound(name)) if name == "PR-8"
        ));
    }

    #[tokio::test]
    async fn connect_fails_when_server_unreachable() {
        // Bind and drop to get a port nobody listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = connector(format!("http://{}", addr)).connect().await;
        assert!(matches!(result, Err(BuildError::Request { .. })));
    }

    #[tokio::test]
    async fn connect_fails_on_invalid_url() {
        let result = connector("::nonsense::".to_string()).connect().await;
        assert!(matches!(result, Err(BuildError::InvalidUrl { .. })));
    }
}
