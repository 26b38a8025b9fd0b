//! YAML configuration.
//!
//! The whole file is read once at startup. Loading also builds the command set
//! and compiles the check rules, so a bad pattern or a duplicate command is a
//! startup error rather than a failure on the first delivery.

use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::build::JenkinsConfig;
use crate::checks::{DEFAULT_BODY_CHECK_NAME, DEFAULT_TITLE_CHECK_NAME, PullRequestCheck};
use crate::commands::{CommandDefinition, CommandSet, CommandSetError};
use crate::rules::{
    DEFAULT_BODY_PATTERN, DEFAULT_BODY_PLACEHOLDER, DEFAULT_TITLE_PATTERN, RuleError,
    ValidationRule,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid commands: {0}")]
    Commands(#[from] CommandSetError),

    #[error("invalid {field}: {source}")]
    Rule {
        field: &'static str,
        #[source]
        source: RuleError,
    },

    #[error("github: set either token or appId, appInstallation and appPrivateKey")]
    MissingCredentials,

    #[error("github: appId, appInstallation and appPrivateKey must be set together")]
    IncompleteApp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub github: GitHubConfig,
    #[serde(default)]
    pub jenkins: JenkinsConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfig {
    /// Personal or installation token. Ignored when App credentials are set.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub app_id: Option<u64>,
    #[serde(default)]
    pub app_installation: Option<u64>,
    /// PEM-encoded RSA key of the GitHub App.
    #[serde(default)]
    pub app_private_key: Option<String>,

    /// Secret for `X-Hub-Signature-256`. Signatures are not checked when unset.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// API root for GitHub Enterprise.
    #[serde(default)]
    pub api_url: Option<String>,

    #[serde(default)]
    pub pull_requests: PullRequestsConfig,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("app_id", &self.app_id)
            .field("app_installation", &self.app_installation)
            .field("webhook_secret", &self.webhook_secret.as_ref().map(|_| "<redacted>"))
            .field("pull_requests", &self.pull_requests)
            .finish_non_exhaustive()
    }
}

/// Credentials the GitHub client is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubAuth<'a> {
    App {
        app_id: u64,
        installation: u64,
        private_key: &'a str,
    },
    Token(&'a str),
}

impl GitHubConfig {
    /// App credentials take precedence over a token.
    pub fn auth(&self) -> Result<GitHubAuth<'_>, ConfigError> {
        match (
            self.app_id,
            self.app_installation,
            self.app_private_key.as_deref(),
        ) {
            (Some(app_id), Some(installation), Some(private_key)) => Ok(GitHubAuth::App {
                app_id,
                installation,
                private_key,
            }),
            (None, None, None) => self
                .token
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(GitHubAuth::Token)
                .ok_or(ConfigError::MissingCredentials),
            _ => Err(ConfigError::IncompleteApp),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestsConfig {
    #[serde(default)]
    pub check_title: bool,
    #[serde(default)]
    pub check_body: bool,
    #[serde(default)]
    pub title_check_name: Option<String>,
    #[serde(default)]
    pub body_check_name: Option<String>,
    #[serde(default)]
    pub title_pattern: Option<String>,
    #[serde(default)]
    pub body_pattern: Option<String>,
    #[serde(default)]
    pub body_placeholder: Option<String>,
    #[serde(default)]
    pub commands: CommandsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub command: Vec<CommandDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    /// Accepts `8080` or `"8080"`.
    #[serde(default = "default_port", deserialize_with = "deserialize_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid port {text:?}"))),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "debug".to_string()
}

impl LoggingConfig {
    /// The `EnvFilter` directive for the configured level.
    ///
    /// Unknown names fall back to `debug` instead of being read as a target.
    pub fn directive(&self) -> &'static str {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" | "warning" => "warn",
            "error" | "fatal" | "panic" => "error",
            _ => "debug",
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a configuration document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.github.auth()?;
        config.command_set()?;
        config.pull_request_checks()?;
        Ok(config)
    }

    pub fn command_set(&self) -> Result<CommandSet, ConfigError> {
        let commands = &self.github.pull_requests.commands;
        Ok(CommandSet::new(
            commands.prefix.clone(),
            commands.command.clone(),
        )?)
    }

    /// The enabled checks, title first.
    pub fn pull_request_checks(&self) -> Result<Vec<PullRequestCheck>, ConfigError> {
        let prs = &self.github.pull_requests;
        let mut checks = Vec::new();

        if prs.check_title {
            let pattern = prs.title_pattern.as_deref().unwrap_or(DEFAULT_TITLE_PATTERN);
            let rule = ValidationRule::matching(pattern).map_err(|source| ConfigError::Rule {
                field: "titlePattern",
                source,
            })?;
            let name = prs.title_check_name.as_deref().unwrap_or(DEFAULT_TITLE_CHECK_NAME);
            checks.push(PullRequestCheck::title(name, rule));
        }

        if prs.check_body {
            let pattern = prs.body_pattern.as_deref().unwrap_or(DEFAULT_BODY_PATTERN);
            let placeholder = prs
                .body_placeholder
                .as_deref()
                .unwrap_or(DEFAULT_BODY_PLACEHOLDER);
            let rule = ValidationRule::extracting(pattern, placeholder).map_err(|source| {
                ConfigError::Rule {
                    field: "bodyPattern",
                    source,
                }
            })?;
            let name = prs.body_check_name.as_deref().unwrap_or(DEFAULT_BODY_CHECK_NAME);
            checks.push(PullRequestCheck::body(name, rule));
        }

        Ok(checks)
    }

    /// `address:port` for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.address, self.server.port)
    }
}
