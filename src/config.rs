//! Client configuration loaded from YAML
//!
//! ```yaml
//! base_url: https://gitlab.example.com
//! token_file: ~/.config/gitlab/token
//! token_type: private
//! timeout_seconds: 30
//! max_retries: 2
//! rate_limit:
//!   requests_per_second: 5
//! ```
//!
//! Environment variables (`GITLAB_BASE_URL`, `GITLAB_TOKEN`,
//! `GITLAB_TOKEN_TYPE`) override file values when
//! [`ClientConfig::with_env_overrides`] is applied.

use crate::auth::{AuthConfig, TokenType, REDACTED};
use crate::client::{Client, ClientBuilder, DEFAULT_BASE_URL};
use crate::error::{Error, Result};
use crate::http::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_BASE_URL: &str = "GITLAB_BASE_URL";
pub const ENV_TOKEN: &str = "GITLAB_TOKEN";
pub const ENV_TOKEN_TYPE: &str = "GITLAB_TOKEN_TYPE";

/// Everything needed to build a [`Client`]
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Instance URL, with or without the `/api/v4` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Token value, or the path of a file holding it
    #[serde(default)]
    pub token: Option<String>,

    /// File holding the token; takes precedence over `token`
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// How the token is sent; `none` allows anonymous access
    #[serde(default)]
    pub token_type: Option<TokenType>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub max_retries: u32,

    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    #[serde(default)]
    pub user_agent: Option<String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut headers: Vec<&str> = self.headers.keys().map(String::as_str).collect();
        headers.sort_unstable();
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("token_file", &self.token_file)
            .field("token_type", &self.token_type)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_retries", &self.max_retries)
            .field("rate_limit", &self.rate_limit)
            .field("user_agent", &self.user_agent)
            .field("insecure", &self.insecure)
            .field("headers", &headers)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            token_file: None,
            token_type: None,
            timeout_seconds: default_timeout_seconds(),
            max_retries: 0,
            rate_limit: None,
            user_agent: None,
            insecure: false,
            headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        debug!("Loaded config from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Parse a config document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `GITLAB_*` environment variables
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup; empty values are ignored
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.token = Some(token);
            self.token_file = None;
        }
        if let Some(kind) = lookup(ENV_TOKEN_TYPE) {
            match parse_token_type(&kind) {
                Ok(kind) => self.token_type = Some(kind),
                Err(_) => debug!("Ignoring unknown {}: {}", ENV_TOKEN_TYPE, kind),
            }
        }
        self
    }

    /// Resolve the token from `token_file` or `token`
    ///
    /// A `token` naming an existing file is read like `token_file`.
    pub fn resolve_token(&self) -> Result<Option<String>> {
        if let Some(path) = &self.token_file {
            return read_token_file(path).map(Some);
        }
        match self.token.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => {
                let path = Path::new(value);
                if path.is_file() {
                    read_token_file(path).map(Some)
                } else {
                    Ok(Some(value.to_string()))
                }
            }
        }
    }

    /// Credentials described by this config
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let token_type = self.token_type.unwrap_or_default();
        if token_type == TokenType::None {
            return Ok(AuthConfig::None);
        }
        match self.resolve_token()? {
            Some(token) => Ok(AuthConfig::from_token(token, token_type)),
            None => Err(Error::missing_field("token")),
        }
    }

    /// Check the config without building anything
    pub fn validate(&self) -> Result<()> {
        crate::client::normalize_base_url(&self.base_url)?;
        if self.timeout_seconds == 0 {
            return Err(Error::config("timeout_seconds must be greater than zero"));
        }
        if let Some(limit) = &self.rate_limit {
            if limit.requests_per_second == 0 {
                return Err(Error::config(
                    "rate_limit.requests_per_second must be greater than zero",
                ));
            }
        }
        Ok(())
    }

    /// Validate and build a client
    pub fn build_client(&self) -> Result<Client> {
        self.validate()?;
        let auth = self.auth_config()?;

        let mut builder = ClientBuilder::new(&self.base_url)
            .auth(auth)
            .timeout(Duration::from_secs(self.timeout_seconds))
            .max_retries(self.max_retries)
            .insecure(self.insecure);
        if let Some(limit) = &self.rate_limit {
            builder = builder.rate_limit(limit.clone());
        }
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        builder.build()
    }
}

fn parse_token_type(value: &str) -> Result<TokenType> {
    let normalized = value.trim().to_ascii_lowercase();
    Ok(serde_yaml::from_str(&normalized)?)
}

fn read_token_file(path: &Path) -> Result<String> {
    let token = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read token file '{}': {e}",
            path.display()
        ))
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::config(format!(
            "Token file '{}' is empty",
            path.display()
        )));
    }
    Ok(token.to_string())
}
