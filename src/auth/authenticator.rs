//! Authenticator implementation
//!
//! Handles applying authentication to requests and managing the password
//! grant token.

use super::types::{AuthConfig, CachedToken, JOB_TOKEN_HEADER, PRIVATE_TOKEN_HEADER};
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

/// Token endpoint answer for the password grant
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Cached token for the password grant
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
    /// OAuth token endpoint
    token_url: Option<Url>,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(config: AuthConfig, http_client: Client) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
            token_url: None,
        }
    }

    /// Set the OAuth token endpoint used by the password grant
    #[must_use]
    pub fn token_url(mut self, url: Url) -> Self {
        self.token_url = Some(url);
        self
    }

    /// An authenticator for other credentials on the same endpoint
    ///
    /// Shares the HTTP client and token URL but starts with an empty token
    /// cache.
    pub fn for_config(&self, config: AuthConfig) -> Self {
        Self {
            config,
            cached_token: Arc::new(RwLock::new(None)),
            http_client: self.http_client.clone(),
            token_url: self.token_url.clone(),
        }
    }

    /// The configured auth
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::Password { .. } => {
                let token = self.get_or_refresh_token().await?;
                Ok(req.bearer_auth(token))
            }
            other => Ok(apply_static(other, req)),
        }
    }

    /// Get a valid token, refreshing if necessary
    async fn get_or_refresh_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // another task may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_password_token().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    async fn fetch_password_token(&self) -> Result<CachedToken> {
        let AuthConfig::Password { username, password } = &self.config else {
            return Err(Error::auth(
                "Token refresh not supported for this auth type",
            ));
        };
        let token_url = self
            .token_url
            .clone()
            .ok_or_else(|| Error::auth("No OAuth token endpoint configured"))?;

        debug!("Requesting OAuth token from {}", token_url);

        let response = self
            .http_client
            .post(token_url)
            .json(&serde_json::json!({
                "grant_type": "password",
                "username": username,
                "password": password,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Password grant failed with {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Invalid token response: {e}")))?;

        Ok(match token.expires_in {
            Some(seconds) => CachedToken::expires_in(token.access_token, seconds),
            None => CachedToken::new(token.access_token, None),
        })
    }
}

/// Apply credentials that need no network round trip
///
/// The password grant needs a token fetch and is left to [`Authenticator`].
pub(crate) fn apply_static(config: &AuthConfig, req: RequestBuilder) -> RequestBuilder {
    match config {
        AuthConfig::None | AuthConfig::Password { .. } => req,
        AuthConfig::PrivateToken { token } => req.header(PRIVATE_TOKEN_HEADER, token),
        AuthConfig::OAuthToken { token } => req.bearer_auth(token),
        AuthConfig::JobToken { token } => req.header(JOB_TOKEN_HEADER, token),
        AuthConfig::CustomHeaders { headers } => {
            let mut req = req;
            for (key, value) in headers {
                req = req.header(key.as_str(), value.as_str());
            }
            req
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.config {
            AuthConfig::None => "none",
            AuthConfig::PrivateToken { .. } => "private_token",
            AuthConfig::OAuthToken { .. } => "oauth_token",
            AuthConfig::JobToken { .. } => "job_token",
            AuthConfig::Password { .. } => "password",
            AuthConfig::CustomHeaders { .. } => "custom_headers",
        };
        f.debug_struct("Authenticator")
            .field("kind", &kind)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}
