//! The API client
//!
//! A [`Client`] owns the normalised API root and the shared transport. It is
//! cheap to clone; every service holds its own clone.

use crate::auth::{AuthConfig, Authenticator};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::services::{
    AccessRequests, AuditEvents, Branches, BroadcastMessages, DeployKeys, DeployTokens, Jobs,
    MarkdownUploads, ProtectedBranches, SystemHooks, Todos,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default instance
pub const DEFAULT_BASE_URL: &str = "https://gitlab.com";

/// Path suffix of the REST API root
const API_VERSION_PATH: &str = "api/v4/";

/// GitLab REST API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    http: HttpClient,
}

impl Client {
    /// Create a client with default transport settings
    pub fn new(base_url: &str, auth: AuthConfig) -> Result<Self> {
        Self::builder(base_url).auth(auth).build()
    }

    /// Start building a client
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// API root, always ending in `api/v4/`
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The shared transport
    pub fn http(&self) -> &HttpClient {
        &self.inner.http
    }

    /// Project and group access requests
    pub fn access_requests(&self) -> AccessRequests {
        AccessRequests::new(self.clone())
    }

    /// Instance, group and project audit events
    pub fn audit_events(&self) -> AuditEvents {
        AuditEvents::new(self.clone())
    }

    /// Repository branches
    pub fn branches(&self) -> Branches {
        Branches::new(self.clone())
    }

    /// Instance broadcast messages
    pub fn broadcast_messages(&self) -> BroadcastMessages {
        BroadcastMessages::new(self.clone())
    }

    /// Deploy keys
    pub fn deploy_keys(&self) -> DeployKeys {
        DeployKeys::new(self.clone())
    }

    /// Deploy tokens
    pub fn deploy_tokens(&self) -> DeployTokens {
        DeployTokens::new(self.clone())
    }

    /// CI jobs and artifacts
    pub fn jobs(&self) -> Jobs {
        Jobs::new(self.clone())
    }

    /// Markdown uploads
    pub fn markdown_uploads(&self) -> MarkdownUploads {
        MarkdownUploads::new(self.clone())
    }

    /// Protected branches
    pub fn protected_branches(&self) -> ProtectedBranches {
        ProtectedBranches::new(self.clone())
    }

    /// System hooks
    pub fn system_hooks(&self) -> SystemHooks {
        SystemHooks::new(self.clone())
    }

    /// To-do items
    pub fn todos(&self) -> Todos {
        Todos::new(self.clone())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("http", &self.inner.http)
            .finish()
    }
}

/// Builder for [`Client`]
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    auth: AuthConfig,
    http_config: HttpClientConfig,
}

impl ClientBuilder {
    /// Create a builder for the given instance URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: AuthConfig::None,
            http_config: HttpClientConfig::default(),
        }
    }

    /// Set credentials
    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Replace the whole transport config
    #[must_use]
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set the default request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = timeout;
        self
    }

    /// Enable retries
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.http_config.max_retries = retries;
        self
    }

    /// Enable client-side rate limiting
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.http_config.rate_limit = Some(config);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.http_config.user_agent = agent.into();
        self
    }

    /// Accept invalid TLS certificates
    #[must_use]
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.http_config.accept_invalid_certs = insecure;
        self
    }

    /// Add a header sent with every request
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_config
            .default_headers
            .insert(key.into(), value.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<Client> {
        let base_url = normalize_base_url(&self.base_url)?;
        let token_url = oauth_token_url(&base_url)?;
        debug!("Creating client for {}", base_url);

        let http = HttpClient::with_auth(self.http_config, AuthConfig::None)?;
        let authenticator =
            Authenticator::with_client(self.auth, http.inner().clone()).token_url(token_url);
        let http = http.authenticator(authenticator);

        Ok(Client {
            inner: Arc::new(ClientInner { base_url, http }),
        })
    }
}

/// Normalise an instance URL to its API root
///
/// `https://gitlab.example.com` and `https://gitlab.example.com/api/v4`
/// both become `https://gitlab.example.com/api/v4/`.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::missing_field("base_url"));
    }

    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!("base URL must be http(s): {raw}")));
    }
    url.set_query(None);
    url.set_fragment(None);

    let mut path = url.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    if !path.ends_with(API_VERSION_PATH) {
        path.push_str(API_VERSION_PATH);
    }
    url.set_path(&path);
    Ok(url)
}

/// OAuth token endpoint next to the API root
fn oauth_token_url(api_root: &Url) -> Result<Url> {
    Ok(api_root.join("../../oauth/token")?)
}
