//! Auth configuration types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Header carrying a personal, project or group access token
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Header carrying a CI job token
pub const JOB_TOKEN_HEADER: &str = "JOB-TOKEN";

/// Kind of token given in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Personal/project/group access token
    #[default]
    Private,
    /// OAuth2 access token
    #[serde(alias = "bearer")]
    Oauth,
    /// CI job token
    Job,
    /// No credentials
    None,
}

/// Authentication configuration
///
/// `Debug` output never contains secrets.
#[derive(Clone, Default)]
pub enum AuthConfig {
    /// No authentication
    #[default]
    None,

    /// `PRIVATE-TOKEN: <token>`
    PrivateToken {
        /// The access token
        token: String,
    },

    /// `Authorization: Bearer <token>`
    OAuthToken {
        /// The OAuth2 access token
        token: String,
    },

    /// `JOB-TOKEN: <token>`
    JobToken {
        /// The CI job token
        token: String,
    },

    /// OAuth2 password grant against `/oauth/token`
    Password {
        /// Username or email
        username: String,
        /// Password
        password: String,
    },

    /// Custom headers
    CustomHeaders {
        /// Headers to add to each request
        headers: HashMap<String, String>,
    },
}

impl AuthConfig {
    /// Build an auth config from a token and its type
    pub fn from_token(token: impl Into<String>, token_type: TokenType) -> Self {
        let token = token.into();
        match token_type {
            TokenType::Private => Self::PrivateToken { token },
            TokenType::Oauth => Self::OAuthToken { token },
            TokenType::Job => Self::JobToken { token },
            TokenType::None => Self::None,
        }
    }

    /// Private token auth
    pub fn private_token(token: impl Into<String>) -> Self {
        Self::PrivateToken {
            token: token.into(),
        }
    }

    /// OAuth bearer token auth
    pub fn oauth_token(token: impl Into<String>) -> Self {
        Self::OAuthToken {
            token: token.into(),
        }
    }

    /// CI job token auth
    pub fn job_token(token: impl Into<String>) -> Self {
        Self::JobToken {
            token: token.into(),
        }
    }

    /// Whether any credentials are configured
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

pub(crate) const REDACTED: &str = "[redacted]";

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::PrivateToken { .. } => f
                .debug_struct("PrivateToken")
                .field("token", &REDACTED)
                .finish(),
            Self::OAuthToken { .. } => f
                .debug_struct("OAuthToken")
                .field("token", &REDACTED)
                .finish(),
            Self::JobToken { .. } => f
                .debug_struct("JobToken")
                .field("token", &REDACTED)
                .finish(),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &REDACTED)
                .finish(),
            Self::CustomHeaders { headers } => {
                let mut names: Vec<&str> = headers.keys().map(String::as_str).collect();
                names.sort_unstable();
                f.debug_struct("CustomHeaders")
                    .field("headers", &names)
                    .finish_non_exhaustive()
            }
        }
    }
}

/// Cached token with expiration
#[derive(Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &REDACTED)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: String, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self {
            token,
            expires_at: Some(expires_at),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}
