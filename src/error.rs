//! Error types for the GitLab REST client
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into four groups:
//!
//! - **Construction**: detected locally before any network I/O
//! - **Transport**: surfaced as-is from reqwest
//! - **API**: the server answered with a non-2xx status
//! - **Decode**: the server answered 2xx but the body did not match the expected shape

use crate::response::Response;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// The main error type for the GitLab REST client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Construction Errors
    // ============================================================================
    #[error("Invalid resource identifier: {message}")]
    InvalidId { message: String },

    #[error("Missing required option: {field}")]
    MissingOption { field: String },

    #[error("Path template '{template}' expects {expected} arguments, got {actual}")]
    PathArguments {
        template: String,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to encode request options: {message}")]
    Encode { message: String },

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // API Errors
    // ============================================================================
    #[error(transparent)]
    Api(Box<ApiError>),

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Failed to decode {status} response: {message}")]
    Decode {
        status: u16,
        message: String,
        response: Box<Response>,
    },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// A non-2xx answer from the server
#[derive(Error, Debug)]
#[error("{method} {url}: {status} {message}")]
pub struct ApiError {
    /// Request method
    pub method: Method,
    /// Request URL (including query)
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Message extracted from the error body
    pub message: String,
    /// Raw error body
    pub body: String,
    /// Response metadata
    pub response: Response,
}

impl ApiError {
    /// Build an API error from a response body
    pub fn new(method: Method, url: impl Into<String>, body: &[u8], response: Response) -> Self {
        let status = response.status;
        Self {
            method,
            url: url.into(),
            status: status.as_u16(),
            message: parse_error_message(body, status),
            body: String::from_utf8_lossy(body).into_owned(),
            response,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Self::Api(Box::new(err))
    }
}

impl Error {
    /// Create an invalid identifier error
    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    /// Create a missing option error
    pub fn missing_option(field: impl Into<String>) -> Self {
        Self::MissingOption {
            field: field.into(),
        }
    }

    /// Create an encode error
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing config field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>, response: Response) -> Self {
        Self::Decode {
            status: response.status.as_u16(),
            message: message.into(),
            response: Box::new(response),
        }
    }

    /// HTTP status of the response that caused this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            Error::Decode { status, .. } => Some(*status),
            Error::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Response metadata carried by this error, if any
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api(err) => Some(&err.response),
            Error::Decode { response, .. } => Some(response),
            _ => None,
        }
    }

    /// 404 Not Found
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// 403 Forbidden
    pub fn is_forbidden(&self) -> bool {
        self.status_code() == Some(403)
    }

    /// 400 Bad Request or 422 Unprocessable Entity
    pub fn is_validation_failed(&self) -> bool {
        matches!(self.status_code(), Some(400 | 422))
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(err) => err.is_timeout() || err.is_connect(),
            Error::Timeout { .. } => true,
            Error::Api(err) => is_retryable_status(err.status),
            _ => false,
        }
    }

    /// Whether the error was raised before any network I/O
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Error::InvalidId { .. }
                | Error::MissingOption { .. }
                | Error::PathArguments { .. }
                | Error::Encode { .. }
                | Error::InvalidHeader { .. }
        )
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Extract a human readable message from an error body
///
/// GitLab answers with `{"message": ...}` where the message is a string, a
/// list, or an object of field errors, or with `{"error": ..., "error_description": ...}`.
pub(crate) fn parse_error_message(body: &[u8], status: StatusCode) -> String {
    let fallback = || {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            status.canonical_reason().unwrap_or("").to_string()
        } else {
            text
        }
    };

    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return fallback();
    };

    if let Some(message) = map.get("message") {
        return flatten_message(message);
    }

    if let Some(Value::String(error)) = map.get("error") {
        return match map.get("error_description") {
            Some(Value::String(description)) => format!("{error}: {description}"),
            _ => error.clone(),
        };
    }

    fallback()
}

fn flatten_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(flatten_message).collect();
            format!("[{}]", parts.join(", "))
        }
        // serde_json maps iterate in key order
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{{{key}: {}}}", flatten_message(value)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Result type alias for the GitLab REST client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
