//! Per-call options and request preparation
//!
//! A call is described by a list of [`DoOption`]s applied in order to a
//! [`DoConfig`]. The result is turned into a [`PreparedRequest`], then the
//! caller's [`RequestOption`]s are applied last so they can override
//! anything the service method set.

use super::id::{expand_path, PathArg, ResourceId};
use super::query::{to_query_string, value_to_pairs};
use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::response::Response;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Header used to impersonate another user
pub const SUDO_HEADER: &str = "SUDO";

/// Everything a call needs before a request can be built
#[derive(Debug, Clone)]
pub struct DoConfig {
    /// HTTP method, GET unless set
    pub method: Method,
    /// Expanded path relative to the API root
    pub path: Option<String>,
    /// Serialised options struct, sent as body or query
    pub api_opts: Option<Value>,
    /// Caller overrides, applied last
    pub request_opts: Vec<RequestOption>,
    /// File to send as multipart form
    pub upload: Option<Upload>,
}

impl Default for DoConfig {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: None,
            api_opts: None,
            request_opts: Vec::new(),
            upload: None,
        }
    }
}

/// A single step in describing a call
pub struct DoOption<'a>(Box<dyn FnOnce(&mut DoConfig) -> Result<()> + Send + 'a>);

impl<'a> DoOption<'a> {
    /// Wrap a closure as an option
    pub fn new(f: impl FnOnce(&mut DoConfig) -> Result<()> + Send + 'a) -> Self {
        Self(Box::new(f))
    }

    /// Apply this option to a config
    pub fn apply(self, config: &mut DoConfig) -> Result<()> {
        (self.0)(config)
    }
}

impl fmt::Debug for DoOption<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DoOption")
    }
}

/// Set the HTTP method
pub fn with_method<'a>(method: Method) -> DoOption<'a> {
    DoOption::new(move |config| {
        config.method = method;
        Ok(())
    })
}

/// Set the path from a `{}` template and its arguments
pub fn with_path<'a>(template: &'a str, args: &[PathArg]) -> DoOption<'a> {
    let args = args.to_vec();
    DoOption::new(move |config| {
        config.path = Some(expand_path(template, &args)?);
        Ok(())
    })
}

/// Attach an options struct
///
/// Serialisation happens when the option is applied, so an unencodable
/// value fails the call before any I/O.
pub fn with_api_opts<'a, T>(opts: &'a T) -> DoOption<'a>
where
    T: Serialize + Sync + ?Sized,
{
    DoOption::new(move |config| {
        let value = serde_json::to_value(opts).map_err(|e| Error::encode(e.to_string()))?;
        config.api_opts = Some(value);
        Ok(())
    })
}

/// Attach caller request overrides
pub fn with_request_opts<'a>(opts: &[RequestOption]) -> DoOption<'a> {
    let opts = opts.to_vec();
    DoOption::new(move |config| {
        config.request_opts.extend(opts);
        Ok(())
    })
}

/// Send a file as multipart form data
pub fn with_upload<'a>(upload: Upload) -> DoOption<'a> {
    DoOption::new(move |config| {
        config.upload = Some(upload);
        Ok(())
    })
}

/// Caller-supplied override applied after the request is built
#[derive(Debug, Clone)]
pub enum RequestOption {
    /// Set a header, replacing any existing value
    Header {
        /// Header name
        name: String,
        /// Header value
        value: String,
    },
    /// Run the call as another user (admin only)
    Sudo(ResourceId),
    /// Request a specific page with offset pagination
    Page(u64),
    /// Continue keyset pagination from a `Link: rel="next"` URL
    Keyset(String),
    /// Use different credentials for this call
    Token(AuthConfig),
    /// Per-call timeout
    Timeout(Duration),
}

impl RequestOption {
    /// Set a header
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Sudo as a user ID or username
    pub fn sudo(user: impl Into<ResourceId>) -> Self {
        Self::Sudo(user.into())
    }

    /// The option that fetches the page after `response`, if there is one
    ///
    /// Keyset links win over page numbers.
    pub fn next_for(response: &Response) -> Option<Self> {
        if let Some(link) = &response.pagination.next_link {
            return Some(Self::Keyset(link.clone()));
        }
        response.pagination.next_page.map(Self::Page)
    }

    fn apply(&self, req: &mut PreparedRequest) -> Result<()> {
        match self {
            Self::Header { name, value } => req.set_header(name, value),
            Self::Sudo(user) => req.set_header(SUDO_HEADER, &user.to_string()),
            Self::Page(page) => {
                req.set_query("page", page.to_string());
                Ok(())
            }
            Self::Keyset(link) => {
                let next = Url::parse(link)?;
                let pairs: Vec<(String, String)> = next
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect();
                for (key, _) in &pairs {
                    req.query.retain(|(k, _)| k != key);
                }
                req.query.extend(pairs);
                Ok(())
            }
            Self::Token(auth) => {
                req.auth = Some(auth.clone());
                Ok(())
            }
            Self::Timeout(timeout) => {
                req.timeout = Some(*timeout);
                Ok(())
            }
        }
    }
}

/// File content sent as `multipart/form-data`
#[derive(Debug, Clone)]
pub struct Upload {
    /// Form field holding the file
    pub field: String,
    /// File name reported to the server
    pub file_name: String,
    /// File content
    pub content: Bytes,
    /// Content type of the file part
    pub mime: Option<String>,
}

impl Upload {
    /// Upload `content` as field `file`
    pub fn file(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            content: content.into(),
            mime: None,
        }
    }

    /// Set the content type
    #[must_use]
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Body of a prepared request
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(Value),
    /// Multipart form with one file and extra text fields
    Multipart {
        /// The file part
        upload: Upload,
        /// Additional text fields
        fields: Vec<(String, String)>,
    },
}

impl RequestBody {
    /// Build a fresh multipart form
    ///
    /// A form is consumed on send, so retries build a new one each attempt.
    pub fn to_form(upload: &Upload, fields: &[(String, String)]) -> Result<Form> {
        let mut part = Part::bytes(upload.content.to_vec()).file_name(upload.file_name.clone());
        if let Some(mime) = &upload.mime {
            part = part.mime_str(mime)?;
        }
        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key.clone(), value.clone());
        }
        Ok(form.part(upload.field.clone(), part))
    }
}

/// A fully described request, ready for the transport
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL without query
    pub url: Url,
    /// Query pairs in order
    pub query: Vec<(String, String)>,
    /// Extra headers
    pub headers: HeaderMap,
    /// Body
    pub body: RequestBody,
    /// Per-call timeout
    pub timeout: Option<Duration>,
    /// Per-call credentials
    pub auth: Option<AuthConfig>,
}

impl PreparedRequest {
    /// Create a bare request
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            timeout: None,
            auth: None,
        }
    }

    /// Build a request from a call description
    ///
    /// Options go into a JSON body for POST, PUT and PATCH and into the
    /// query string otherwise. With an upload they become text form fields.
    pub fn build(base_url: &Url, config: DoConfig) -> Result<Self> {
        let path = config.path.ok_or_else(|| Error::missing_option("path"))?;
        // base_url always ends with a slash
        let url = Url::parse(&format!("{base_url}{}", path.trim_start_matches('/')))?;
        let mut req = Self::new(config.method, url);

        match (config.upload, config.api_opts) {
            (Some(upload), opts) => {
                let fields = match opts {
                    Some(value) => value_to_pairs(&value)?,
                    None => Vec::new(),
                };
                req.body = RequestBody::Multipart { upload, fields };
            }
            (None, Some(value)) if sends_body(&req.method) => {
                let value = prune_nulls(value);
                if !is_empty_opts(&value) {
                    req.body = RequestBody::Json(value);
                }
            }
            (None, Some(value)) => {
                req.query = value_to_pairs(&value)?;
            }
            (None, None) => {}
        }

        for opt in &config.request_opts {
            opt.apply(&mut req)?;
        }
        Ok(req)
    }

    /// Replace every value of `key` with `value`
    pub fn set_query(&mut self, key: &str, value: impl Into<String>) {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.into()));
    }

    /// Set a header, replacing any existing value
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<()> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        self.headers.insert(header_name, header_value);
        Ok(())
    }

    /// Encoded query string, empty when there are no pairs
    pub fn query_string(&self) -> String {
        to_query_string(&self.query)
    }

    /// URL including the query string
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if self.query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&self.query_string()));
        }
        url
    }
}

fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Drop unset fields so they never reach the body as `null`
fn prune_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, prune_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

fn is_empty_opts(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
