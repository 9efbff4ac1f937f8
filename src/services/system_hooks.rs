//! Instance-wide system hooks (administrators only)

use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption,
};
use crate::response::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A system hook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub push_events: bool,
    #[serde(default)]
    pub tag_push_events: bool,
    #[serde(default)]
    pub merge_requests_events: bool,
    #[serde(default)]
    pub repository_update_events: bool,
    #[serde(default)]
    pub enable_ssl_verification: bool,
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.url)
    }
}

/// Sample payload echoed back by a hook test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookEvent {
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub project_id: u64,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub owner_email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListHooksOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddHookOptions {
    /// Receiver URL (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Secret sent in the `X-Gitlab-Token` header of each delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_update_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ssl_verification: Option<bool>,
}

impl AddHookOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait SystemHooksService {
    async fn list_hooks(
        &self,
        opts: &ListHooksOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Hook>, Response)>;

    async fn get_hook(&self, hook: u64, req: &[RequestOption]) -> Result<(Hook, Response)>;

    async fn add_hook(
        &self,
        opts: &AddHookOptions,
        req: &[RequestOption],
    ) -> Result<(Hook, Response)>;

    /// Fire a sample event at the hook
    async fn test_hook(&self, hook: u64, req: &[RequestOption]) -> Result<(HookEvent, Response)>;

    async fn delete_hook(&self, hook: u64, req: &[RequestOption]) -> Result<Response>;
}

/// System hooks endpoints
#[derive(Debug, Clone)]
pub struct SystemHooks {
    client: Client,
}

impl SystemHooks {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SystemHooksService for SystemHooks {
    async fn list_hooks(
        &self,
        opts: &ListHooksOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Hook>, Response)> {
        self.client
            .dispatch::<Many<Hook>>(vec![
                with_path("hooks", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_hook(&self, hook: u64, req: &[RequestOption]) -> Result<(Hook, Response)> {
        self.client
            .dispatch::<One<Hook>>(vec![
                with_path("hooks/{}", &[hook.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn add_hook(
        &self,
        opts: &AddHookOptions,
        req: &[RequestOption],
    ) -> Result<(Hook, Response)> {
        if opts.url.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_option("url"));
        }
        self.client
            .dispatch::<One<Hook>>(vec![
                with_method(Method::POST),
                with_path("hooks", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn test_hook(&self, hook: u64, req: &[RequestOption]) -> Result<(HookEvent, Response)> {
        self.client
            .dispatch::<One<HookEvent>>(vec![
                with_method(Method::POST),
                with_path("hooks/{}", &[hook.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete_hook(&self, hook: u64, req: &[RequestOption]) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("hooks/{}", &[hook.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}
