//! Project and group access requests

use crate::client::Client;
use crate::error::Result;
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::{AccessLevel, ResourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A pending request to join a project or group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListAccessRequestsOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ApproveAccessRequestOptions {
    /// Level granted on approval, Developer when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
}

#[async_trait]
pub trait AccessRequestsService {
    async fn list_project_access_requests(
        &self,
        pid: &ResourceId,
        opts: &ListAccessRequestsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AccessRequest>, Response)>;

    async fn list_group_access_requests(
        &self,
        gid: &ResourceId,
        opts: &ListAccessRequestsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AccessRequest>, Response)>;

    /// Request access for the authenticated user
    async fn request_project_access(
        &self,
        pid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)>;

    async fn request_group_access(
        &self,
        gid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)>;

    async fn approve_project_access_request(
        &self,
        pid: &ResourceId,
        user: u64,
        opts: &ApproveAccessRequestOptions,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)>;

    async fn approve_group_access_request(
        &self,
        gid: &ResourceId,
        user: u64,
        opts: &ApproveAccessRequestOptions,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)>;

    async fn deny_project_access_request(
        &self,
        pid: &ResourceId,
        user: u64,
        req: &[RequestOption],
    ) -> Result<Response>;

    async fn deny_group_access_request(
        &self,
        gid: &ResourceId,
        user: u64,
        req: &[RequestOption],
    ) -> Result<Response>;
}

/// Access requests endpoints
#[derive(Debug, Clone)]
pub struct AccessRequests {
    client: Client,
}

impl AccessRequests {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        opts: &ListAccessRequestsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AccessRequest>, Response)> {
        self.client
            .dispatch::<Many<AccessRequest>>(vec![
                with_path("{}/{}/access_requests", &[kind.into(), id.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn request(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)> {
        self.client
            .dispatch::<One<AccessRequest>>(vec![
                with_method(Method::POST),
                with_path("{}/{}/access_requests", &[kind.into(), id.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn approve(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        user: u64,
        opts: &ApproveAccessRequestOptions,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)> {
        self.client
            .dispatch::<One<AccessRequest>>(vec![
                with_method(Method::PUT),
                with_path(
                    "{}/{}/access_requests/{}/approve",
                    &[kind.into(), id.into(), user.into()],
                ),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn deny(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        user: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path(
                    "{}/{}/access_requests/{}",
                    &[kind.into(), id.into(), user.into()],
                ),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl AccessRequestsService for AccessRequests {
    async fn list_project_access_requests(
        &self,
        pid: &ResourceId,
        opts: &ListAccessRequestsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AccessRequest>, Response)> {
        self.list(ResourceKind::Project, pid, opts, req).await
    }

    async fn list_group_access_requests(
        &self,
        gid: &ResourceId,
        opts: &ListAccessRequestsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AccessRequest>, Response)> {
        self.list(ResourceKind::Group, gid, opts, req).await
    }

    async fn request_project_access(
        &self,
        pid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)> {
        self.request(ResourceKind::Project, pid, req).await
    }

    async fn request_group_access(
        &self,
        gid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)> {
        self.request(ResourceKind::Group, gid, req).await
    }

    async fn approve_project_access_request(
        &self,
        pid: &ResourceId,
        user: u64,
        opts: &ApproveAccessRequestOptions,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)> {
        self.approve(ResourceKind::Project, pid, user, opts, req)
            .await
    }

    async fn approve_group_access_request(
        &self,
        gid: &ResourceId,
        user: u64,
        opts: &ApproveAccessRequestOptions,
        req: &[RequestOption],
    ) -> Result<(AccessRequest, Response)> {
        self.approve(ResourceKind::Group, gid, user, opts, req).await
    }

    async fn deny_project_access_request(
        &self,
        pid: &ResourceId,
        user: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.deny(ResourceKind::Project, pid, user, req).await
    }

    async fn deny_group_access_request(
        &self,
        gid: &ResourceId,
        user: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.deny(ResourceKind::Group, gid, user, req).await
    }
}
