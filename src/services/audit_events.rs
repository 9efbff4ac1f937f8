//! Instance, group and project audit events

use crate::client::Client;
use crate::error::Result;
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_path, with_request_opts, Many, One, PathArg, RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::{JsonValue, ResourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An audited action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: u64,
    #[serde(default)]
    pub author_id: u64,
    #[serde(default)]
    pub entity_id: u64,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub details: AuditEventDetails,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// What changed, as reported by the server
///
/// The set of keys depends on the event; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditEventDetails {
    #[serde(default)]
    pub with: Option<String>,
    #[serde(default)]
    pub add: Option<String>,
    #[serde(default, rename = "as")]
    pub as_: Option<String>,
    #[serde(default)]
    pub change: Option<String>,
    #[serde(default)]
    pub from: Option<JsonValue>,
    #[serde(default)]
    pub to: Option<JsonValue>,
    #[serde(default)]
    pub remove: Option<String>,
    #[serde(default)]
    pub custom_message: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub author_class: Option<String>,
    /// Integer or string depending on the target
    #[serde(default)]
    pub target_id: Option<JsonValue>,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_details: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub entity_path: Option<String>,
    #[serde(default)]
    pub failed_login: Option<String>,
    #[serde(default)]
    pub event_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListAuditEventsOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait AuditEventsService {
    /// Instance-wide events (administrators only)
    async fn list_instance_audit_events(
        &self,
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)>;

    async fn get_instance_audit_event(
        &self,
        event: u64,
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)>;

    async fn list_group_audit_events(
        &self,
        gid: &ResourceId,
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)>;

    async fn get_group_audit_event(
        &self,
        gid: &ResourceId,
        event: u64,
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)>;

    async fn list_project_audit_events(
        &self,
        pid: &ResourceId,
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)>;

    async fn get_project_audit_event(
        &self,
        pid: &ResourceId,
        event: u64,
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)>;
}

/// Audit events endpoints
#[derive(Debug, Clone)]
pub struct AuditEvents {
    client: Client,
}

impl AuditEvents {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list(
        &self,
        template: &'static str,
        args: &[PathArg],
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)> {
        self.client
            .dispatch::<Many<AuditEvent>>(vec![
                with_path(template, args),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get(
        &self,
        template: &'static str,
        args: &[PathArg],
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)> {
        self.client
            .dispatch::<One<AuditEvent>>(vec![with_path(template, args), with_request_opts(req)])
            .await
    }
}

#[async_trait]
impl AuditEventsService for AuditEvents {
    async fn list_instance_audit_events(
        &self,
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)> {
        self.list("audit_events", &[], opts, req).await
    }

    async fn get_instance_audit_event(
        &self,
        event: u64,
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)> {
        self.get("audit_events/{}", &[event.into()], req).await
    }

    async fn list_group_audit_events(
        &self,
        gid: &ResourceId,
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)> {
        self.list(
            "{}/{}/audit_events",
            &[ResourceKind::Group.into(), gid.into()],
            opts,
            req,
        )
        .await
    }

    async fn get_group_audit_event(
        &self,
        gid: &ResourceId,
        event: u64,
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)> {
        self.get(
            "{}/{}/audit_events/{}",
            &[ResourceKind::Group.into(), gid.into(), event.into()],
            req,
        )
        .await
    }

    async fn list_project_audit_events(
        &self,
        pid: &ResourceId,
        opts: &ListAuditEventsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<AuditEvent>, Response)> {
        self.list(
            "{}/{}/audit_events",
            &[ResourceKind::Project.into(), pid.into()],
            opts,
            req,
        )
        .await
    }

    async fn get_project_audit_event(
        &self,
        pid: &ResourceId,
        event: u64,
        req: &[RequestOption],
    ) -> Result<(AuditEvent, Response)> {
        self.get(
            "{}/{}/audit_events/{}",
            &[ResourceKind::Project.into(), pid.into(), event.into()],
            req,
        )
        .await
    }
}
