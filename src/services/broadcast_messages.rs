//! Instance broadcast messages

use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption,
};
use crate::response::Response;
use crate::types::AccessLevel;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A banner or notification shown to users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub id: u64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub target_access_levels: Vec<AccessLevel>,
    #[serde(default)]
    pub target_path: Option<String>,
    /// `banner` or `notification`
    #[serde(default)]
    pub broadcast_type: Option<String>,
    #[serde(default)]
    pub dismissable: bool,
    #[serde(default)]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListBroadcastMessagesOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateBroadcastMessageOptions {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_access_levels: Vec<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl CreateBroadcastMessageOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateBroadcastMessageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_access_levels: Option<Vec<AccessLevel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[async_trait]
pub trait BroadcastMessagesService {
    async fn list_broadcast_messages(
        &self,
        opts: &ListBroadcastMessagesOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<BroadcastMessage>, Response)>;

    async fn get_broadcast_message(
        &self,
        broadcast: u64,
        req: &[RequestOption],
    ) -> Result<(BroadcastMessage, Response)>;

    async fn create_broadcast_message(
        &self,
        opts: &CreateBroadcastMessageOptions,
        req: &[RequestOption],
    ) -> Result<(BroadcastMessage, Response)>;

    async fn update_broadcast_message(
        &self,
        broadcast: u64,
        opts: &UpdateBroadcastMessageOptions,
        req: &[RequestOption],
    ) -> Result<(BroadcastMessage, Response)>;

    async fn delete_broadcast_message(
        &self,
        broadcast: u64,
        req: &[RequestOption],
    ) -> Result<Response>;
}

/// Broadcast messages endpoints
#[derive(Debug, Clone)]
pub struct BroadcastMessages {
    client: Client,
}

impl BroadcastMessages {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BroadcastMessagesService for BroadcastMessages {
    async fn list_broadcast_messages(
        &self,
        opts: &ListBroadcastMessagesOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<BroadcastMessage>, Response)> {
        self.client
            .dispatch::<Many<BroadcastMessage>>(vec![
                with_path("broadcast_messages", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_broadcast_message(
        &self,
        broadcast: u64,
        req: &[RequestOption],
    ) -> Result<(BroadcastMessage, Response)> {
        self.client
            .dispatch::<One<BroadcastMessage>>(vec![
                with_path("broadcast_messages/{}", &[broadcast.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn create_broadcast_message(
        &self,
        opts: &CreateBroadcastMessageOptions,
        req: &[RequestOption],
    ) -> Result<(BroadcastMessage, Response)> {
        if opts.message.trim().is_empty() {
            return Err(Error::missing_option("message"));
        }
        self.client
            .dispatch::<One<BroadcastMessage>>(vec![
                with_method(Method::POST),
                with_path("broadcast_messages", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn update_broadcast_message(
        &self,
        broadcast: u64,
        opts: &UpdateBroadcastMessageOptions,
        req: &[RequestOption],
    ) -> Result<(BroadcastMessage, Response)> {
        self.client
            .dispatch::<One<BroadcastMessage>>(vec![
                with_method(Method::PUT),
                with_path("broadcast_messages/{}", &[broadcast.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete_broadcast_message(
        &self,
        broadcast: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("broadcast_messages/{}", &[broadcast.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::client;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message_json() -> serde_json::Value {
        json!({
            "message": "Some Message",
            "starts_at": "2017-06-26T06:00:00.000Z",
            "ends_at": "2017-06-27T12:59:00.000Z",
            "font": "#FFFFFF",
            "id": 1,
            "active": false,
            "target_access_levels": [10, 30],
            "target_path": "*/welcome",
            "broadcast_type": "banner",
            "dismissable": false,
            "theme": "indigo"
        })
    }

    #[tokio::test]
    async fn test_list_broadcast_messages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/broadcast_messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([message_json()])))
            .mount(&server)
            .await;

        let (messages, _) = client(&server)
            .broadcast_messages()
            .list_broadcast_messages(&ListBroadcastMessagesOptions::default(), &[])
            .await
            .unwrap();
        assert_eq!(
            messages[0].target_access_levels,
            vec![AccessLevel::Guest, AccessLevel::Developer]
        );
    }

    #[tokio::test]
    async fn test_create_broadcast_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/broadcast_messages"))
            .and(body_json(json!({
                "message": "Some Message",
                "target_access_levels": [10, 30],
                "theme": "indigo"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(message_json()))
            .mount(&server)
            .await;

        let opts = CreateBroadcastMessageOptions {
            target_access_levels: vec![AccessLevel::Guest, AccessLevel::Developer],
            theme: Some("indigo".to_string()),
            ..CreateBroadcastMessageOptions::new("Some Message")
        };
        let (message, _) = client(&server)
            .broadcast_messages()
            .create_broadcast_message(&opts, &[])
            .await
            .unwrap();
        assert_eq!(message.id, 1);
    }

    #[tokio::test]
    async fn test_create_broadcast_message_requires_message() {
        let server = MockServer::start().await;
        let err = client(&server)
            .broadcast_messages()
            .create_broadcast_message(&CreateBroadcastMessageOptions::default(), &[])
            .await
            .unwrap_err();
        assert!(err.is_construction());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_broadcast_message() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/broadcast_messages/1"))
            .and(body_json(json!({"message": "Updated"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .mount(&server)
            .await;

        let opts = UpdateBroadcastMessageOptions {
            message: Some("Updated".to_string()),
            ..UpdateBroadcastMessageOptions::default()
        };
        client(&server)
            .broadcast_messages()
            .update_broadcast_message(1, &opts, &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_get_and_delete_broadcast_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/broadcast_messages/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_json()))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/broadcast_messages/1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let service = client(&server).broadcast_messages();
        let (message, _) = service.get_broadcast_message(1, &[]).await.unwrap();
        assert_eq!(message.broadcast_type.as_deref(), Some("banner"));

        let response = service.delete_broadcast_message(1, &[]).await.unwrap();
        assert_eq!(response.status_code(), 204);
    }
}
