//! Deploy tokens for projects and groups

use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::ResourceKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// A deploy token
///
/// `token` is only returned by the create call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployToken {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub revoked: bool,
    #[serde(default)]
    pub expired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDeployTokensOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDeployTokenOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// e.g. `read_repository`, `read_registry`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl CreateDeployTokenOptions {
    pub fn new<I, S>(name: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: Some(name.into()),
            scopes: scopes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.name.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_option("name"));
        }
        if self.scopes.is_empty() {
            return Err(Error::missing_option("scopes"));
        }
        Ok(())
    }
}

#[async_trait]
pub trait DeployTokensService {
    /// Every deploy token on the instance (administrators only)
    async fn list_all_deploy_tokens(
        &self,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)>;

    async fn list_project_deploy_tokens(
        &self,
        pid: &ResourceId,
        opts: &ListDeployTokensOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)>;

    async fn get_project_deploy_token(
        &self,
        pid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)>;

    async fn create_project_deploy_token(
        &self,
        pid: &ResourceId,
        opts: &CreateDeployTokenOptions,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)>;

    async fn delete_project_deploy_token(
        &self,
        pid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<Response>;

    async fn list_group_deploy_tokens(
        &self,
        gid: &ResourceId,
        opts: &ListDeployTokensOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)>;

    async fn get_group_deploy_token(
        &self,
        gid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)>;

    async fn create_group_deploy_token(
        &self,
        gid: &ResourceId,
        opts: &CreateDeployTokenOptions,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)>;

    async fn delete_group_deploy_token(
        &self,
        gid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<Response>;
}

/// Deploy tokens endpoints
#[derive(Debug, Clone)]
pub struct DeployTokens {
    client: Client,
}

impl DeployTokens {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        opts: &ListDeployTokensOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)> {
        self.client
            .dispatch::<Many<DeployToken>>(vec![
                with_path("{}/{}/deploy_tokens", &[kind.into(), id.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)> {
        self.client
            .dispatch::<One<DeployToken>>(vec![
                with_path(
                    "{}/{}/deploy_tokens/{}",
                    &[kind.into(), id.into(), token.into()],
                ),
                with_request_opts(req),
            ])
            .await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        opts: &CreateDeployTokenOptions,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)> {
        opts.validate()?;
        self.client
            .dispatch::<One<DeployToken>>(vec![
                with_method(Method::POST),
                with_path("{}/{}/deploy_tokens", &[kind.into(), id.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        id: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path(
                    "{}/{}/deploy_tokens/{}",
                    &[kind.into(), id.into(), token.into()],
                ),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}

#[async_trait]
impl DeployTokensService for DeployTokens {
    async fn list_all_deploy_tokens(
        &self,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)> {
        self.client
            .dispatch::<Many<DeployToken>>(vec![
                with_path("deploy_tokens", &[]),
                with_request_opts(req),
            ])
            .await
    }

    async fn list_project_deploy_tokens(
        &self,
        pid: &ResourceId,
        opts: &ListDeployTokensOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)> {
        self.list(ResourceKind::Project, pid, opts, req).await
    }

    async fn get_project_deploy_token(
        &self,
        pid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)> {
        self.get(ResourceKind::Project, pid, token, req).await
    }

    async fn create_project_deploy_token(
        &self,
        pid: &ResourceId,
        opts: &CreateDeployTokenOptions,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)> {
        self.create(ResourceKind::Project, pid, opts, req).await
    }

    async fn delete_project_deploy_token(
        &self,
        pid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.delete(ResourceKind::Project, pid, token, req).await
    }

    async fn list_group_deploy_tokens(
        &self,
        gid: &ResourceId,
        opts: &ListDeployTokensOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<DeployToken>, Response)> {
        self.list(ResourceKind::Group, gid, opts, req).await
    }

    async fn get_group_deploy_token(
        &self,
        gid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)> {
        self.get(ResourceKind::Group, gid, token, req).await
    }

    async fn create_group_deploy_token(
        &self,
        gid: &ResourceId,
        opts: &CreateDeployTokenOptions,
        req: &[RequestOption],
    ) -> Result<(DeployToken, Response)> {
        self.create(ResourceKind::Group, gid, opts, req).await
    }

    async fn delete_group_deploy_token(
        &self,
        gid: &ResourceId,
        token: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        self.delete(ResourceKind::Group, gid, token, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::client;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_json(with_secret: bool) -> serde_json::Value {
        let mut token = json!({
            "id": 1,
            "name": "MyToken",
            "username": "gitlab+deploy-token-1",
            "expires_at": "2020-02-14T00:00:00.000Z",
            "revoked": false,
            "expired": false,
            "scopes": ["read_repository", "read_registry"]
        });
        if with_secret {
            token["token"] = json!("jMRvtPNxrn3crTAGukpZ");
        }
        token
    }

    #[tokio::test]
    async fn test_list_all_deploy_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/deploy_tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([token_json(false)])))
            .mount(&server)
            .await;

        let (tokens, _) = client(&server)
            .deploy_tokens()
            .list_all_deploy_tokens(&[])
            .await
            .unwrap();
        assert_eq!(tokens[0].scopes, vec!["read_repository", "read_registry"]);
        assert_eq!(tokens[0].token, None);
    }

    #[tokio::test]
    async fn test_create_project_deploy_token_returns_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/5/deploy_tokens"))
            .and(body_json(json!({
                "name": "MyToken",
                "scopes": ["read_repository", "read_registry"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(token_json(true)))
            .mount(&server)
            .await;

        let opts = CreateDeployTokenOptions::new("MyToken", ["read_repository", "read_registry"]);
        let (token, _) = client(&server)
            .deploy_tokens()
            .create_project_deploy_token(&5u64.into(), &opts, &[])
            .await
            .unwrap();
        assert_eq!(token.token.as_deref(), Some("jMRvtPNxrn3crTAGukpZ"));
    }

    #[tokio::test]
    async fn test_create_deploy_token_requires_scopes() {
        let server = MockServer::start().await;
        let opts = CreateDeployTokenOptions {
            name: Some("MyToken".to_string()),
            ..CreateDeployTokenOptions::default()
        };
        let err = client(&server)
            .deploy_tokens()
            .create_group_deploy_token(&"grp".into(), &opts, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref field } if field == "scopes"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_deploy_token_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/groups/my-group%2Fsub/deploy_tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([token_json(false)])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v4/groups/my-group%2Fsub/deploy_tokens/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_json(false)))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/groups/my-group%2Fsub/deploy_tokens/1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let service = client(&server).deploy_tokens();
        let gid: ResourceId = "my-group/sub".into();

        let (tokens, _) = service
            .list_group_deploy_tokens(&gid, &ListDeployTokensOptions::default(), &[])
            .await
            .unwrap();
        assert_eq!(tokens.len(), 1);

        let (token, _) = service.get_group_deploy_token(&gid, 1, &[]).await.unwrap();
        assert_eq!(token.username, "gitlab+deploy-token-1");

        service.delete_group_deploy_token(&gid, 1, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_project_deploy_token_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/5/deploy_tokens/1"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({"message": "403 Forbidden"})),
            )
            .mount(&server)
            .await;

        let err = client(&server)
            .deploy_tokens()
            .get_project_deploy_token(&5u64.into(), 1, &[])
            .await
            .unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(err.status_code(), Some(403));
    }
}
