//! Deploy keys
//!
//! SSH keys granting read or read-write repository access. Instance keys
//! are managed by administrators and can be enabled per project.

use crate::client::Client;
use crate::error::Result;
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::BasicProject;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project a deploy key is enabled on
pub type DeployKeyProject = BasicProject;

/// A deploy key as seen by an administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDeployKey {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub fingerprint_sha256: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub projects_with_write_access: Vec<DeployKeyProject>,
    #[serde(default)]
    pub projects_with_readonly_access: Vec<DeployKeyProject>,
}

/// A deploy key enabled on a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDeployKey {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub fingerprint_sha256: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub can_push: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Display for ProjectDeployKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = if self.can_push { "read-write" } else { "read-only" };
        write!(f, "{} {} ({access})", self.id, self.title)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListInstanceDeployKeysOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Only keys that are public (not tied to a single project)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddInstanceDeployKeyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListProjectDeployKeysOptions {
    #[serde(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AddDeployKeyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_push: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDeployKeyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_push: Option<bool>,
}

#[async_trait]
pub trait DeployKeysService {
    /// Every deploy key on the instance (administrators only)
    async fn list_all_deploy_keys(
        &self,
        opts: &ListInstanceDeployKeysOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<InstanceDeployKey>, Response)>;

    async fn add_instance_deploy_key(
        &self,
        opts: &AddInstanceDeployKeyOptions,
        req: &[RequestOption],
    ) -> Result<(InstanceDeployKey, Response)>;

    async fn list_project_deploy_keys(
        &self,
        pid: &ResourceId,
        opts: &ListProjectDeployKeysOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<ProjectDeployKey>, Response)>;

    /// Keys on projects the user can see, by user ID or username
    async fn list_user_project_deploy_keys(
        &self,
        uid: &ResourceId,
        opts: &ListProjectDeployKeysOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<ProjectDeployKey>, Response)>;

    async fn get_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)>;

    async fn add_deploy_key(
        &self,
        pid: &ResourceId,
        opts: &AddDeployKeyOptions,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)>;

    async fn delete_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        req: &[RequestOption],
    ) -> Result<Response>;

    /// Enable an existing key on another project
    async fn enable_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)>;

    async fn update_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        opts: &UpdateDeployKeyOptions,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)>;
}

/// Deploy keys endpoints
#[derive(Debug, Clone)]
pub struct DeployKeys {
    client: Client,
}

impl DeployKeys {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeployKeysService for DeployKeys {
    async fn list_all_deploy_keys(
        &self,
        opts: &ListInstanceDeployKeysOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<InstanceDeployKey>, Response)> {
        self.client
            .dispatch::<Many<InstanceDeployKey>>(vec![
                with_path("deploy_keys", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn add_instance_deploy_key(
        &self,
        opts: &AddInstanceDeployKeyOptions,
        req: &[RequestOption],
    ) -> Result<(InstanceDeployKey, Response)> {
        self.client
            .dispatch::<One<InstanceDeployKey>>(vec![
                with_method(Method::POST),
                with_path("deploy_keys", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn list_project_deploy_keys(
        &self,
        pid: &ResourceId,
        opts: &ListProjectDeployKeysOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<ProjectDeployKey>, Response)> {
        self.client
            .dispatch::<Many<ProjectDeployKey>>(vec![
                with_path("projects/{}/deploy_keys", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn list_user_project_deploy_keys(
        &self,
        uid: &ResourceId,
        opts: &ListProjectDeployKeysOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<ProjectDeployKey>, Response)> {
        self.client
            .dispatch::<Many<ProjectDeployKey>>(vec![
                with_path("users/{}/project_deploy_keys", &[uid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)> {
        self.client
            .dispatch::<One<ProjectDeployKey>>(vec![
                with_path("projects/{}/deploy_keys/{}", &[pid.into(), key.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn add_deploy_key(
        &self,
        pid: &ResourceId,
        opts: &AddDeployKeyOptions,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)> {
        self.client
            .dispatch::<One<ProjectDeployKey>>(vec![
                with_method(Method::POST),
                with_path("projects/{}/deploy_keys", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("projects/{}/deploy_keys/{}", &[pid.into(), key.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }

    async fn enable_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)> {
        self.client
            .dispatch::<One<ProjectDeployKey>>(vec![
                with_method(Method::POST),
                with_path(
                    "projects/{}/deploy_keys/{}/enable",
                    &[pid.into(), key.into()],
                ),
                with_request_opts(req),
            ])
            .await
    }

    async fn update_deploy_key(
        &self,
        pid: &ResourceId,
        key: u64,
        opts: &UpdateDeployKeyOptions,
        req: &[RequestOption],
    ) -> Result<(ProjectDeployKey, Response)> {
        self.client
            .dispatch::<One<ProjectDeployKey>>(vec![
                with_method(Method::PUT),
                with_path("projects/{}/deploy_keys/{}", &[pid.into(), key.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::client;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn key_json(id: u64, can_push: bool) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Public key",
            "key": "ssh-rsa AAAAB3NzaC1yc2EAAAABJQAAAIEAiPWx6WM4lhHNedGfBpPJNPpZ7yKu+dnn1SJejgt4596k6YjzGGphH2TUxwKzxcKDKKezwkpfnxPkSMkuEspGRt/aZZ9w==",
            "fingerprint": "4a:9d:64:15:ed:3a:e6:07:6e:89:36:b3:3b:03:05:d9",
            "created_at": "2013-10-02T10:12:29Z",
            "can_push": can_push,
            "expires_at": null
        })
    }

    #[tokio::test]
    async fn test_list_all_deploy_keys_public_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/deploy_keys"))
            .and(query_param("public", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 1,
                "title": "Public key",
                "key": "ssh-rsa AAAA",
                "fingerprint_sha256": "SHA256:Jrs3LD1Ji30xNLtTVf9NDCj7kkBgPBb2pjvTZ3HfIgU",
                "projects_with_write_access": [
                    {"id": 73, "name": "project2", "path_with_namespace": "sidney_jones/project2"}
                ],
                "projects_with_readonly_access": []
            }])))
            .mount(&server)
            .await;

        let opts = ListInstanceDeployKeysOptions {
            public: Some(true),
            ..ListInstanceDeployKeysOptions::default()
        };
        let (keys, _) = client(&server)
            .deploy_keys()
            .list_all_deploy_keys(&opts, &[])
            .await
            .unwrap();
        assert_eq!(
            keys[0].projects_with_write_access[0].path_with_namespace,
            "sidney_jones/project2"
        );
    }

    #[tokio::test]
    async fn test_add_instance_deploy_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/deploy_keys"))
            .and(body_json(json!({"key": "ssh-rsa AAAA", "title": "My deploy key"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 5, "title": "My deploy key", "key": "ssh-rsa AAAA"
            })))
            .mount(&server)
            .await;

        let opts = AddInstanceDeployKeyOptions {
            key: Some("ssh-rsa AAAA".to_string()),
            title: Some("My deploy key".to_string()),
            expires_at: None,
        };
        let (key, _) = client(&server)
            .deploy_keys()
            .add_instance_deploy_key(&opts, &[])
            .await
            .unwrap();
        assert_eq!(key.id, 5);
    }

    #[tokio::test]
    async fn test_list_project_deploy_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/5/deploy_keys"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([key_json(1, false), key_json(3, true)])),
            )
            .mount(&server)
            .await;

        let (keys, _) = client(&server)
            .deploy_keys()
            .list_project_deploy_keys(&5u64.into(), &ListProjectDeployKeysOptions::default(), &[])
            .await
            .unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].to_string(), "3 Public key (read-write)");
    }

    #[tokio::test]
    async fn test_list_user_project_deploy_keys_by_username() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/users/john_smith/project_deploy_keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([key_json(1, false)])))
            .mount(&server)
            .await;

        let (keys, _) = client(&server)
            .deploy_keys()
            .list_user_project_deploy_keys(
                &"john_smith".into(),
                &ListProjectDeployKeysOptions::default(),
                &[],
            )
            .await
            .unwrap();
        assert_eq!(keys.len(), 1);
    }

    #[tokio::test]
    async fn test_get_deploy_key_with_sudo() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/5/deploy_keys/11"))
            .and(header("Sudo", "admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_json(11, false)))
            .mount(&server)
            .await;

        let (key, _) = client(&server)
            .deploy_keys()
            .get_deploy_key(&5u64.into(), 11, &[RequestOption::sudo("admin")])
            .await
            .unwrap();
        assert!(!key.can_push);
    }

    #[tokio::test]
    async fn test_add_enable_update_delete_deploy_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/5/deploy_keys"))
            .and(body_json(json!({"key": "ssh-rsa AAAA", "title": "CI", "can_push": true})))
            .respond_with(ResponseTemplate::new(201).set_body_json(key_json(12, true)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/6/deploy_keys/12/enable"))
            .respond_with(ResponseTemplate::new(201).set_body_json(key_json(12, false)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/v4/projects/5/deploy_keys/12"))
            .and(body_json(json!({"title": "renamed"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(key_json(12, true)))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/5/deploy_keys/12"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let service = client(&server).deploy_keys();
        let pid: ResourceId = 5u64.into();

        let add = AddDeployKeyOptions {
            key: Some("ssh-rsa AAAA".to_string()),
            title: Some("CI".to_string()),
            can_push: Some(true),
            expires_at: None,
        };
        let (added, _) = service.add_deploy_key(&pid, &add, &[]).await.unwrap();
        assert!(added.can_push);

        let (enabled, _) = service
            .enable_deploy_key(&6u64.into(), added.id, &[])
            .await
            .unwrap();
        assert_eq!(enabled.id, 12);

        let update = UpdateDeployKeyOptions {
            title: Some("renamed".to_string()),
            can_push: None,
        };
        service
            .update_deploy_key(&pid, added.id, &update, &[])
            .await
            .unwrap();

        let response = service.delete_deploy_key(&pid, added.id, &[]).await.unwrap();
        assert_eq!(response.status_code(), 204);
    }
}
