//! Protected branches

use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::AccessLevel;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Branch protection rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedBranch {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub push_access_levels: Vec<BranchAccessDescription>,
    #[serde(default)]
    pub merge_access_levels: Vec<BranchAccessDescription>,
    #[serde(default)]
    pub unprotect_access_levels: Vec<BranchAccessDescription>,
    #[serde(default)]
    pub allow_force_push: bool,
    #[serde(default)]
    pub code_owner_approval_required: bool,
}

/// Who may push, merge or unprotect
///
/// Exactly one of `access_level`, `user_id`, `group_id` or `deploy_key_id`
/// is meaningful for a given entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchAccessDescription {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
    #[serde(default)]
    pub access_level_description: String,
    #[serde(default)]
    pub deploy_key_id: Option<u64>,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub group_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListProtectedBranchesOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// One entry of `allowed_to_push`, `allowed_to_merge` or `allowed_to_unprotect`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BranchPermissionOptions {
    /// Existing entry to update or remove
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deploy_key_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    #[serde(rename = "_destroy", skip_serializing_if = "Option::is_none")]
    pub destroy: Option<bool>,
}

impl BranchPermissionOptions {
    pub fn user(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn level(level: AccessLevel) -> Self {
        Self {
            access_level: Some(level),
            ..Self::default()
        }
    }

    /// Remove an existing entry
    pub fn remove(id: u64) -> Self {
        Self {
            id: Some(id),
            destroy: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProtectBranchOptions {
    /// Branch name or wildcard (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_access_level: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_access_level: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprotect_access_level: Option<AccessLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_force_push: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_to_push: Vec<BranchPermissionOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_to_merge: Vec<BranchPermissionOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_to_unprotect: Vec<BranchPermissionOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_owner_approval_required: Option<bool>,
}

impl ProtectBranchOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProtectedBranchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_force_push: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_owner_approval_required: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_to_push: Vec<BranchPermissionOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_to_merge: Vec<BranchPermissionOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_to_unprotect: Vec<BranchPermissionOptions>,
}

#[async_trait]
pub trait ProtectedBranchesService {
    async fn list_protected_branches(
        &self,
        pid: &ResourceId,
        opts: &ListProtectedBranchesOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<ProtectedBranch>, Response)>;

    async fn get_protected_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<(ProtectedBranch, Response)>;

    /// Protect a branch or every branch matching a wildcard
    async fn protect_repository_branches(
        &self,
        pid: &ResourceId,
        opts: &ProtectBranchOptions,
        req: &[RequestOption],
    ) -> Result<(ProtectedBranch, Response)>;

    async fn unprotect_repository_branches(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<Response>;

    async fn update_protected_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        opts: &UpdateProtectedBranchOptions,
        req: &[RequestOption],
    ) -> Result<(ProtectedBranch, Response)>;
}

/// Protected branches endpoints
#[derive(Debug, Clone)]
pub struct ProtectedBranches {
    client: Client,
}

impl ProtectedBranches {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProtectedBranchesService for ProtectedBranches {
    async fn list_protected_branches(
        &self,
        pid: &ResourceId,
        opts: &ListProtectedBranchesOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<ProtectedBranch>, Response)> {
        self.client
            .dispatch::<Many<ProtectedBranch>>(vec![
                with_path("projects/{}/protected_branches", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_protected_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<(ProtectedBranch, Response)> {
        self.client
            .dispatch::<One<ProtectedBranch>>(vec![
                with_path(
                    "projects/{}/protected_branches/{}",
                    &[pid.into(), branch.into()],
                ),
                with_request_opts(req),
            ])
            .await
    }

    async fn protect_repository_branches(
        &self,
        pid: &ResourceId,
        opts: &ProtectBranchOptions,
        req: &[RequestOption],
    ) -> Result<(ProtectedBranch, Response)> {
        if opts.name.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_option("name"));
        }
        self.client
            .dispatch::<One<ProtectedBranch>>(vec![
                with_method(Method::POST),
                with_path("projects/{}/protected_branches", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn unprotect_repository_branches(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path(
                    "projects/{}/protected_branches/{}",
                    &[pid.into(), branch.into()],
                ),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }

    async fn update_protected_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        opts: &UpdateProtectedBranchOptions,
        req: &[RequestOption],
    ) -> Result<(ProtectedBranch, Response)> {
        self.client
            .dispatch::<One<ProtectedBranch>>(vec![
                with_method(Method::PATCH),
                with_path(
                    "projects/{}/protected_branches/{}",
                    &[pid.into(), branch.into()],
                ),
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
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn protected_json(name: &str) -> serde_json::Value {
        json!({
            "id": 1,
            "name": name,
            "push_access_levels": [
                {"id": 1, "access_level": 40, "access_level_description": "Maintainers"}
            ],
            "merge_access_levels": [
                {"id": 1, "access_level": null, "user_id": 5, "access_level_description": "John Smith"}
            ],
            "unprotect_access_levels": [],
            "allow_force_push": false,
            "code_owner_approval_required": false
        })
    }

    #[tokio::test]
    async fn test_list_protected_branches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/protected_branches"))
            .and(query_param("search", "release"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([protected_json("release-*")])),
            )
            .mount(&server)
            .await;

        let opts = ListProtectedBranchesOptions {
            search: Some("release".to_string()),
            ..ListProtectedBranchesOptions::default()
        };
        let (branches, _) = client(&server)
            .protected_branches()
            .list_protected_branches(&1u64.into(), &opts, &[])
            .await
            .unwrap();

        assert_eq!(
            branches[0].push_access_levels[0].access_level,
            Some(AccessLevel::Maintainer)
        );
        assert_eq!(branches[0].merge_access_levels[0].access_level, None);
        assert_eq!(branches[0].merge_access_levels[0].user_id, Some(5));
    }

    #[tokio::test]
    async fn test_get_protected_branch_escapes_wildcard_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/1/protected_branches/release%2F%2A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(protected_json("release/*")))
            .mount(&server)
            .await;

        let (branch, _) = client(&server)
            .protected_branches()
            .get_protected_branch(&1u64.into(), "release/*", &[])
            .await
            .unwrap();
        assert_eq!(branch.name, "release/*");
    }

    #[tokio::test]
    async fn test_protect_repository_branches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/1/protected_branches"))
            .and(body_json(json!({
                "name": "main",
                "push_access_level": 40,
                "allowed_to_merge": [{"user_id": 5}, {"access_level": 30}]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(protected_json("main")))
            .mount(&server)
            .await;

        let opts = ProtectBranchOptions {
            push_access_level: Some(AccessLevel::Maintainer),
            allowed_to_merge: vec![
                BranchPermissionOptions::user(5),
                BranchPermissionOptions::level(AccessLevel::Developer),
            ],
            ..ProtectBranchOptions::new("main")
        };
        let (branch, _) = client(&server)
            .protected_branches()
            .protect_repository_branches(&1u64.into(), &opts, &[])
            .await
            .unwrap();
        assert_eq!(branch.name, "main");
    }

    #[tokio::test]
    async fn test_protect_requires_name() {
        let server = MockServer::start().await;
        let err = client(&server)
            .protected_branches()
            .protect_repository_branches(&1u64.into(), &ProtectBranchOptions::default(), &[])
            .await
            .unwrap_err();
        assert!(err.is_construction());
    }

    #[tokio::test]
    async fn test_update_protected_branch_uses_patch() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/v4/projects/1/protected_branches/main"))
            .and(body_json(json!({
                "allow_force_push": true,
                "allowed_to_push": [{"id": 12, "_destroy": true}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(protected_json("main")))
            .mount(&server)
            .await;

        let opts = UpdateProtectedBranchOptions {
            allow_force_push: Some(true),
            allowed_to_push: vec![BranchPermissionOptions::remove(12)],
            ..UpdateProtectedBranchOptions::default()
        };
        client(&server)
            .protected_branches()
            .update_protected_branch(&1u64.into(), "main", &opts, &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_unprotect_repository_branches() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/1/protected_branches/main"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .protected_branches()
            .unprotect_repository_branches(&1u64.into(), "main", &[])
            .await
            .unwrap();
        assert_eq!(response.status_code(), 204);
    }
}
