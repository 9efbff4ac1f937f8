//! Repository branches

use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One,
    RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::Commit;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repository branch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub can_push: bool,
    #[serde(default)]
    pub developers_can_push: bool,
    #[serde(default)]
    pub developers_can_merge: bool,
    #[serde(default)]
    pub web_url: String,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sha = self.commit.as_ref().map_or("", |c| c.short_id.as_str());
        write!(f, "{} {}", self.name, sha)?;
        if self.default {
            f.write_str(" (default)")?;
        }
        if self.protected {
            f.write_str(" [protected]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListBranchesOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Return branches containing this string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// RE2 regular expression the name must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateBranchOptions {
    /// Name of the new branch (required)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Branch name or commit SHA to start from (required)
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,
}

impl CreateBranchOptions {
    pub fn new(branch: impl Into<String>, ref_: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            ref_: Some(ref_.into()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.branch.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_option("branch"));
        }
        if self.ref_.as_deref().map_or(true, str::is_empty) {
            return Err(Error::missing_option("ref"));
        }
        Ok(())
    }
}

#[async_trait]
pub trait BranchesService {
    async fn list_branches(
        &self,
        pid: &ResourceId,
        opts: &ListBranchesOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Branch>, Response)>;

    async fn get_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<(Branch, Response)>;

    async fn create_branch(
        &self,
        pid: &ResourceId,
        opts: &CreateBranchOptions,
        req: &[RequestOption],
    ) -> Result<(Branch, Response)>;

    async fn delete_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<Response>;

    /// Delete every branch merged into the default branch
    ///
    /// Protected branches are kept. The server does the work asynchronously
    /// and answers 202.
    async fn delete_merged_branches(
        &self,
        pid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<Response>;
}

/// Branches endpoints
#[derive(Debug, Clone)]
pub struct Branches {
    client: Client,
}

impl Branches {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BranchesService for Branches {
    async fn list_branches(
        &self,
        pid: &ResourceId,
        opts: &ListBranchesOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Branch>, Response)> {
        self.client
            .dispatch::<Many<Branch>>(vec![
                with_path("projects/{}/repository/branches", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_branch(
        &self,
        pid: &ResourceId,
        branch: &str,
        req: &[RequestOption],
    ) -> Result<(Branch, Response)> {
        self.client
            .dispatch::<One<Branch>>(vec![
                with_path(
                    "projects/{}/repository/branches/{}",
                    &[pid.into(), branch.into()],
                ),
                with_request_opts(req),
            ])
            .await
    }

    async fn create_branch(
        &self,
        pid: &ResourceId,
        opts: &CreateBranchOptions,
        req: &[RequestOption],
    ) -> Result<(Branch, Response)> {
        opts.validate()?;
        self.client
            .dispatch::<One<Branch>>(vec![
                with_method(Method::POST),
                with_path("projects/{}/repository/branches", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete_branch(
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
                    "projects/{}/repository/branches/{}",
                    &[pid.into(), branch.into()],
                ),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }

    async fn delete_merged_branches(
        &self,
        pid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("projects/{}/repository/merged_branches", &[pid.into()]),
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
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn branch_json(name: &str) -> serde_json::Value {
        json!({
            "name": name,
            "merged": false,
            "protected": true,
            "default": name == "main",
            "developers_can_push": false,
            "developers_can_merge": false,
            "can_push": true,
            "web_url": format!("https://gitlab.example.com/my-group/my-project/-/tree/{name}"),
            "commit": {
                "id": "7b5c3cc8be40ee161ae89a06bba6229da1032a0c",
                "short_id": "7b5c3cc",
                "title": "add projects API",
                "author_name": "John Smith",
                "authored_date": "2012-06-27T05:51:39-07:00"
            }
        })
    }

    #[tokio::test]
    async fn test_list_branches_with_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/my-group%2Fmy-project/repository/branches"))
            .and(query_param("search", "ma"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([branch_json("main")])))
            .mount(&server)
            .await;

        let opts = ListBranchesOptions {
            search: Some("ma".to_string()),
            ..ListBranchesOptions::default()
        };
        let (branches, _) = client(&server)
            .branches()
            .list_branches(&"my-group/my-project".into(), &opts, &[])
            .await
            .unwrap();

        assert_eq!(branches.len(), 1);
        assert!(branches[0].default);
        assert_eq!(branches[0].to_string(), "main 7b5c3cc (default) [protected]");
    }

    #[tokio::test]
    async fn test_get_branch_escapes_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/projects/5/repository/branches/feature%2Flogin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(branch_json("feature/login")))
            .mount(&server)
            .await;

        let (branch, _) = client(&server)
            .branches()
            .get_branch(&5u64.into(), "feature/login", &[])
            .await
            .unwrap();
        assert_eq!(branch.name, "feature/login");
        assert_eq!(
            branch.commit.unwrap().id,
            "7b5c3cc8be40ee161ae89a06bba6229da1032a0c"
        );
    }

    #[tokio::test]
    async fn test_create_branch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v4/projects/5/repository/branches"))
            .and(body_json(json!({"branch": "newbranch", "ref": "main"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(branch_json("newbranch")))
            .mount(&server)
            .await;

        let (branch, _) = client(&server)
            .branches()
            .create_branch(&5u64.into(), &CreateBranchOptions::new("newbranch", "main"), &[])
            .await
            .unwrap();
        assert_eq!(branch.name, "newbranch");
    }

    #[tokio::test]
    async fn test_create_branch_requires_ref() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let opts = CreateBranchOptions {
            branch: Some("newbranch".to_string()),
            ref_: None,
        };
        let err = client(&server)
            .branches()
            .create_branch(&5u64.into(), &opts, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingOption { ref field } if field == "ref"));
    }

    #[tokio::test]
    async fn test_delete_branch() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/5/repository/branches/old"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server)
            .branches()
            .delete_branch(&5u64.into(), "old", &[])
            .await
            .unwrap();
        assert_eq!(response.status_code(), 204);
    }

    #[tokio::test]
    async fn test_delete_merged_branches() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v4/projects/5/repository/merged_branches"))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"message": "202 Accepted"})))
            .mount(&server)
            .await;

        let response = client(&server)
            .branches()
            .delete_merged_branches(&5u64.into(), &[])
            .await
            .unwrap();
        assert_eq!(response.status_code(), 202);
    }
}
