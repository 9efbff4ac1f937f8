//! To-do items of the authenticated user

use crate::client::Client;
use crate::error::Result;
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, RequestOption,
};
use crate::response::Response;
use crate::types::{BasicProject, BasicUser, JsonValue};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    #[serde(default)]
    pub project: Option<BasicProject>,
    #[serde(default)]
    pub author: Option<BasicUser>,
    /// e.g. `assigned`, `mentioned`, `review_requested`
    #[serde(default)]
    pub action_name: String,
    /// e.g. `Issue`, `MergeRequest`, `Commit`
    #[serde(default)]
    pub target_type: String,
    #[serde(default)]
    pub target: Option<TodoTarget>,
    #[serde(default)]
    pub target_url: String,
    #[serde(default)]
    pub body: String,
    /// `pending` or `done`
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.target.as_ref().map_or("", |t| t.title.as_str());
        write!(f, "{} [{}] {} {}", self.id, self.action_name, self.target_type, title)
    }
}

/// The issue, merge request or commit a to-do points at
///
/// Only the fields common to every target type are modelled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoTarget {
    /// Integer for issues and merge requests, SHA string for commits
    #[serde(default)]
    pub id: JsonValue,
    #[serde(default)]
    pub iid: Option<u64>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub author: Option<BasicUser>,
    #[serde(default)]
    pub assignees: Vec<BasicUser>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListTodosOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

#[async_trait]
pub trait TodosService {
    async fn list_todos(
        &self,
        opts: &ListTodosOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Todo>, Response)>;

    async fn mark_todo_as_done(&self, todo: u64, req: &[RequestOption]) -> Result<Response>;

    async fn mark_all_todos_as_done(&self, req: &[RequestOption]) -> Result<Response>;
}

/// To-do endpoints
#[derive(Debug, Clone)]
pub struct Todos {
    client: Client,
}

impl Todos {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TodosService for Todos {
    async fn list_todos(
        &self,
        opts: &ListTodosOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Todo>, Response)> {
        self.client
            .dispatch::<Many<Todo>>(vec![
                with_path("todos", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn mark_todo_as_done(&self, todo: u64, req: &[RequestOption]) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::POST),
                with_path("todos/{}/mark_as_done", &[todo.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }

    async fn mark_all_todos_as_done(&self, req: &[RequestOption]) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::POST),
                with_path("todos/mark_as_done", &[]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}
