//! CI/CD jobs and their artifacts
//!
//! Artifact and trace downloads return the body verbatim as [`Bytes`].
//! Artifact paths inside an archive keep their slashes; every other path
//! argument is escaped.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::pagination::ListOptions;
use crate::request::{
    with_api_opts, with_method, with_path, with_request_opts, Many, NoContent, One, PathArg,
    Raw, RequestOption, ResourceId,
};
use crate::response::Response;
use crate::types::{BasicProject, BasicUser, Commit};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single job of a pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default, rename = "ref")]
    pub ref_: String,
    #[serde(default)]
    pub tag: bool,
    #[serde(default)]
    pub coverage: Option<f64>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub erased_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queued_duration: Option<f64>,
    #[serde(default)]
    pub artifacts_expire_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tag_list: Vec<String>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub pipeline: JobPipeline,
    #[serde(default)]
    pub artifacts: Vec<JobArtifact>,
    #[serde(default)]
    pub artifacts_file: Option<JobArtifactsFile>,
    #[serde(default)]
    pub runner: Option<JobRunner>,
    #[serde(default)]
    pub project: Option<BasicProject>,
    #[serde(default)]
    pub user: Option<BasicUser>,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} [{}] {}", self.id, self.name, self.stage, self.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPipeline {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub project_id: u64,
    #[serde(default, rename = "ref")]
    pub ref_: String,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArtifact {
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub file_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobArtifactsFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRunner {
    pub id: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(default)]
    pub name: Option<String>,
}

/// A trigger job that starts a downstream pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default, rename = "ref")]
    pub ref_: String,
    #[serde(default)]
    pub tag: bool,
    #[serde(default)]
    pub coverage: Option<f64>,
    #[serde(default)]
    pub allow_failure: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub erased_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub queued_duration: Option<f64>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub pipeline: JobPipeline,
    /// `None` until the downstream pipeline is created
    #[serde(default)]
    pub downstream_pipeline: Option<JobPipeline>,
    #[serde(default)]
    pub user: Option<BasicUser>,
}

impl fmt::Display for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} [{}] {}", self.id, self.name, self.stage, self.status)?;
        if let Some(downstream) = &self.downstream_pipeline {
            write!(f, " -> pipeline {}", downstream.id)?;
        }
        Ok(())
    }
}

/// Job state used to filter listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobScope {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
}

impl std::str::FromStr for JobScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| Error::encode(format!("unknown job scope: {s}")))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ListJobsOptions {
    #[serde(flatten)]
    pub list: ListOptions,
    /// Sent as `scope[]`; all states when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<JobScope>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_retried: Option<bool>,
}

/// Variable passed to a manual job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobVariable {
    pub key: String,
    pub value: String,
    /// `env_var` or `file`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<String>,
}

impl JobVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            variable_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayJobOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub job_variables_attributes: Vec<JobVariable>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadArtifactsFileOptions {
    /// Name of the job that produced the artifacts
    pub job: String,
}

impl DownloadArtifactsFileOptions {
    pub fn new(job: impl Into<String>) -> Self {
        Self { job: job.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GetJobTokensJobOptions {
    /// `CI_JOB_TOKEN` of the running job, sent as `job_token`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_token: Option<String>,
}

impl GetJobTokensJobOptions {
    pub fn new(job_token: impl Into<String>) -> Self {
        Self {
            job_token: Some(job_token.into()),
        }
    }
}

#[async_trait]
pub trait JobsService {
    async fn list_project_jobs(
        &self,
        pid: &ResourceId,
        opts: &ListJobsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Job>, Response)>;

    async fn list_pipeline_jobs(
        &self,
        pid: &ResourceId,
        pipeline: u64,
        opts: &ListJobsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Job>, Response)>;

    /// Trigger jobs of a pipeline
    async fn list_pipeline_bridges(
        &self,
        pid: &ResourceId,
        pipeline: u64,
        opts: &ListJobsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Bridge>, Response)>;

    /// The job a job token belongs to
    ///
    /// The token goes either in `opts` or as a per-call
    /// [`AuthConfig::JobToken`](crate::auth::AuthConfig::JobToken).
    async fn get_job_tokens_job(
        &self,
        opts: &GetJobTokensJobOptions,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    async fn get_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    /// Artifacts archive of a job
    async fn get_job_artifacts(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    /// Artifacts archive of the latest successful job for a ref
    async fn download_artifacts_file(
        &self,
        pid: &ResourceId,
        ref_name: &str,
        opts: &DownloadArtifactsFileOptions,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    /// One file from a job's artifacts archive
    async fn download_single_artifacts_file(
        &self,
        pid: &ResourceId,
        job: u64,
        artifact_path: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    /// One file from the artifacts of the latest successful job for a
    /// branch or tag
    async fn download_single_artifacts_file_by_ref(
        &self,
        pid: &ResourceId,
        ref_name: &str,
        artifact_path: &str,
        opts: &DownloadArtifactsFileOptions,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    async fn get_trace_file(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)>;

    async fn cancel_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    async fn retry_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    /// Remove the job's trace and artifacts
    async fn erase_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    /// Prevent artifacts from expiring
    async fn keep_artifacts(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    /// Trigger a manual job
    async fn play_job(
        &self,
        pid: &ResourceId,
        job: u64,
        opts: &PlayJobOptions,
        req: &[RequestOption],
    ) -> Result<(Job, Response)>;

    async fn delete_artifacts(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<Response>;

    /// Delete every deletable artifact of the project
    async fn delete_project_artifacts(
        &self,
        pid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<Response>;
}

/// Jobs endpoints
#[derive(Debug, Clone)]
pub struct Jobs {
    client: Client,
}

impl Jobs {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    async fn job_action(
        &self,
        pid: &ResourceId,
        job: u64,
        action: &'static str,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.client
            .dispatch::<One<Job>>(vec![
                with_method(Method::POST),
                with_path(
                    "projects/{}/jobs/{}/{}",
                    &[pid.into(), job.into(), PathArg::raw(action)],
                ),
                with_request_opts(req),
            ])
            .await
    }

    async fn raw(
        &self,
        template: &'static str,
        args: &[PathArg],
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.client
            .dispatch::<Raw>(vec![with_path(template, args), with_request_opts(req)])
            .await
    }
}

#[async_trait]
impl JobsService for Jobs {
    async fn list_project_jobs(
        &self,
        pid: &ResourceId,
        opts: &ListJobsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Job>, Response)> {
        self.client
            .dispatch::<Many<Job>>(vec![
                with_path("projects/{}/jobs", &[pid.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn list_pipeline_jobs(
        &self,
        pid: &ResourceId,
        pipeline: u64,
        opts: &ListJobsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Job>, Response)> {
        self.client
            .dispatch::<Many<Job>>(vec![
                with_path(
                    "projects/{}/pipelines/{}/jobs",
                    &[pid.into(), pipeline.into()],
                ),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn list_pipeline_bridges(
        &self,
        pid: &ResourceId,
        pipeline: u64,
        opts: &ListJobsOptions,
        req: &[RequestOption],
    ) -> Result<(Vec<Bridge>, Response)> {
        self.client
            .dispatch::<Many<Bridge>>(vec![
                with_path(
                    "projects/{}/pipelines/{}/bridges",
                    &[pid.into(), pipeline.into()],
                ),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_job_tokens_job(
        &self,
        opts: &GetJobTokensJobOptions,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.client
            .dispatch::<One<Job>>(vec![
                with_path("job", &[]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.client
            .dispatch::<One<Job>>(vec![
                with_path("projects/{}/jobs/{}", &[pid.into(), job.into()]),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_job_artifacts(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.raw(
            "projects/{}/jobs/{}/artifacts",
            &[pid.into(), job.into()],
            req,
        )
        .await
    }

    async fn download_artifacts_file(
        &self,
        pid: &ResourceId,
        ref_name: &str,
        opts: &DownloadArtifactsFileOptions,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        if opts.job.is_empty() {
            return Err(Error::missing_option("job"));
        }
        self.client
            .dispatch::<Raw>(vec![
                with_path(
                    "projects/{}/jobs/artifacts/{}/download",
                    &[pid.into(), PathArg::raw(ref_name)],
                ),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn download_single_artifacts_file(
        &self,
        pid: &ResourceId,
        job: u64,
        artifact_path: &str,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.raw(
            "projects/{}/jobs/{}/artifacts/{}",
            &[pid.into(), job.into(), PathArg::raw(artifact_path)],
            req,
        )
        .await
    }

    async fn download_single_artifacts_file_by_ref(
        &self,
        pid: &ResourceId,
        ref_name: &str,
        artifact_path: &str,
        opts: &DownloadArtifactsFileOptions,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        if opts.job.is_empty() {
            return Err(Error::missing_option("job"));
        }
        self.client
            .dispatch::<Raw>(vec![
                with_path(
                    "projects/{}/jobs/artifacts/{}/raw/{}",
                    &[pid.into(), ref_name.into(), PathArg::raw(artifact_path)],
                ),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn get_trace_file(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Bytes, Response)> {
        self.raw("projects/{}/jobs/{}/trace", &[pid.into(), job.into()], req)
            .await
    }

    async fn cancel_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.job_action(pid, job, "cancel", req).await
    }

    async fn retry_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.job_action(pid, job, "retry", req).await
    }

    async fn erase_job(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.job_action(pid, job, "erase", req).await
    }

    async fn keep_artifacts(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.job_action(pid, job, "artifacts/keep", req).await
    }

    async fn play_job(
        &self,
        pid: &ResourceId,
        job: u64,
        opts: &PlayJobOptions,
        req: &[RequestOption],
    ) -> Result<(Job, Response)> {
        self.client
            .dispatch::<One<Job>>(vec![
                with_method(Method::POST),
                with_path("projects/{}/jobs/{}/play", &[pid.into(), job.into()]),
                with_api_opts(opts),
                with_request_opts(req),
            ])
            .await
    }

    async fn delete_artifacts(
        &self,
        pid: &ResourceId,
        job: u64,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("projects/{}/jobs/{}/artifacts", &[pid.into(), job.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }

    async fn delete_project_artifacts(
        &self,
        pid: &ResourceId,
        req: &[RequestOption],
    ) -> Result<Response> {
        let (_, response) = self
            .client
            .dispatch::<NoContent>(vec![
                with_method(Method::DELETE),
                with_path("projects/{}/artifacts", &[pid.into()]),
                with_request_opts(req),
            ])
            .await?;
        Ok(response)
    }
}
