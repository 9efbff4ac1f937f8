//! CLI runner - executes commands

use crate::auth::TokenType;
use crate::cli::commands::{Cli, Commands, OutputFormat, PageArgs};
use crate::client::Client;
use crate::config::ClientConfig;
use crate::pagination::{collect_pages, ListOptions, PageLimit};
use crate::request::ResourceId;
use crate::services::{
    AuditEvent, AuditEventsService, BranchesService, DeployKeysService, JobsService,
    ListAuditEventsOptions, ListBranchesOptions, ListHooksOptions, ListJobsOptions,
    ListProjectDeployKeysOptions, ListTodosOptions, SystemHooksService, TodosService,
};
use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a command produced
#[derive(Debug)]
pub enum Output {
    /// Structured result, printed as JSON
    Json(Value),
    /// Raw bytes, written to stdout verbatim
    Raw(Bytes),
    /// A file was written
    Written { path: PathBuf, bytes: usize },
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and print its output
    pub async fn run(&self) -> anyhow::Result<()> {
        let client = self
            .client_config()?
            .build_client()
            .context("failed to build API client")?;
        let output = self.execute(&client).await?;
        self.print(&output)
    }

    /// Merge the config file, environment and command-line flags
    ///
    /// Command-line flags win over the environment, which wins over the file.
    pub fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let config = match &self.cli.config {
            Some(path) => ClientConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ClientConfig::default(),
        };
        let mut config = config.with_env_overrides();

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.cli.token {
            config.token = Some(token.clone());
            config.token_file = None;
            if config.token_type == Some(TokenType::None) {
                config.token_type = None;
            }
        }
        Ok(config)
    }

    /// Run the command against `client` without printing
    pub async fn execute(&self, client: &Client) -> anyhow::Result<Output> {
        match &self.cli.command {
            Commands::Branches {
                project,
                search,
                page,
            } => {
                let opts = ListBranchesOptions {
                    list: list_options(page),
                    search: search.clone(),
                    ..ListBranchesOptions::default()
                };
                let service = client.branches();
                let branches = collect_pages(page_limit(page), |req| {
                    let (service, project, opts) = (service.clone(), project.clone(), opts.clone());
                    async move { service.list_branches(&project, &opts, &req).await }
                })
                .await
                .with_context(|| format!("failed to list branches of {project}"))?;
                json(&branches)
            }

            Commands::DeployKeys { project, page } => {
                let opts = ListProjectDeployKeysOptions {
                    list: list_options(page),
                };
                let service = client.deploy_keys();
                let keys = collect_pages(page_limit(page), |req| {
                    let (service, project, opts) = (service.clone(), project.clone(), opts.clone());
                    async move { service.list_project_deploy_keys(&project, &opts, &req).await }
                })
                .await
                .with_context(|| format!("failed to list deploy keys of {project}"))?;
                json(&keys)
            }

            Commands::AuditEvents {
                group,
                project,
                page,
            } => {
                let opts = ListAuditEventsOptions {
                    list: list_options(page),
                    ..ListAuditEventsOptions::default()
                };
                let events = self
                    .audit_events(client, group.as_ref(), project.as_ref(), &opts, page)
                    .await
                    .context("failed to list audit events")?;
                json(&events)
            }

            Commands::Jobs {
                project,
                scopes,
                page,
            } => {
                let opts = ListJobsOptions {
                    list: list_options(page),
                    scope: scopes.clone(),
                    ..ListJobsOptions::default()
                };
                let service = client.jobs();
                let jobs = collect_pages(page_limit(page), |req| {
                    let (service, project, opts) = (service.clone(), project.clone(), opts.clone());
                    async move { service.list_project_jobs(&project, &opts, &req).await }
                })
                .await
                .with_context(|| format!("failed to list jobs of {project}"))?;
                json(&jobs)
            }

            Commands::JobTrace { project, job } => {
                let (trace, _) = client
                    .jobs()
                    .get_trace_file(project, *job, &[])
                    .await
                    .with_context(|| format!("failed to fetch trace of job {job}"))?;
                Ok(Output::Raw(trace))
            }

            Commands::Artifacts {
                project,
                job,
                output,
            } => {
                let (archive, _) = client
                    .jobs()
                    .get_job_artifacts(project, *job, &[])
                    .await
                    .with_context(|| format!("failed to download artifacts of job {job}"))?;
                write_file(output, &archive).await
            }

            Commands::Todos { state, page } => {
                let opts = ListTodosOptions {
                    list: list_options(page),
                    state: state.clone(),
                    ..ListTodosOptions::default()
                };
                let service = client.todos();
                let todos = collect_pages(page_limit(page), |req| {
                    let (service, opts) = (service.clone(), opts.clone());
                    async move { service.list_todos(&opts, &req).await }
                })
                .await
                .context("failed to list to-do items")?;
                json(&todos)
            }

            Commands::Hooks { page } => {
                let opts = ListHooksOptions {
                    list: list_options(page),
                };
                let service = client.system_hooks();
                let hooks = collect_pages(page_limit(page), |req| {
                    let (service, opts) = (service.clone(), opts.clone());
                    async move { service.list_hooks(&opts, &req).await }
                })
                .await
                .context("failed to list system hooks")?;
                json(&hooks)
            }
        }
    }

    async fn audit_events(
        &self,
        client: &Client,
        group: Option<&ResourceId>,
        project: Option<&ResourceId>,
        opts: &ListAuditEventsOptions,
        page: &PageArgs,
    ) -> crate::Result<Vec<AuditEvent>> {
        let service = client.audit_events();
        let limit = page_limit(page);
        match (group, project) {
            (Some(gid), _) => {
                collect_pages(limit, |req| {
                    let (service, gid, opts) = (service.clone(), gid.clone(), opts.clone());
                    async move { service.list_group_audit_events(&gid, &opts, &req).await }
                })
                .await
            }
            (None, Some(pid)) => {
                collect_pages(limit, |req| {
                    let (service, pid, opts) = (service.clone(), pid.clone(), opts.clone());
                    async move { service.list_project_audit_events(&pid, &opts, &req).await }
                })
                .await
            }
            (None, None) => {
                collect_pages(limit, |req| {
                    let (service, opts) = (service.clone(), opts.clone());
                    async move { service.list_instance_audit_events(&opts, &req).await }
                })
                .await
            }
        }
    }

    fn print(&self, output: &Output) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        match output {
            Output::Json(value) => {
                let text = match self.cli.format {
                    OutputFormat::Json => serde_json::to_string(value)?,
                    OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
                };
                writeln!(stdout, "{text}")?;
            }
            Output::Raw(bytes) => stdout.write_all(bytes)?,
            Output::Written { path, bytes } => {
                info!("Wrote {} bytes to {}", bytes, path.display());
            }
        }
        stdout.flush()?;
        Ok(())
    }
}

fn list_options(page: &PageArgs) -> ListOptions {
    ListOptions {
        per_page: page.per_page,
        ..ListOptions::default()
    }
}

fn page_limit(page: &PageArgs) -> PageLimit {
    if page.all {
        PageLimit::Unlimited
    } else {
        PageLimit::Pages(1)
    }
}

fn json<T: Serialize>(value: &T) -> anyhow::Result<Output> {
    Ok(Output::Json(serde_json::to_value(value)?))
}

async fn write_file(path: &Path, content: &Bytes) -> anyhow::Result<Output> {
    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Output::Written {
        path: path.to_path_buf(),
        bytes: content.len(),
    })
}
