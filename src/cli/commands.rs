//! CLI commands and argument parsing

use crate::request::ResourceId;
use crate::services::JobScope;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the GitLab REST API
#[derive(Parser, Debug)]
#[command(name = "gitlab-rest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Instance URL, overrides the config file and GITLAB_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Access token, overrides the config file and GITLAB_TOKEN
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List repository branches
    Branches {
        /// Project ID or path (`group/project`)
        project: ResourceId,

        /// Only branches containing this string
        #[arg(long)]
        search: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List deploy keys of a project
    DeployKeys {
        /// Project ID or path
        project: ResourceId,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List audit events of the instance, a group or a project
    AuditEvents {
        #[arg(long, conflicts_with = "project")]
        group: Option<ResourceId>,

        #[arg(long)]
        project: Option<ResourceId>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List jobs of a project
    Jobs {
        /// Project ID or path
        project: ResourceId,

        /// Only jobs in these states (repeatable)
        #[arg(long = "scope")]
        scopes: Vec<JobScope>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Print the log of a job
    JobTrace {
        /// Project ID or path
        project: ResourceId,

        /// Job ID
        job: u64,
    },

    /// Download the artifacts archive of a job
    Artifacts {
        /// Project ID or path
        project: ResourceId,

        /// Job ID
        job: u64,

        /// Where to write the archive
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List to-do items of the authenticated user
    Todos {
        /// `pending` or `done`
        #[arg(long)]
        state: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List system hooks
    Hooks {
        #[command(flatten)]
        page: PageArgs,
    },
}

/// Paging flags shared by list commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PageArgs {
    /// Walk every page instead of the first
    #[arg(long)]
    pub all: bool,

    /// Items per page
    #[arg(long)]
    pub per_page: Option<u64>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Indented JSON
    Pretty,
}
