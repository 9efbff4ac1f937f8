//! CLI module
//!
//! Command-line interface over the client.
//!
//! # Commands
//!
//! - `branches` - List repository branches
//! - `deploy-keys` - List project deploy keys
//! - `audit-events` - List instance, group or project audit events
//! - `jobs` - List project jobs
//! - `job-trace` - Print a job log
//! - `artifacts` - Download a job's artifacts archive
//! - `todos` - List to-do items
//! - `hooks` - List system hooks

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat, PageArgs};
pub use runner::{Output, Runner};
