//! # gitlab-rest
//!
//! A typed, async client for the GitLab REST API (v4).
//!
//! ## Features
//!
//! - **Generic dispatch**: one code path builds, sends and decodes every call
//! - **Resource IDs**: numeric IDs and `group/project` paths, escaped for you
//! - **Caller overrides**: sudo, headers, per-call tokens, timeouts, paging
//! - **Pagination**: offset (`X-Next-Page`) and keyset (`Link`) walking
//! - **Transport**: opt-in retries with backoff, client-side rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gitlab_rest::{AuthConfig, Client, Result};
//! use gitlab_rest::services::{BranchesService, ListBranchesOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new("https://gitlab.com", AuthConfig::private_token("glpat-..."))?;
//!
//!     let (branches, response) = client
//!         .branches()
//!         .list_branches(&"gitlab-org/gitlab".into(), &ListBranchesOptions::default(), &[])
//!         .await?;
//!
//!     for branch in branches {
//!         println!("{branch}");
//!     }
//!     println!("next page: {:?}", response.pagination.next_page);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           Services                              │
//! │  Branches  Jobs  DeployKeys  AuditEvents  Todos  SystemHooks ...│
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ Vec<DoOption>
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Client::dispatch::<Shape>                    │
//! │  path + ResourceId → options → query/body → RequestOption       │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │ PreparedRequest
//! ┌──────────┬───────────┬───────────────┬─────────────────────────┐
//! │   Auth   │   HTTP    │   Response    │       Pagination        │
//! ├──────────┼───────────┼───────────────┼─────────────────────────┤
//! │ Private  │ Retry     │ Status        │ X-Next-Page             │
//! │ OAuth    │ Backoff   │ Pagination    │ Link rel="next"         │
//! │ Job      │ Rate Limit│ Rate limit    │ Stream / collect        │
//! └──────────┴───────────┴───────────────┴─────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication
pub mod auth;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Request construction and dispatch
pub mod request;

/// Response metadata
pub mod response;

/// Pagination helpers
pub mod pagination;

/// The API client
pub mod client;

/// YAML configuration
pub mod config;

/// API services
pub mod services;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiError, Error, Result, ResultExt};
pub use types::*;

pub use auth::{AuthConfig, TokenType};
pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use config::ClientConfig;
pub use pagination::{collect_all, collect_pages, paginate, ListOptions, NextPage, PageLimit};
pub use request::{RequestOption, ResourceId, Upload};
pub use response::{Pagination, RateLimit, Response};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
