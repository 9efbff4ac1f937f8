//! Pagination module
//!
//! Supports: offset pagination (`X-Next-Page`) and keyset pagination
//! (`Link` header).
//!
//! # Overview
//!
//! [`NextPage::from_response`] reads the response metadata and decides where
//! the next page lives. [`paginate`] and [`collect_all`] drive a list call
//! until no next page remains.

mod stream;
mod types;

pub use stream::{collect_all, collect_pages, paginate};
pub use types::{ListOptions, NextPage, PageLimit};
