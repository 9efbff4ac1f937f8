//! Pagination types
//!
//! List endpoints page either by offset (`page`/`per_page`, answered with
//! `X-Next-Page`) or by keyset (`pagination=keyset`, answered with a
//! `Link: rel="next"` header).

use crate::request::RequestOption;
use crate::response::Response;
use serde::{Deserialize, Serialize};

/// Options shared by every list endpoint
///
/// Flattened into each endpoint's own options with `#[serde(flatten)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Page to fetch, starting at 1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    /// Items per page (server default 20, max 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u64>,
    /// `keyset` to request keyset pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<String>,
    /// Field to order by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    /// `asc` or `desc`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Opaque keyset cursor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl ListOptions {
    /// Offset pagination with the given page size
    pub fn per_page(per_page: u64) -> Self {
        Self {
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    /// Keyset pagination ordered by `order_by`
    pub fn keyset(order_by: impl Into<String>, per_page: u64) -> Self {
        Self {
            per_page: Some(per_page),
            pagination: Some("keyset".to_string()),
            order_by: Some(order_by.into()),
            ..Self::default()
        }
    }

    /// Set the page number
    #[must_use]
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }
}

/// Where the next page lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Offset pagination: fetch this page number
    Page(u64),
    /// Keyset pagination: follow this link
    Keyset(String),
    /// No more pages
    Done,
}

impl NextPage {
    /// Resolve the next page from response metadata
    ///
    /// A keyset link wins over an offset page number.
    pub fn from_response(response: &Response) -> Self {
        match RequestOption::next_for(response) {
            Some(RequestOption::Keyset(link)) => Self::Keyset(link),
            Some(RequestOption::Page(page)) => Self::Page(page),
            _ => Self::Done,
        }
    }

    /// Check if there are no more pages
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The caller override that fetches this page
    pub fn request_option(&self) -> Option<RequestOption> {
        match self {
            Self::Page(page) => Some(RequestOption::Page(*page)),
            Self::Keyset(link) => Some(RequestOption::Keyset(link.clone())),
            Self::Done => None,
        }
    }
}

/// Cap on the number of pages fetched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageLimit {
    /// Walk every page
    #[default]
    Unlimited,
    /// Stop after this many pages
    Pages(usize),
}

impl PageLimit {
    /// Check if `fetched` pages reach the cap
    pub fn reached(&self, fetched: usize) -> bool {
        match self {
            Self::Unlimited => false,
            Self::Pages(max) => fetched >= *max,
        }
    }
}
