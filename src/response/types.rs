//! Response envelope types
//!
//! Header parsing for offset pagination (`X-Page`, `X-Next-Page`, ...),
//! keyset pagination (`Link`) and rate limiting (`RateLimit-*`).

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::collections::HashMap;

const HEADER_TOTAL: &str = "x-total";
const HEADER_TOTAL_PAGES: &str = "x-total-pages";
const HEADER_PER_PAGE: &str = "x-per-page";
const HEADER_PAGE: &str = "x-page";
const HEADER_NEXT_PAGE: &str = "x-next-page";
const HEADER_PREV_PAGE: &str = "x-prev-page";
const HEADER_LINK: &str = "link";

const HEADER_RATE_LIMIT: &str = "ratelimit-limit";
const HEADER_RATE_REMAINING: &str = "ratelimit-remaining";
const HEADER_RATE_RESET: &str = "ratelimit-reset";
const HEADER_RETRY_AFTER: &str = "retry-after";

/// Response metadata returned alongside every decoded value
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status
    pub status: StatusCode,
    /// Raw response headers
    pub headers: HeaderMap,
    /// Pagination metadata
    pub pagination: Pagination,
    /// Rate-limit metadata
    pub rate_limit: RateLimit,
}

impl Response {
    /// Build the envelope from a status and headers
    pub fn from_parts(status: StatusCode, headers: HeaderMap) -> Self {
        let pagination = Pagination::from_headers(&headers);
        let rate_limit = RateLimit::from_headers(&headers);
        Self {
            status,
            headers,
            pagination,
            rate_limit,
        }
    }

    /// Build the envelope from a reqwest response (body untouched)
    pub fn from_reqwest(response: &reqwest::Response) -> Self {
        Self::from_parts(response.status(), response.headers().clone())
    }

    /// Status code as a number
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get a header value as a string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Offset and keyset pagination metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Total number of items (`X-Total`)
    pub total_items: Option<u64>,
    /// Total number of pages (`X-Total-Pages`)
    pub total_pages: Option<u64>,
    /// Items per page (`X-Per-Page`)
    pub items_per_page: Option<u64>,
    /// Current page (`X-Page`)
    pub current_page: Option<u64>,
    /// Next page (`X-Next-Page`)
    pub next_page: Option<u64>,
    /// Previous page (`X-Prev-Page`)
    pub previous_page: Option<u64>,
    /// `rel="next"` link
    pub next_link: Option<String>,
    /// `rel="prev"` link
    pub previous_link: Option<String>,
    /// `rel="first"` link
    pub first_link: Option<String>,
    /// `rel="last"` link
    pub last_link: Option<String>,
}

impl Pagination {
    /// Parse pagination metadata from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let links = headers
            .get(HEADER_LINK)
            .and_then(|v| v.to_str().ok())
            .map(parse_link_header)
            .unwrap_or_default();

        Self {
            total_items: header_u64(headers, HEADER_TOTAL),
            total_pages: header_u64(headers, HEADER_TOTAL_PAGES),
            items_per_page: header_u64(headers, HEADER_PER_PAGE),
            current_page: header_u64(headers, HEADER_PAGE),
            next_page: header_u64(headers, HEADER_NEXT_PAGE),
            previous_page: header_u64(headers, HEADER_PREV_PAGE),
            next_link: links.get("next").cloned(),
            previous_link: links.get("prev").cloned(),
            first_link: links.get("first").cloned(),
            last_link: links.get("last").cloned(),
        }
    }

    /// Whether the server advertised another page
    pub fn has_next(&self) -> bool {
        self.next_link.is_some() || self.next_page.is_some()
    }
}

/// Rate-limit metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed in the current window
    pub limit: Option<u64>,
    /// Requests left in the current window
    pub remaining: Option<u64>,
    /// When the window resets
    pub reset: Option<DateTime<Utc>>,
    /// Seconds to wait before retrying (`Retry-After`)
    pub retry_after: Option<u64>,
}

impl RateLimit {
    /// Parse rate-limit metadata from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: header_u64(headers, HEADER_RATE_LIMIT),
            remaining: header_u64(headers, HEADER_RATE_REMAINING),
            reset: header_u64(headers, HEADER_RATE_RESET)
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            retry_after: header_u64(headers, HEADER_RETRY_AFTER),
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Parse an RFC 5988 `Link` header into a map of rel → URL
///
/// Format: `<https://gitlab.com/api/v4/projects?page=2>; rel="next", <...>; rel="last"`
pub fn parse_link_header(header: &str) -> HashMap<String, String> {
    let mut links = HashMap::new();

    for part in header.split(',') {
        let part = part.trim();
        let mut url = None;
        let mut rels = None;

        for segment in part.split(';') {
            let segment = segment.trim();
            if segment.starts_with('<') && segment.ends_with('>') {
                url = Some(&segment[1..segment.len() - 1]);
            } else if let Some(stripped) = segment.strip_prefix("rel=") {
                rels = Some(stripped.trim_matches('"').trim_matches('\''));
            }
        }

        if let (Some(u), Some(r)) = (url, rels) {
            // rel may carry several space separated values
            for rel in r.split_whitespace() {
                links.insert(rel.to_string(), u.to_string());
            }
        }
    }

    links
}
