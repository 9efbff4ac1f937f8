//! Tests for the response envelope

use super::*;
use pretty_assertions::assert_eq;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    map
}

// ============================================================================
// Offset Pagination Tests
// ============================================================================

#[test]
fn test_offset_pagination_headers() {
    let h = headers(&[
        ("X-Total", "57"),
        ("X-Total-Pages", "3"),
        ("X-Per-Page", "20"),
        ("X-Page", "2"),
        ("X-Next-Page", "3"),
        ("X-Prev-Page", "1"),
    ]);

    let pagination = Pagination::from_headers(&h);
    assert_eq!(
        pagination,
        Pagination {
            total_items: Some(57),
            total_pages: Some(3),
            items_per_page: Some(20),
            current_page: Some(2),
            next_page: Some(3),
            previous_page: Some(1),
            ..Default::default()
        }
    );
    assert!(pagination.has_next());
}

#[test]
fn test_last_page_has_empty_next_header() {
    let h = headers(&[("X-Page", "3"), ("X-Next-Page", ""), ("X-Total-Pages", "3")]);

    let pagination = Pagination::from_headers(&h);
    assert_eq!(pagination.current_page, Some(3));
    assert_eq!(pagination.next_page, None);
    assert!(!pagination.has_next());
}

#[test]
fn test_missing_headers_are_absent() {
    let pagination = Pagination::from_headers(&HeaderMap::new());
    assert_eq!(pagination, Pagination::default());
    assert!(!pagination.has_next());
}

// ============================================================================
// Keyset Pagination Tests
// ============================================================================

#[test]
fn test_parse_link_header() {
    let links = parse_link_header(
        r#"<https://gitlab.example.com/api/v4/projects?id_after=42&pagination=keyset>; rel="next", <https://gitlab.example.com/api/v4/projects?pagination=keyset>; rel="first""#,
    );

    assert_eq!(
        links.get("next").map(String::as_str),
        Some("https://gitlab.example.com/api/v4/projects?id_after=42&pagination=keyset")
    );
    assert_eq!(
        links.get("first").map(String::as_str),
        Some("https://gitlab.example.com/api/v4/projects?pagination=keyset")
    );
    assert!(!links.contains_key("prev"));
}

#[test]
fn test_link_header_populates_pagination() {
    let h = headers(&[(
        "Link",
        r#"<https://gitlab.example.com/api/v4/todos?cursor=b>; rel="next", <https://gitlab.example.com/api/v4/todos?cursor=a>; rel="prev", <https://gitlab.example.com/api/v4/todos>; rel="first", <https://gitlab.example.com/api/v4/todos?cursor=z>; rel="last""#,
    )]);

    let pagination = Pagination::from_headers(&h);
    assert_eq!(
        pagination.next_link.as_deref(),
        Some("https://gitlab.example.com/api/v4/todos?cursor=b")
    );
    assert_eq!(
        pagination.previous_link.as_deref(),
        Some("https://gitlab.example.com/api/v4/todos?cursor=a")
    );
    assert!(pagination.first_link.is_some());
    assert!(pagination.last_link.is_some());
    assert!(pagination.has_next());
}

#[test]
fn test_link_header_without_rel_is_ignored() {
    let links = parse_link_header("<https://gitlab.example.com/api/v4/x>");
    assert!(links.is_empty());
}

// ============================================================================
// Rate Limit Tests
// ============================================================================

#[test]
fn test_rate_limit_headers() {
    let h = headers(&[
        ("RateLimit-Limit", "600"),
        ("RateLimit-Remaining", "599"),
        ("RateLimit-Reset", "1700000000"),
        ("Retry-After", "30"),
    ]);

    let rate_limit = RateLimit::from_headers(&h);
    assert_eq!(rate_limit.limit, Some(600));
    assert_eq!(rate_limit.remaining, Some(599));
    assert_eq!(rate_limit.reset.map(|t| t.timestamp()), Some(1_700_000_000));
    assert_eq!(rate_limit.retry_after, Some(30));
}

#[test]
fn test_response_from_parts() {
    let h = headers(&[("X-Total", "1"), ("Content-Type", "application/json")]);
    let response = Response::from_parts(StatusCode::OK, h);

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.pagination.total_items, Some(1));
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.rate_limit, RateLimit::default());
}
