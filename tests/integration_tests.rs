//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow through the public API: config → client →
//! service call → decoded value and response metadata

use gitlab_rest::services::{
    BranchesService, CreateBranchOptions, JobsService, ListBranchesOptions, ListJobsOptions,
    ListTodosOptions, TodosService,
};
use gitlab_rest::{
    collect_all, AuthConfig, Client, ClientConfig, ListOptions, RequestOption, ResourceId,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    Client::new(&server.uri(), AuthConfig::private_token("glpat-it")).unwrap()
}

// ============================================================================
// Client Construction Tests
// ============================================================================

#[tokio::test]
async fn test_client_from_yaml_config() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/todos"))
        .and(header("PRIVATE-TOKEN", "glpat-yaml"))
        .and(header("X-Team", "platform"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let yaml = format!(
        "base_url: {}\ntoken: glpat-yaml\ntimeout_seconds: 5\nheaders:\n  X-Team: platform\n",
        server.uri()
    );
    let client = ClientConfig::from_yaml_str(&yaml)
        .unwrap()
        .build_client()
        .unwrap();

    assert_eq!(client.base_url().path(), "/api/v4/");
    let (todos, _) = client
        .todos()
        .list_todos(&ListTodosOptions::default(), &[])
        .await
        .unwrap();
    assert!(todos.is_empty());
}

#[tokio::test]
async fn test_oauth_token_uses_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/7/repository/branches/main"))
        .and(header("Authorization", "Bearer oauth-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "main"})))
        .mount(&server)
        .await;

    let client = Client::builder(server.uri())
        .auth(AuthConfig::OAuthToken {
            token: "oauth-secret".to_string(),
        })
        .build()
        .unwrap();
    let (branch, _) = client
        .branches()
        .get_branch(&7u64.into(), "main", &[])
        .await
        .unwrap();
    assert_eq!(branch.name, "main");
}

// ============================================================================
// Request Shaping Tests
// ============================================================================

#[tokio::test]
async fn test_path_project_and_branch_are_escaped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(
            "/api/v4/projects/gitlab-org%2Fgitlab/repository/branches/feature%2Flogin",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "feature/login",
            "protected": true
        })))
        .mount(&server)
        .await;

    let pid: ResourceId = "gitlab-org/gitlab".parse().unwrap();
    let (branch, _) = client(&server)
        .branches()
        .get_branch(&pid, "feature/login", &[])
        .await
        .unwrap();
    assert!(branch.protected);
}

#[tokio::test]
async fn test_request_options_apply_sudo_header_and_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/jobs"))
        .and(header("Sudo", "alice"))
        .and(header("X-Request-Id", "abc"))
        .and(query_param("page", "3"))
        .and(query_param("per_page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let opts = ListJobsOptions {
        list: ListOptions::per_page(5),
        ..ListJobsOptions::default()
    };
    client(&server)
        .jobs()
        .list_project_jobs(
            &1u64.into(),
            &opts,
            &[
                RequestOption::sudo("alice"),
                RequestOption::header("X-Request-Id", "abc"),
                RequestOption::Page(3),
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_option_fails_before_sending() {
    let server = MockServer::start().await;

    let err = client(&server)
        .branches()
        .create_branch(&1u64.into(), &CreateBranchOptions::default(), &[])
        .await
        .unwrap_err();

    assert!(err.is_construction());
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_not_found_error_carries_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/branches/nope"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"message": "404 Branch Not Found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .branches()
        .get_branch(&1u64.into(), "nope", &[])
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), Some(404));
    assert!(err.to_string().contains("404 Branch Not Found"));
    let response = err.response().unwrap();
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_retry_on_503_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/todos"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = Client::builder(server.uri())
        .auth(AuthConfig::private_token("glpat-it"))
        .max_retries(2)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let (todos, response) = client
        .todos()
        .list_todos(&ListTodosOptions::default(), &[])
        .await
        .unwrap();

    assert!(todos.is_empty());
    assert_eq!(response.status_code(), 200);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_offset_pagination_flow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/branches"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Page", "2")
                .insert_header("X-Total-Pages", "2")
                .set_body_json(json!([{"name": "c"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/branches"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Page", "1")
                .insert_header("X-Next-Page", "2")
                .insert_header("X-Total", "3")
                .insert_header("X-Total-Pages", "2")
                .set_body_json(json!([{"name": "a"}, {"name": "b"}])),
        )
        .mount(&server)
        .await;

    let service = client(&server).branches();
    let opts = ListBranchesOptions::default();
    let pid = ResourceId::Numeric(1);

    let branches = collect_all(|req: Vec<RequestOption>| {
        let service = service.clone();
        let opts = opts.clone();
        let pid = pid.clone();
        async move { service.list_branches(&pid, &opts, &req).await }
    })
    .await
    .unwrap();

    let names: Vec<_> = branches.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_keyset_pagination_flow() {
    let server = MockServer::start().await;
    let next = format!(
        "{}/api/v4/projects/1/repository/branches?pagination=keyset&per_page=1&order_by=name&page_token=b",
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/branches"))
        .and(query_param("page_token", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "b"}])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/branches"))
        .and(query_param("pagination", "keyset"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", format!("<{next}>; rel=\"next\"").as_str())
                .set_body_json(json!([{"name": "a"}])),
        )
        .mount(&server)
        .await;

    let service = client(&server).branches();
    let opts = ListBranchesOptions {
        list: ListOptions::keyset("name", 1),
        ..ListBranchesOptions::default()
    };
    let pid = ResourceId::Numeric(1);

    let branches = collect_all(|req: Vec<RequestOption>| {
        let service = service.clone();
        let opts = opts.clone();
        let pid = pid.clone();
        async move { service.list_branches(&pid, &opts, &req).await }
    })
    .await
    .unwrap();

    assert_eq!(branches.len(), 2);
    assert_eq!(branches[1].name, "b");
}

// ============================================================================
// Raw Download Tests
// ============================================================================

#[tokio::test]
async fn test_job_trace_returns_raw_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/jobs/8/trace"))
        .and(header_exists("PRIVATE-TOKEN"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/plain")
                .set_body_string("Running with gitlab-runner\nJob succeeded\n"),
        )
        .mount(&server)
        .await;

    let (trace, _) = client(&server)
        .jobs()
        .get_trace_file(&1u64.into(), 8, &[])
        .await
        .unwrap();

    assert!(trace.starts_with(b"Running with"));
    assert!(trace.ends_with(b"Job succeeded\n"));
}
