//! Tests for the auth module

use super::*;
use std::collections::HashMap;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_no_auth() {
    let auth = Authenticator::new(AuthConfig::None);
    let client = reqwest::Client::new();
    let req = client.get("https://gitlab.example.com/api/v4/user");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert!(built.headers().get("PRIVATE-TOKEN").is_none());
    assert!(built.headers().get("Authorization").is_none());
}

#[tokio::test]
async fn test_private_token() {
    let auth = Authenticator::new(AuthConfig::private_token("glpat-123"));
    let client = reqwest::Client::new();
    let req = client.get("https://gitlab.example.com/api/v4/user");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(built.headers().get("PRIVATE-TOKEN").unwrap(), "glpat-123");
}

#[tokio::test]
async fn test_oauth_token() {
    let auth = Authenticator::new(AuthConfig::oauth_token("oauth-abc"));
    let client = reqwest::Client::new();
    let req = client.get("https://gitlab.example.com/api/v4/user");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(
        built.headers().get("Authorization").unwrap(),
        "Bearer oauth-abc"
    );
}

#[tokio::test]
async fn test_job_token() {
    let auth = Authenticator::new(AuthConfig::job_token("job-xyz"));
    let client = reqwest::Client::new();
    let req = client.get("https://gitlab.example.com/api/v4/job");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(built.headers().get("JOB-TOKEN").unwrap(), "job-xyz");
}

#[tokio::test]
async fn test_custom_headers() {
    let mut headers = HashMap::new();
    headers.insert("X-Gitlab-Proxy".to_string(), "on".to_string());
    let auth = Authenticator::new(AuthConfig::CustomHeaders { headers });

    let client = reqwest::Client::new();
    let req = client.get("https://gitlab.example.com/api/v4/user");

    let built = auth.apply(req).await.unwrap().build().unwrap();
    assert_eq!(built.headers().get("X-Gitlab-Proxy").unwrap(), "on");
}

#[tokio::test]
async fn test_password_grant_fetches_and_caches_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_json(serde_json::json!({
            "grant_type": "password",
            "username": "root",
            "password": "secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "granted-token",
            "token_type": "Bearer",
            "expires_in": 7200
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let token_url = Url::parse(&format!("{}/oauth/token", mock_server.uri())).unwrap();
    let auth = Authenticator::new(AuthConfig::Password {
        username: "root".to_string(),
        password: "secret".to_string(),
    })
    .token_url(token_url);

    let client = reqwest::Client::new();
    for _ in 0..2 {
        let req = client.get("https://gitlab.example.com/api/v4/user");
        let built = auth.apply(req).await.unwrap().build().unwrap();
        assert_eq!(
            built.headers().get("Authorization").unwrap(),
            "Bearer granted-token"
        );
    }
}

#[tokio::test]
async fn test_password_grant_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": "invalid_grant"
        })))
        .mount(&mock_server)
        .await;

    let token_url = Url::parse(&format!("{}/oauth/token", mock_server.uri())).unwrap();
    let auth = Authenticator::new(AuthConfig::Password {
        username: "root".to_string(),
        password: "wrong".to_string(),
    })
    .token_url(token_url);

    let client = reqwest::Client::new();
    let result = auth.apply(client.get("https://gitlab.example.com/api/v4/user")).await;
    assert!(matches!(result, Err(crate::error::Error::Auth { .. })));
}

#[tokio::test]
async fn test_password_grant_without_token_url() {
    let auth = Authenticator::new(AuthConfig::Password {
        username: "root".to_string(),
        password: "secret".to_string(),
    });

    let client = reqwest::Client::new();
    let result = auth.apply(client.get("https://gitlab.example.com/api/v4/user")).await;
    assert!(result.is_err());
}
