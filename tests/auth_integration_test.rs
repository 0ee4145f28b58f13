use anyhow::Result;
use httpmock::prelude::*;
use pubtrend::domain::ports::CredentialStore;
use pubtrend::{ApiClient, FileSession, InMemorySession, TrendError};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn session(access: Option<&str>, refresh: Option<&str>) -> Arc<InMemorySession> {
    Arc::new(InMemorySession::new(
        access.map(str::to_string),
        refresh.map(str::to_string),
    ))
}

#[tokio::test]
async fn test_bearer_token_sent_and_publications_parsed() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/getPublications")
            .query_param("iin", "990101300123")
            .header("Authorization", "Bearer access-1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([
                {"_id": "1", "title": "A", "year": "2021", "publicationType": "articles"},
                {"_id": "2", "title": "B", "year": 2022}
            ]));
    });

    let client = ApiClient::new(server.base_url(), session(Some("access-1"), None));
    let publications = client.fetch_user_publications(Some("990101300123")).await?;

    api_mock.assert();
    assert_eq!(publications.len(), 2);
    assert_eq!(publications[0].parsed_year(), Some(2021));
    assert_eq!(publications[1].title.as_deref(), Some("B"));
    Ok(())
}

#[tokio::test]
async fn test_missing_access_token_fails_without_request() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/user/getPublications");
        then.status(200).json_body(json!([]));
    });

    let client = ApiClient::new(server.base_url(), session(None, Some("refresh")));
    let result = client.fetch_user_publications(None).await;

    assert!(matches!(result, Err(TrendError::Unauthenticated { .. })));
    assert_eq!(api_mock.hits(), 0);
}

#[tokio::test]
async fn test_expired_token_is_refreshed_once_and_retried() -> Result<()> {
    let server = MockServer::start();
    let expired = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/getPublications")
            .header("Authorization", "Bearer stale");
        then.status(401);
    });
    let refresh = server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/refresh-token")
            .json_body(json!({"refreshToken": "refresh-1"}));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"accessToken": "fresh"}));
    });
    let fresh = server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/getPublications")
            .header("Authorization", "Bearer fresh");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([{"year": 2023}]));
    });

    let store = session(Some("stale"), Some("refresh-1"));
    let client = ApiClient::new(server.base_url(), store.clone());
    let publications = client.fetch_user_publications(None).await?;

    expired.assert();
    refresh.assert();
    fresh.assert();
    assert_eq!(publications.len(), 1);
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
    Ok(())
}

#[tokio::test]
async fn test_rejected_refresh_clears_session() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/admin/publications");
        then.status(401);
    });
    let refresh = server.mock(|when, then| {
        when.method(POST).path("/api/auth/refresh-token");
        then.status(403);
    });

    let store = session(Some("stale"), Some("revoked"));
    let client = ApiClient::new(server.base_url(), store.clone());
    let result = client.fetch_all_publications().await;

    refresh.assert();
    assert!(matches!(result, Err(TrendError::Unauthenticated { .. })));
    assert!(store.access_token().is_none());
    assert!(store.refresh_token().is_none());
}

#[tokio::test]
async fn test_second_unauthorized_does_not_loop() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/api/user/getPublications");
        then.status(401);
    });
    let refresh = server.mock(|when, then| {
        when.method(POST).path("/api/auth/refresh-token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"accessToken": "still-bad"}));
    });

    let client = ApiClient::new(server.base_url(), session(Some("stale"), Some("refresh")));
    let result = client.fetch_user_publications(None).await;

    assert!(matches!(result, Err(TrendError::Unauthenticated { .. })));
    assert_eq!(api_mock.hits(), 2);
    assert_eq!(refresh.hits(), 1);
}

#[tokio::test]
async fn test_server_error_maps_to_http_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/user/getPublications");
        then.status(500);
    });

    let client = ApiClient::new(server.base_url(), session(Some("access"), None));
    let result = client.fetch_user_publications(None).await;

    match result {
        Err(TrendError::HttpStatus { status, endpoint }) => {
            assert_eq!(status, 500);
            assert!(endpoint.ends_with("/api/user/getPublications"));
        }
        other => panic!("expected HttpStatus error, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_refreshed_token_persisted_to_session_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let session_path = temp_dir.path().join("session.json");
    std::fs::write(
        &session_path,
        r#"{"accessToken": "stale", "refreshToken": "refresh-1"}"#,
    )?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/getPublications")
            .header("Authorization", "Bearer stale");
        then.status(401);
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/refresh-token");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"accessToken": "fresh"}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/user/getPublications")
            .header("Authorization", "Bearer fresh");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([]));
    });

    let client = ApiClient::new(server.base_url(), Arc::new(FileSession::load(&session_path)?));
    let publications = client.fetch_user_publications(None).await?;
    assert!(publications.is_empty());

    let reopened = FileSession::load(&session_path)?;
    assert_eq!(reopened.access_token().as_deref(), Some("fresh"));
    assert_eq!(reopened.refresh_token().as_deref(), Some("refresh-1"));
    Ok(())
}
