mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::read_json;
use identityplane::app::{AppState, build_router};
use identityplane::auth::google::{GoogleIdpConfig, GoogleTokenVerifier};
use identityplane::auth::keys::generate_signing_keys;
use identityplane::store::memory::InMemoryDirectory;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn build_state() -> AppState {
    AppState {
        store: Arc::new(InMemoryDirectory::new()),
        idp: GoogleIdpConfig::for_audiences(vec!["test-client-id".to_string()]),
        verifier: GoogleTokenVerifier::new(Duration::from_secs(300), 60),
        signing_keys: Arc::new(generate_signing_keys().expect("keys")),
        session_ttl: Duration::from_secs(3600),
    }
}

async fn get(state: AppState, uri: &str) -> axum::response::Response {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    build_router(state)
        .into_service()
        .oneshot(req)
        .await
        .expect("response")
}

#[tokio::test]
async fn system_info_reports_backend() {
    let response = get(build_state(), "/api/system/info").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["service"], "identityplane");
    assert_eq!(payload["api_version"], "v1");
    assert_eq!(payload["durable_storage"], false);
}

#[tokio::test]
async fn health_is_ok_with_memory_store() {
    let response = get(build_state(), "/api/system/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn openapi_document_lists_routes() {
    let response = get(build_state(), "/api/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let paths = payload["paths"].as_object().expect("paths");
    assert!(paths.contains_key("/api/auth/google"));
    assert!(paths.contains_key("/api/users/{user_id}/role"));
    assert!(paths.contains_key("/api/users"));
}
