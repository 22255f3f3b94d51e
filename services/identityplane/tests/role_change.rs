mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::read_json;
use identityplane::app::{AppState, build_router};
use identityplane::auth::google::{GoogleIdpConfig, GoogleTokenVerifier};
use identityplane::auth::keys::generate_signing_keys;
use identityplane::auth::session::mint_session;
use identityplane::model::{Role, User};
use identityplane::store::{UserDirectory, memory::InMemoryDirectory};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn seed_user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: id.to_string(),
        email: format!("{id}@example.com"),
        role,
    }
}

async fn build_state_with_users(users: Vec<User>) -> AppState {
    let store = InMemoryDirectory::new();
    for user in users {
        let id = user.id.clone();
        let role = user.role;
        store.upsert_default(user).await.expect("seed");
        // upsert_default always lands on the lowest role; raise afterwards.
        if role != Role::User {
            store.set_role(&id, role).await.expect("seed role");
        }
    }
    AppState {
        store: Arc::new(store),
        idp: GoogleIdpConfig::for_audiences(vec!["test-client-id".to_string()]),
        verifier: GoogleTokenVerifier::new(Duration::from_secs(300), 60),
        signing_keys: Arc::new(generate_signing_keys().expect("keys")),
        session_ttl: Duration::from_secs(3600),
    }
}

fn session_for(state: &AppState, user_id: &str) -> String {
    mint_session(&state.signing_keys, user_id, Duration::from_secs(600)).expect("session")
}

async fn put_role(
    state: AppState,
    actor_session: Option<&str>,
    target_id: &str,
    requested_role: &str,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(format!("/api/users/{target_id}/role"))
        .header("content-type", "application/json");
    if let Some(token) = actor_session {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let req = builder
        .body(Body::from(
            json!({ "requestedRole": requested_role }).to_string(),
        ))
        .expect("request");
    build_router(state)
        .into_service()
        .oneshot(req)
        .await
        .expect("response")
}

async fn role_of(state: &AppState, id: &str) -> Role {
    state
        .store
        .get_user(id)
        .await
        .expect("get")
        .expect("exists")
        .role
}

#[tokio::test]
async fn superadmin_can_change_any_role() {
    let state = build_state_with_users(vec![
        seed_user("root-1", Role::Superadmin),
        seed_user("user-1", Role::User),
    ])
    .await;
    let session = session_for(&state, "root-1");

    let response = put_role(state.clone(), Some(&session), "user-1", "admin").await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["id"], "user-1");
    assert_eq!(payload["role"], "admin");
    assert_eq!(role_of(&state, "user-1").await, Role::Admin);

    let response = put_role(state.clone(), Some(&session), "user-1", "user").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(role_of(&state, "user-1").await, Role::User);
}

#[tokio::test]
async fn non_superadmins_are_forbidden_and_change_nothing() {
    let state = build_state_with_users(vec![
        seed_user("admin-1", Role::Admin),
        seed_user("user-1", Role::User),
        seed_user("user-2", Role::User),
    ])
    .await;

    for actor in ["admin-1", "user-1"] {
        let session = session_for(&state, actor);
        // Against another user, and against themselves.
        for target in ["user-2", actor] {
            let response = put_role(state.clone(), Some(&session), target, "superadmin").await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            let payload = read_json(response).await;
            assert_eq!(payload["code"], "forbidden");
        }
    }

    assert_eq!(role_of(&state, "admin-1").await, Role::Admin);
    assert_eq!(role_of(&state, "user-1").await, Role::User);
    assert_eq!(role_of(&state, "user-2").await, Role::User);
}

#[tokio::test]
async fn missing_or_invalid_session_is_unauthorized() {
    let state = build_state_with_users(vec![seed_user("user-1", Role::User)]).await;

    let response = put_role(state.clone(), None, "user-1", "admin").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = put_role(state.clone(), Some("not-a-token"), "user-1", "admin").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(role_of(&state, "user-1").await, Role::User);
}

#[tokio::test]
async fn unknown_role_is_rejected_for_everyone() {
    let state = build_state_with_users(vec![
        seed_user("root-1", Role::Superadmin),
        seed_user("user-1", Role::User),
    ])
    .await;

    // The role check comes first, so even a superadmin gets the same answer.
    for actor in ["root-1", "user-1"] {
        let session = session_for(&state, actor);
        for bogus in ["root", "Admin", "", "superadmin "] {
            let response = put_role(state.clone(), Some(&session), "user-1", bogus).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let payload = read_json(response).await;
            assert_eq!(payload["code"], "invalid_role");
        }
    }
    assert_eq!(role_of(&state, "user-1").await, Role::User);
}

#[tokio::test]
async fn unknown_target_is_not_found_and_not_created() {
    let state = build_state_with_users(vec![seed_user("root-1", Role::Superadmin)]).await;
    let session = session_for(&state, "root-1");

    let response = put_role(state.clone(), Some(&session), "ghost", "admin").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "not_found");

    let users = state.store.list_users().await.expect("list");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "root-1");
}

#[tokio::test]
async fn superadmin_self_demotion_takes_effect_immediately() {
    let state = build_state_with_users(vec![
        seed_user("root-1", Role::Superadmin),
        seed_user("user-1", Role::User),
    ])
    .await;
    let session = session_for(&state, "root-1");

    let response = put_role(state.clone(), Some(&session), "root-1", "user").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(role_of(&state, "root-1").await, Role::User);

    // The session is still valid, but privilege is read fresh from the
    // directory, so the next attempt is denied.
    let response = put_role(state.clone(), Some(&session), "user-1", "admin").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(role_of(&state, "user-1").await, Role::User);
}

#[tokio::test]
async fn listing_requires_a_session() {
    let state = build_state_with_users(vec![seed_user("user-1", Role::User)]).await;

    let req = Request::builder()
        .method("GET")
        .uri("/api/users")
        .body(Body::empty())
        .expect("request");
    let response = build_router(state.clone())
        .into_service()
        .oneshot(req)
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let session = session_for(&state, "user-1");
    let req = Request::builder()
        .method("GET")
        .uri("/api/users")
        .header("authorization", format!("Bearer {session}"))
        .body(Body::empty())
        .expect("request");
    let response = build_router(state)
        .into_service()
        .oneshot(req)
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["items"][0]["id"], "user-1");
}
