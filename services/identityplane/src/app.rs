//! Identity-plane HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::google::{GoogleIdpConfig, GoogleTokenVerifier};
use crate::auth::session::ServiceSigningKeys;
use crate::observability;
use crate::store::UserDirectory;
use axum::Json;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

pub const SERVICE_NAME: &str = "identityplane";
pub const API_VERSION: &str = "v1";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserDirectory + Send + Sync>,
    pub idp: GoogleIdpConfig,
    pub verifier: GoogleTokenVerifier,
    pub signing_keys: Arc<ServiceSigningKeys>,
    pub session_ttl: Duration,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/api/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/api/system/health",
            axum::routing::get(api::system::health),
        )
        .route(
            "/api/auth/google",
            axum::routing::post(auth::login::login_google),
        )
        .route("/api/users", axum::routing::get(api::users::list_users))
        .route(
            "/api/users/:user_id/role",
            axum::routing::put(api::users::set_role),
        )
        .route(
            "/api/openapi.json",
            axum::routing::get(|| async { Json(ApiDoc::openapi()) }),
        )
        .layer(trace_layer)
        .with_state(state)
}
