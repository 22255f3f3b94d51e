//! Service metadata and health endpoints.
use crate::api::error::{ApiError, api_internal};
use crate::api::types::{HealthStatus, SystemInfo};
use crate::app::{API_VERSION, AppState, SERVICE_NAME};
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    get,
    path = "/api/system/info",
    tag = "system",
    responses((status = 200, description = "Service metadata", body = SystemInfo))
)]
pub async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    Json(SystemInfo {
        service: SERVICE_NAME.to_string(),
        api_version: API_VERSION.to_string(),
        durable_storage: state.store.is_durable(),
    })
}

#[utoipa::path(
    get,
    path = "/api/system/health",
    tag = "system",
    responses(
        (status = 200, description = "Service and backing store are reachable", body = HealthStatus),
        (status = 500, description = "Backing store check failed")
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    state
        .store
        .health_check()
        .await
        .map_err(|err| api_internal("health check failed", &err))?;
    Ok(Json(HealthStatus { status: "ok".to_string() }))
}
