//! User directory endpoints.
use crate::api::error::{
    ApiError, api_forbidden, api_internal, api_invalid_role, api_not_found,
};
use crate::api::require_session;
use crate::api::types::{RoleChangeRequest, UserListResponse};
use crate::app::AppState;
use crate::auth::gate::{self, GateError};
use crate::model::User;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 200, description = "All known users", body = UserListResponse),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserListResponse>, ApiError> {
    require_session(&state, &headers)?;
    let items = state
        .store
        .list_users()
        .await
        .map_err(|err| api_internal("failed to list users", &err))?;
    Ok(Json(UserListResponse { items }))
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}/role",
    tag = "users",
    request_body = RoleChangeRequest,
    params(("user_id" = String, Path, description = "Target user id")),
    responses(
        (status = 200, description = "Role updated", body = User),
        (status = 400, description = "Requested role is not a known role"),
        (status = 401, description = "Missing or invalid session"),
        (status = 403, description = "Caller is not a superadmin"),
        (status = 404, description = "Target user does not exist")
    )
)]
pub async fn set_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<RoleChangeRequest>,
) -> Result<Json<User>, ApiError> {
    let actor_id = require_session(&state, &headers)?;
    let updated = gate::authorize_role_change(
        state.store.as_ref(),
        &actor_id,
        &user_id,
        &body.requested_role,
    )
    .await
    .map_err(|err| match err {
        GateError::InvalidRole(role) => {
            api_invalid_role(&format!("unknown role: {role}"))
        }
        GateError::Forbidden => api_forbidden("role changes require superadmin"),
        GateError::NotFound => api_not_found(&format!("no such user: {user_id}")),
        GateError::Store(store_err) => api_internal("failed to update role", &store_err),
    })?;
    Ok(Json(updated))
}
