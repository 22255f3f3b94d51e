//! HTTP API request/response types.
//!
//! # Purpose
//! Defines shared payload shapes for the identity REST API and OpenAPI
//! schema generation. Field names are camelCase on the wire, matching the
//! contract the web console consumes.
use crate::model::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Login request body; exactly one field is accepted.
///
/// The original sign-in surface also let the client pick a role here. That
/// was a self-elevation hole and the field no longer exists: roles only move
/// through the authorization gate.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub id_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub session_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoleChangeRequest {
    /// Raw role name; validated against the closed set server-side.
    pub requested_role: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<User>,
}
