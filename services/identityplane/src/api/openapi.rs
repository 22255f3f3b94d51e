//! OpenAPI schema aggregation for the identity API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    system,
    types::{
        ErrorResponse, HealthStatus, LoginRequest, LoginResponse, RoleChangeRequest, SystemInfo,
        UserListResponse,
    },
    users,
};
use crate::auth::login;
use crate::model::{Role, User};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "identityplane",
        version = "v1",
        description = "Identity and role directory HTTP API"
    ),
    paths(
        system::system_info,
        system::health,
        login::login_google,
        users::list_users,
        users::set_role
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        LoginRequest,
        LoginResponse,
        RoleChangeRequest,
        UserListResponse,
        User,
        Role
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "auth", description = "Google sign-in and session issuance"),
        (name = "users", description = "User directory and role management")
    )
)]
pub struct ApiDoc;
