//! User record model.
//!
//! # Purpose
//! Defines the internal identity record keyed by the provider-stable subject
//! id. This is the authoritative shape stored in the user directory and the
//! shape returned to API clients.
use crate::model::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Internal identity record for one external subject.
///
/// # Overview
/// `id` is the identity provider's stable subject id and is immutable once
/// assigned. `role` is owned by the user directory and only ever changes
/// through the authorization gate; any copy of this struct held outside the
/// directory is a snapshot and must not be trusted for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}
