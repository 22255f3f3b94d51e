//! Role definitions and parsing.
//!
//! # Purpose
//! Defines the closed role set and its privilege ordering. Every role value in
//! the system passes through this type; there is no stringly-typed role state
//! outside the wire boundary.
//!
//! # Key invariants
//! - The role set is closed: `user`, `admin`, `superadmin`. Unknown names are
//!   rejected at parse time, never coerced.
//! - Variant order is privilege order; `Superadmin` is the highest role and
//!   the only one permitted to mutate roles.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Closed set of roles, ordered by privilege.
///
/// # Overview
/// Serialized in lowercase on the wire (`"user"`, `"admin"`, `"superadmin"`)
/// to match the directory's stored representation.
///
/// # Security
/// - New users always start as [`Role::User`]; elevation only happens through
///   the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    /// Whether this role may mutate other identities' roles.
    pub fn can_manage_roles(self) -> bool {
        matches!(self, Role::Superadmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role name is outside the closed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Exact-match only; no trimming or case folding. The wire format is
        // lowercase and anything else is a malformed request.
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}
