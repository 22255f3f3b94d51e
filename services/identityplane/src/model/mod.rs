//! Core identity domain models.
//!
//! # Purpose
//! Defines the user record and the closed role set shared by the auth
//! pipeline, the HTTP API, and the user directory.
pub mod role;
pub mod user;

pub use role::Role;
pub use user::User;
