//! User directory storage abstraction.
//!
//! # Purpose
//! The directory is the durable, authoritative mapping from subject id to
//! [`User`] (and therefore to role). Everything else in the service treats
//! user records as snapshots derived from this store.
//!
//! # Key invariants
//! - `upsert_default` is atomic per subject id: concurrent calls for a
//!   never-seen id must produce exactly one record. Durable backends are
//!   expected to enforce a uniqueness constraint on the id and resolve a
//!   write conflict by re-reading and returning the existing record.
//! - `set_role` never creates a record; an unknown id is `NotFound`.
//! - `set_role` writes the role field only; name and email are not touched
//!   through this path.
use crate::model::{Role, User};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable mapping from subject id to user record.
///
/// Implementations back onto an external key-value/document store; the
/// in-memory implementation exists for development and tests.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Load a user by subject id. `Ok(None)` when the id has never been seen.
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Atomic create-if-absent. When `id` is unseen, stores `default_user`
    /// and returns it; otherwise returns the stored record unchanged. The
    /// stored record's role and name are never overwritten by this call.
    async fn upsert_default(&self, default_user: User) -> StoreResult<User>;

    /// Overwrite the role field of an existing record. Fails `NotFound` for
    /// unknown ids; never creates.
    async fn set_role(&self, id: &str, role: Role) -> StoreResult<User>;

    /// All known users, for the admin surface.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
