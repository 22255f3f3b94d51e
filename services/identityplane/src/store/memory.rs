//! In-memory implementation of the user directory.
//!
//! # Purpose
//! This store implements the [`UserDirectory`] trait entirely in memory using
//! a `HashMap` guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: mutations take the write lock, so
//!   `upsert_default` is trivially atomic per id — two concurrent first
//!   logins for the same subject serialize on the lock and the loser sees
//!   the winner's record.
//! - **No multi-node coordination**: multiple instances each have
//!   independent state. Durable backends get the same guarantee from a
//!   uniqueness constraint plus read-on-conflict.
use super::{StoreError, StoreResult, UserDirectory};
use crate::model::{Role, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory user directory keyed by subject id.
pub struct InMemoryDirectory {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn upsert_default(&self, default_user: User) -> StoreResult<User> {
        // Create-if-absent under the write lock. Holding the lock across the
        // check and the insert is what makes first-login resolution atomic
        // per subject id.
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(&default_user.id) {
            return Ok(existing.clone());
        }
        users.insert(default_user.id.clone(), default_user.clone());
        metrics::counter!("identity_users_created_total").increment(1);
        Ok(default_user)
    }

    async fn set_role(&self, id: &str, role: Role) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(id) else {
            return Err(StoreError::NotFound("user".into()));
        };
        // Total write of the role field only; name/email stay as stored.
        user.role = role;
        Ok(user.clone())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
