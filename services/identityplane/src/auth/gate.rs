//! Authorization gate for role mutation.
//!
//! # Purpose
//! The single chokepoint through which every role change must pass. Keeping
//! the decision and the delegated write in one place avoids
//! privilege-escalation drift across endpoints.
//!
//! # Key invariants
//! - The actor's role is read from the directory inside this call,
//!   immediately before the decision. Roles cached in sessions, request
//!   payloads, or earlier pipeline stages are never consulted, so a
//!   concurrent revocation of the actor's own role cannot leave a
//!   stale-privilege window.
//! - Only `superadmin` may change a role. `admin` and `user` are denied for
//!   every target and requested role, themselves included. A `superadmin`
//!   may change anyone's role, including demoting another superadmin or
//!   itself; that is recorded product policy, not an oversight.
//! - Denial is side-effect free: the directory is only touched after the
//!   decision permits.
//! - An out-of-set requested role fails `InvalidRole` before the actor is
//!   even looked at.
use crate::model::{Role, User};
use crate::store::{StoreError, UserDirectory};

/// Outcome taxonomy for a role-change request.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("requested role is not valid: {0}")]
    InvalidRole(String),
    #[error("actor is not permitted to change roles")]
    Forbidden,
    #[error("target user not found")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
}

/// Evaluate and, when permitted, apply a role change.
///
/// # Overview
/// Parses the requested role, re-reads the actor's current record from the
/// directory, applies the superadmin-only rule, and delegates the write to
/// [`UserDirectory::set_role`].
///
/// # Arguments
/// - `directory`: Authoritative role directory.
/// - `actor_id`: Directory id of the authenticated caller.
/// - `target_id`: Directory id of the user whose role should change.
/// - `requested_role`: Raw role name from the request body.
///
/// # Returns
/// - `Ok(User)` with the updated target record.
///
/// # Errors
/// - `GateError::InvalidRole` when the name is outside the closed set.
/// - `GateError::Forbidden` when the actor's current role is not
///   `superadmin`, or the actor has no directory record at all.
/// - `GateError::NotFound` when the target id does not exist; nothing is
///   created.
/// - `GateError::Store` for directory failures.
pub async fn authorize_role_change(
    directory: &dyn UserDirectory,
    actor_id: &str,
    target_id: &str,
    requested_role: &str,
) -> Result<User, GateError> {
    // Step 1: Validate the requested role first; a malformed request is a
    // client error regardless of who is asking.
    let role: Role = requested_role
        .parse()
        .map_err(|_| GateError::InvalidRole(requested_role.to_string()))?;

    // Step 2: Read the actor's current role now, not from anything resolved
    // earlier in the request. The session proved identity only.
    let actor = directory
        .get_user(actor_id)
        .await
        .map_err(GateError::Store)?;
    let permitted = actor
        .map(|user| user.role.can_manage_roles())
        .unwrap_or(false);
    if !permitted {
        return Err(GateError::Forbidden);
    }

    // Step 3: Delegate the mutation. `set_role` never creates, so an unknown
    // target surfaces as NotFound here.
    match directory.set_role(target_id, role).await {
        Ok(user) => {
            metrics::counter!("identity_role_changes_total").increment(1);
            Ok(user)
        }
        Err(StoreError::NotFound(_)) => Err(GateError::NotFound),
        Err(err) => Err(GateError::Store(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryDirectory;

    async fn seeded_directory() -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        for (id, role) in [
            ("actor-user", Role::User),
            ("actor-admin", Role::Admin),
            ("actor-super", Role::Superadmin),
            ("target", Role::User),
        ] {
            directory
                .upsert_default(User {
                    id: id.to_string(),
                    name: id.to_string(),
                    email: format!("{id}@ukoolmeow.com"),
                    role: Role::User,
                })
                .await
                .expect("seed");
            if role != Role::User {
                directory.set_role(id, role).await.expect("seed role");
            }
        }
        directory
    }

    #[tokio::test]
    async fn user_and_admin_actors_are_always_denied() {
        let directory = seeded_directory().await;
        for actor in ["actor-user", "actor-admin"] {
            for target in ["target", actor] {
                for requested in ["user", "admin", "superadmin"] {
                    let err = authorize_role_change(&directory, actor, target, requested)
                        .await
                        .expect_err("denied");
                    assert!(matches!(err, GateError::Forbidden), "{actor} -> {target}");
                }
            }
        }
        // Denial must leave the directory untouched.
        let target = directory
            .get_user("target")
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(target.role, Role::User);
    }

    #[tokio::test]
    async fn superadmin_actor_is_permitted_for_every_valid_role() {
        for requested in ["user", "admin", "superadmin"] {
            let directory = seeded_directory().await;
            let updated = authorize_role_change(&directory, "actor-super", "target", requested)
                .await
                .expect("permitted");
            assert_eq!(updated.role.as_str(), requested);
        }
    }

    #[tokio::test]
    async fn superadmin_may_demote_a_superadmin_including_itself() {
        let directory = seeded_directory().await;
        let updated = authorize_role_change(&directory, "actor-super", "actor-super", "user")
            .await
            .expect("self-demotion is policy, not a bug");
        assert_eq!(updated.role, Role::User);
    }

    #[tokio::test]
    async fn out_of_set_role_is_invalid_regardless_of_actor() {
        let directory = seeded_directory().await;
        for actor in ["actor-user", "actor-admin", "actor-super"] {
            let err = authorize_role_change(&directory, actor, "target", "root")
                .await
                .expect_err("invalid role");
            assert!(matches!(err, GateError::InvalidRole(_)));
        }
        let target = directory
            .get_user("target")
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(target.role, Role::User);
    }

    #[tokio::test]
    async fn unknown_target_is_not_found_and_creates_nothing() {
        let directory = seeded_directory().await;
        let err = authorize_role_change(&directory, "actor-super", "ghost", "admin")
            .await
            .expect_err("missing target");
        assert!(matches!(err, GateError::NotFound));
        assert!(
            directory
                .get_user("ghost")
                .await
                .expect("get")
                .is_none()
        );
    }

    #[tokio::test]
    async fn unknown_actor_is_forbidden() {
        let directory = seeded_directory().await;
        let err = authorize_role_change(&directory, "nobody", "target", "admin")
            .await
            .expect_err("unknown actor");
        assert!(matches!(err, GateError::Forbidden));
    }

    #[tokio::test]
    async fn decision_uses_the_current_role_not_a_stale_one() {
        // An actor that was superadmin earlier in the request lifetime but
        // was demoted before the gate runs must be denied.
        let directory = seeded_directory().await;
        directory
            .set_role("actor-super", Role::User)
            .await
            .expect("revoke");
        let err = authorize_role_change(&directory, "actor-super", "target", "admin")
            .await
            .expect_err("revoked actor");
        assert!(matches!(err, GateError::Forbidden));
    }
}
