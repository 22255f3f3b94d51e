//! Verified-subject to user-record resolution.
//!
//! # Purpose
//! Maps a provider-attested subject onto the internal user directory,
//! creating a record on first sight and returning the stored record
//! untouched on every later login.
//!
//! # Key invariants
//! - First sight always creates with `role = user`. This is the only
//!   implicit privilege grant in the system and it is the lowest role; no
//!   token claim or client payload can influence it.
//! - Existing records are returned unchanged: role and name assigned through
//!   the admin surface survive subsequent logins. Metadata refresh would be
//!   a separate explicit operation, not a login side effect.
//! - Atomicity per subject id is delegated to
//!   [`UserDirectory::upsert_default`], so two near-simultaneous first
//!   logins cannot create divergent records.
use crate::auth::google::VerifiedSubject;
use crate::model::{Role, User};
use crate::store::{StoreResult, UserDirectory};

/// Resolve a verified subject to its user record, creating one on first
/// sight.
pub async fn resolve(
    directory: &dyn UserDirectory,
    subject: &VerifiedSubject,
) -> StoreResult<User> {
    directory.upsert_default(default_user(subject)).await
}

fn default_user(subject: &VerifiedSubject) -> User {
    // Name falls back from display name to email to a placeholder, matching
    // what the provider actually attests; email may legitimately be absent.
    let name = subject
        .display_name
        .clone()
        .or_else(|| subject.email.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    User {
        id: subject.subject.clone(),
        name,
        email: subject.email.clone().unwrap_or_default(),
        role: Role::User,
    }
}
