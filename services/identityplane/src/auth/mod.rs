//! Authentication and authorization.
//!
//! # Purpose
//! Everything between "a client presented a Google ID token" and "this
//! request may change a role" lives here: upstream token verification,
//! identity resolution, session minting and verification, signing key
//! management, and the role-change gate.
pub mod gate;
pub mod google;
pub mod keys;
pub mod login;
pub mod resolver;
pub mod session;
