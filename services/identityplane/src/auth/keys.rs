//! Signing key generation and loading for session tokens.
//!
//! # Purpose
//! Produce the service's Ed25519 signing key set, either from a configured
//! seed (so restarts keep verifying outstanding sessions) or freshly
//! generated (dev/test, where invalidating sessions on restart is fine).
//!
//! # Key invariants
//! - Keys are always Ed25519 and must remain that way for session tokens.
//! - The private key is a raw 32-byte Ed25519 seed (not PKCS8 DER), and the
//!   public key is derived from that seed to avoid mismatches.
//! - Private key material must never be serialized or logged.
use crate::auth::session::{ServiceSigningKeys, SigningKey};
use anyhow::{Context, Result, bail};
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use jsonwebtoken::Algorithm;
use rand::RngCore;

/// Generate a fresh Ed25519 signing key set.
///
/// # Overview
/// Returns a [`ServiceSigningKeys`] with a single current Ed25519 key and no
/// previous keys. The `kid` is random; it is not a secret and only exists so
/// verifiers can pick the right key during rotation.
pub fn generate_signing_keys() -> Result<ServiceSigningKeys> {
    let mut seed = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut seed);
    Ok(keys_from_seed_bytes(seed))
}

/// Build the signing key set from a hex-encoded 32-byte seed.
///
/// # Errors
/// - Fails when the value is not valid hex or not exactly 32 bytes.
pub fn signing_keys_from_seed(seed_hex: &str) -> Result<ServiceSigningKeys> {
    let bytes = hex::decode(seed_hex.trim()).context("decode session signing seed")?;
    if bytes.len() != 32 {
        bail!("session signing seed must be 32 bytes, got {}", bytes.len());
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&bytes);
    Ok(keys_from_seed_bytes(seed))
}

fn keys_from_seed_bytes(seed: [u8; 32]) -> ServiceSigningKeys {
    // The public key is always derived from the seed so stored material can
    // never disagree with itself.
    let signing_key = Ed25519SigningKey::from_bytes(&seed);
    let public_key = signing_key.verifying_key().to_bytes();

    let mut kid_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut kid_bytes);

    ServiceSigningKeys {
        current: SigningKey {
            kid: hex::encode(kid_bytes),
            alg: Algorithm::EdDSA,
            private_key: seed,
            public_key,
        },
        previous: Vec::new(),
    }
}
