//! Session token minting and verification.
//!
//! # Purpose
//! Define the session claim structure and helpers for signing/verifying the
//! EdDSA tokens handed to clients after a successful Google sign-in.
//!
//! # Architectural role
//! Centralizes session token semantics (claims, issuer/audience, Ed25519
//! signing) and key caching so minting and verification stay consistent.
//!
//! # Callers / consumers
//! - The login handler mints session tokens.
//! - User-facing admin endpoints verify session tokens.
//! - Tests that assert EdDSA-only behavior and rotation handling.
//!
//! # Key invariants
//! - Session tokens are always EdDSA (Ed25519), never RSA/HS variants; the
//!   RS256 path belongs to the upstream provider validator only.
//! - Claims carry identity (`sub`) and lifetime (`iat`/`exp`) but never role
//!   or email. Authorization re-reads the user directory on every request, so
//!   a token is an identity hint, not a privilege assertion.
//! - `exp` is always finite; there is no non-expiring session.
//! - A session is immutable after issue; re-authentication mints a new one.
//!
//! # Concurrency model
//! Thread-safe key cache protected by `RwLock`; safe for concurrent reads and
//! rare writes when keys rotate or are first used.
//!
//! # Security boundary
//! This module handles private key material and must only be used inside the
//! service trust boundary. There is no server-side revocation: sign-out
//! discards the client-held token and the server keeps honoring it until
//! `exp`. That gap is deliberate and documented in the design notes.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::SigningKey as Ed25519SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const ED25519_KEY_LEN: usize = 32;

/// Issuer claim stamped into every session token.
pub const SESSION_ISSUER: &str = "ukoolmeow-identity";
/// Audience claim stamped into every session token.
pub const SESSION_AUDIENCE: &str = "ukoolmeow-api";

/// Claims carried by service-issued session tokens.
///
/// # Overview
/// `sub` is the user directory id of the authenticated subject. Deliberately
/// absent: role, name, email. Those live in the directory and are re-read on
/// every authorization decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Service signing key material.
///
/// # Overview
/// Holds the Ed25519 private seed and public key along with its `kid` and
/// algorithm for token minting.
///
/// # Security
/// - Never serialize or log `private_key`.
/// - `alg` must remain EdDSA to avoid RSA fallback.
#[derive(Debug, Clone)]
pub struct SigningKey {
    pub kid: String,
    pub alg: Algorithm,
    pub private_key: [u8; ED25519_KEY_LEN],
    pub public_key: [u8; ED25519_KEY_LEN],
}

/// Current and previous signing keys for the service.
///
/// # Overview
/// Supports key rotation by keeping a current key for minting and a list of
/// previous keys that still verify outstanding sessions until they expire.
#[derive(Debug, Clone)]
pub struct ServiceSigningKeys {
    pub current: SigningKey,
    pub previous: Vec<SigningKey>,
}

impl ServiceSigningKeys {
    /// Validate the integrity of all signing keys.
    ///
    /// # Errors
    /// - `SessionTokenError::Key` if any key is not EdDSA or its public key
    ///   does not match the private seed.
    pub fn validate(&self) -> Result<(), SessionTokenError> {
        self.current.validate()?;
        for key in &self.previous {
            key.validate()?;
        }
        Ok(())
    }

    /// Iterate over current and previous keys in rotation order.
    ///
    /// The current key comes first; this ordering matters when trying keys
    /// for verification.
    pub fn all_keys(&self) -> impl Iterator<Item = &SigningKey> {
        std::iter::once(&self.current).chain(self.previous.iter())
    }
}

impl SigningKey {
    /// Validate that the signing key is Ed25519 and consistent.
    ///
    /// # Errors
    /// - `SessionTokenError::Key` if the algorithm is not EdDSA or the public
    ///   key does not match the private seed.
    pub fn validate(&self) -> Result<(), SessionTokenError> {
        // Step 1: Enforce the EdDSA-only invariant for session tokens.
        if self.alg != Algorithm::EdDSA {
            return Err(SessionTokenError::Key(format!(
                "invalid session signing algorithm: {:?}",
                self.alg
            )));
        }
        // Step 2: Confirm the public key matches the private seed. This
        // guards against corrupted storage or mismatched rotation data.
        let signing_key = Ed25519SigningKey::from_bytes(&self.private_key);
        let expected = signing_key.verifying_key().to_bytes();
        if expected != self.public_key {
            return Err(SessionTokenError::Key(
                "Ed25519 public key does not match private seed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors produced by session token minting or verification.
#[derive(Debug, thiserror::Error)]
pub enum SessionTokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("key error: {0}")]
    Key(String),
}

/// Mint an EdDSA session token bound to a user id.
///
/// # Overview
/// Builds session claims, enforces key validity, and signs using Ed25519.
/// The `kid` of the current key is embedded in the header so rotation stays
/// deterministic for verifiers.
///
/// # Arguments
/// - `keys`: Service signing keys, including the current key for signing.
/// - `user_id`: Directory id to embed in `sub`.
/// - `ttl`: Finite time-to-live for the session.
///
/// # Errors
/// - `SessionTokenError::Key` if key validation fails.
/// - `SessionTokenError::Jwt` if encoding fails.
pub fn mint_session(
    keys: &ServiceSigningKeys,
    user_id: &str,
    ttl: Duration,
) -> Result<String, SessionTokenError> {
    // Step 1: Validate keys before using them to sign.
    keys.validate()?;
    // Step 2: Build claims with the fixed issuer/audience pair. The `jti`
    // makes each issued session distinct even for back-to-back logins.
    let now = now_epoch_seconds();
    let exp = now + ttl.as_secs() as i64;
    let mut jti_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut jti_bytes);
    let claims = SessionClaims {
        iss: SESSION_ISSUER.to_string(),
        aud: SESSION_AUDIENCE.to_string(),
        sub: user_id.to_string(),
        exp,
        iat: now,
        jti: hex::encode(jti_bytes),
    };

    // Step 3: Use the current key and embed its `kid` in the JWT header.
    let mut header = Header::new(keys.current.alg);
    header.kid = Some(keys.current.kid.clone());
    let encoding_key = key_cache().encoding_key(&keys.current)?;
    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}

/// Verify a session token against the service signing keys.
///
/// # Overview
/// Validates JWT header, issuer, audience, expiry, and signature using the
/// current and previous Ed25519 keys, with `kid`-guided ordering.
///
/// # Errors
/// - `SessionTokenError::Jwt` for JWT validation/decoding failures.
/// - `SessionTokenError::Key` if key validation fails.
pub fn verify_session(
    keys: &ServiceSigningKeys,
    token: &str,
    leeway: u64,
) -> Result<SessionClaims, SessionTokenError> {
    // Step 1: Validate signing keys before verification so non-EdDSA
    // material can never be used to accept a token.
    keys.validate()?;
    // Step 2: Decode the header to order keys by `kid` when present. This
    // speeds verification during rotation and reduces needless failures.
    let header = jsonwebtoken::decode_header(token)?;
    let mut ordered_keys = Vec::new();
    if let Some(kid) = header.kid.as_deref() {
        if let Some(found) = keys.all_keys().find(|entry| entry.kid == kid) {
            ordered_keys.push(found);
            for entry in keys.all_keys() {
                if entry.kid != kid {
                    ordered_keys.push(entry);
                }
            }
        } else {
            ordered_keys.extend(keys.all_keys());
        }
    } else {
        ordered_keys.extend(keys.all_keys());
    }

    // Step 3: Configure strict validation for issuer and audience.
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.set_audience(&[SESSION_AUDIENCE]);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.leeway = leeway;
    let mut last_err = None;
    for key in ordered_keys {
        // Step 4: Attempt verification with each key in order. This is
        // rotation-safe and falls back to older keys when needed.
        let decoding_key = key_cache().decoding_key(key)?;
        match jsonwebtoken::decode::<SessionClaims>(token, &decoding_key, &validation) {
            Ok(token) => return Ok(token.claims),
            Err(err) => last_err = Some(err),
        }
    }
    // If all keys fail, return the last JWT error to preserve context in
    // server-side telemetry. Clients still see a collapsed 401.
    Err(SessionTokenError::Jwt(last_err.unwrap_or_else(|| {
        jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidToken)
    })))
}

fn now_epoch_seconds() -> i64 {
    // Wall-clock time with upstream leeway during verification. If the clock
    // is skewed backwards, clamp to zero to avoid panics.
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_secs() as i64
}

#[derive(Clone, Default)]
struct SessionKeyCache {
    encoding: Arc<RwLock<HashMap<String, EncodingKey>>>,
    decoding: Arc<RwLock<HashMap<String, DecodingKey>>>,
}

impl SessionKeyCache {
    fn encoding_key(&self, key: &SigningKey) -> Result<EncodingKey, SessionTokenError> {
        // Fast path: cache hit under a read lock, avoiding repeated PKCS8
        // conversion for every mint.
        if let Ok(map) = self.encoding.read()
            && let Some(found) = map.get(&key.kid)
        {
            return Ok(found.clone());
        }
        // Convert the raw Ed25519 seed to PKCS8 DER; jsonwebtoken expects
        // that format for EdDSA encoding keys.
        let signing_key = Ed25519SigningKey::from_bytes(&key.private_key);
        let der = signing_key
            .to_pkcs8_der()
            .map_err(|err| SessionTokenError::Key(format!("encode Ed25519 key: {err}")))?;
        let encoding_key = EncodingKey::from_ed_der(der.as_bytes());
        if let Ok(mut map) = self.encoding.write() {
            map.insert(key.kid.clone(), encoding_key.clone());
        }
        Ok(encoding_key)
    }

    fn decoding_key(&self, key: &SigningKey) -> Result<DecodingKey, SessionTokenError> {
        if let Ok(map) = self.decoding.read()
            && let Some(found) = map.get(&key.kid)
        {
            return Ok(found.clone());
        }
        // jsonwebtoken builds EdDSA decoding keys from the JWK `x` component.
        let x = URL_SAFE_NO_PAD.encode(key.public_key);
        let decoding_key = DecodingKey::from_ed_components(&x).map_err(SessionTokenError::Jwt)?;
        if let Ok(mut map) = self.decoding.write() {
            map.insert(key.kid.clone(), decoding_key.clone());
        }
        Ok(decoding_key)
    }
}

static KEY_CACHE: OnceLock<SessionKeyCache> = OnceLock::new();

fn key_cache() -> &'static SessionKeyCache {
    // Global cache avoids rebuilding keys across requests. OnceLock ensures
    // thread-safe, lazy initialization.
    KEY_CACHE.get_or_init(SessionKeyCache::default)
}
