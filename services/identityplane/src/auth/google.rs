//! Google ID token validation with cached JWKS fetching.
//!
//! # Purpose
//! Validate inbound Google-issued ID tokens against Google's published
//! signing keys, with TTL-based cache refresh and a last-known-good fallback
//! when a refresh fails.
//!
//! # Architectural role
//! Provides the identity-provider boundary for the service: it verifies
//! upstream RS256 tokens before a session token is issued elsewhere.
//!
//! # Callers / consumers
//! - The login endpoint (`/api/auth/google`) validates ID tokens.
//! - Tests that exercise JWKS caching and issuer/audience validation.
//!
//! # Key invariants
//! - Only RS256 is accepted; Google signs ID tokens with RSA keys, and the
//!   service's own session tokens are EdDSA and handled in a separate module,
//!   so nothing else may pass this boundary.
//! - Issuer and audience claims are validated against configuration.
//! - The JWKS cache is time-bounded and refreshed on demand; a failed refresh
//!   falls back to the last fetched key set instead of failing live traffic.
//!
//! # Concurrency model
//! The shared cache is a `DashMap` for concurrent read/write access across
//! async tasks without a global lock.
//!
//! # Security boundary
//! This module is the boundary between external provider tokens and the
//! internal identity system. Callers must collapse its error detail before it
//! reaches a client; the distinct variants exist for server-side logs only.
use jsonwebtoken::jwk::{AlgorithmParameters, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default JWKS endpoint for Google ID token signing keys.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";

/// Issuer values Google uses for ID tokens, both with and without scheme.
pub const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];

/// Identity-provider trust configuration for token validation.
///
/// # Overview
/// Carries the accepted issuers, the OAuth client IDs accepted as audience,
/// and the JWKS endpoint. The JWKS URL is overridable so tests can point the
/// verifier at a local key server.
#[derive(Debug, Clone)]
pub struct GoogleIdpConfig {
    pub issuers: Vec<String>,
    pub audiences: Vec<String>,
    pub jwks_url: String,
}

impl GoogleIdpConfig {
    /// Config for the real Google endpoints with the given client IDs.
    pub fn for_audiences(audiences: Vec<String>) -> Self {
        Self {
            issuers: GOOGLE_ISSUERS.iter().map(|s| s.to_string()).collect(),
            audiences,
            jwks_url: GOOGLE_JWKS_URL.to_string(),
        }
    }
}

/// Provider-attested identity claims extracted from a validated ID token.
///
/// # Overview
/// Minimal payload used to resolve an internal user record. `subject` is
/// guaranteed non-empty and provider-unique; the display name and email are
/// optional claims and may be absent.
#[derive(Debug, Clone)]
pub struct VerifiedSubject {
    pub subject: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

/// Errors returned during ID token validation.
///
/// # Overview
/// The variants exist so server-side logs can tell an expired token apart
/// from a forged one. API handlers must collapse every variant except
/// `MissingToken` into a single unauthorized response so callers cannot probe
/// which check failed.
#[derive(Debug, thiserror::Error)]
pub enum GoogleVerifyError {
    #[error("missing id token")]
    MissingToken,
    #[error("missing subject")]
    MissingSubject,
    #[error("missing key id")]
    MissingKeyId,
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("invalid jwk: {0}")]
    InvalidJwk(String),
    #[error("jwks key not found")]
    JwksKeyNotFound,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid claim: {0}")]
    InvalidClaim(String),
}

#[derive(Debug, Clone)]
struct CachedJwks {
    jwks: JwkSet,
    expires_at: Instant,
}

/// Validator for Google ID tokens with a cached JWKS.
#[derive(Debug, Clone)]
pub struct GoogleTokenVerifier {
    client: reqwest::Client,
    jwks_cache: Arc<DashMap<String, CachedJwks>>,
    jwks_ttl: Duration,
    clock_skew_seconds: u64,
}

impl Default for GoogleTokenVerifier {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600), 60)
    }
}

impl GoogleTokenVerifier {
    /// Create a verifier with an explicit cache TTL and clock skew.
    ///
    /// # Arguments
    /// - `jwks_ttl`: Duration to cache JWKS responses.
    /// - `clock_skew_seconds`: Allowed time skew for `iat`/`exp` validation.
    pub fn new(jwks_ttl: Duration, clock_skew_seconds: u64) -> Self {
        // The HTTP client carries a bounded timeout so a slow key fetch
        // fails the request instead of hanging it; retries are the caller's
        // responsibility and are safe because validation is stateless.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            jwks_cache: Arc::new(DashMap::new()),
            jwks_ttl,
            clock_skew_seconds,
        }
    }

    /// Validate a Google ID token against the configured trust material.
    ///
    /// # Overview
    /// Enforces RS256, resolves the signing key from the cached JWKS
    /// (refreshing once on a `kid` miss), then validates signature, issuer,
    /// audience, expiry, and `iat`.
    ///
    /// # Returns
    /// - `Ok(VerifiedSubject)` with a non-empty subject id and optional
    ///   display name and email.
    ///
    /// # Errors
    /// - `GoogleVerifyError::MissingToken` for an empty token, before any
    ///   network or crypto work.
    /// - Every other variant describes one failed verification step; see the
    ///   type-level note about collapsing them at the API boundary.
    pub async fn validate(
        &self,
        token: &str,
        config: &GoogleIdpConfig,
    ) -> Result<VerifiedSubject, GoogleVerifyError> {
        // Step 1: Reject empty input before touching the network or crypto.
        if token.trim().is_empty() {
            return Err(GoogleVerifyError::MissingToken);
        }

        // Step 2: Check the header algorithm before any heavy work. This
        // keeps EdDSA session tokens and anything else out of this path.
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(GoogleVerifyError::UnsupportedAlgorithm);
        }
        let kid = header.kid.as_deref().ok_or(GoogleVerifyError::MissingKeyId)?;

        // Step 3: Resolve the signing key, retrying the fetch once on a miss.
        // This handles provider key rotation and cache expiry.
        let jwks = self.get_jwks(&config.jwks_url).await?;
        let decoding_key = match find_jwk(&jwks, kid) {
            Some(key) => {
                ensure_rsa_jwk(key)?;
                DecodingKey::from_jwk(key)?
            }
            None => {
                let refreshed = self.refresh_jwks(&config.jwks_url).await?;
                let key = find_jwk(&refreshed, kid).ok_or(GoogleVerifyError::JwksKeyNotFound)?;
                ensure_rsa_jwk(key)?;
                DecodingKey::from_jwk(key)?
            }
        };

        // Step 4: Enforce issuer and audience validation. This prevents
        // tokens minted for another OAuth client from being replayed here.
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&config.issuers);
        validation.set_audience(&config.audiences);
        validation
            .required_spec_claims
            .extend(["iss".to_string(), "aud".to_string()]);
        validation.leeway = self.clock_skew_seconds;

        // Step 5: Verify the token signature and claims.
        let token = decode::<Value>(token, &decoding_key, &validation)?;
        validate_iat(&token.claims, self.clock_skew_seconds)?;

        // Step 6: Extract the subject and optional profile claims.
        let subject = extract_string_claim(&token.claims, "sub")
            .filter(|value| !value.is_empty())
            .ok_or(GoogleVerifyError::MissingSubject)?;
        let display_name = extract_string_claim(&token.claims, "name");
        let email = extract_string_claim(&token.claims, "email");

        Ok(VerifiedSubject {
            subject,
            display_name,
            email,
        })
    }

    async fn get_jwks(&self, jwks_url: &str) -> Result<JwkSet, GoogleVerifyError> {
        // Step 1: Use the cached JWKS when it hasn't expired.
        if let Some(entry) = self.jwks_cache.get(jwks_url)
            && entry.expires_at > Instant::now()
        {
            return Ok(entry.jwks.clone());
        }
        // Step 2: Refresh on miss or expiry, falling back to the stale copy
        // when the provider is unreachable. Serving last-known-good keys
        // keeps live logins working across a transient provider outage; a
        // rotated-away key will simply fail signature validation.
        match self.refresh_jwks(jwks_url).await {
            Ok(jwks) => Ok(jwks),
            Err(err) => {
                if let Some(entry) = self.jwks_cache.get(jwks_url) {
                    tracing::warn!(error = %err, "jwks refresh failed, using last-known-good keys");
                    return Ok(entry.jwks.clone());
                }
                Err(err)
            }
        }
    }

    async fn refresh_jwks(&self, jwks_url: &str) -> Result<JwkSet, GoogleVerifyError> {
        let jwks: JwkSet = self.client.get(jwks_url).send().await?.json().await?;
        self.jwks_cache.insert(
            jwks_url.to_string(),
            CachedJwks {
                jwks: jwks.clone(),
                expires_at: Instant::now() + self.jwks_ttl,
            },
        );
        Ok(jwks)
    }
}

fn ensure_rsa_jwk(jwk: &jsonwebtoken::jwk::Jwk) -> Result<(), GoogleVerifyError> {
    if let Some(key_alg) = jwk.common.key_algorithm
        && key_alg != KeyAlgorithm::RS256
    {
        return Err(GoogleVerifyError::InvalidJwk("alg mismatch".to_string()));
    }
    match &jwk.algorithm {
        AlgorithmParameters::RSA(_) => Ok(()),
        _ => Err(GoogleVerifyError::InvalidJwk("kty mismatch".to_string())),
    }
}

fn find_jwk<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    jwks.keys
        .iter()
        .find(|key| key.common.key_id.as_deref() == Some(kid))
}

fn extract_string_claim(claims: &Value, name: &str) -> Option<String> {
    // Only accept string-valued claims; other types are ignored.
    claims
        .get(name)
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

fn validate_iat(claims: &Value, leeway_seconds: u64) -> Result<(), GoogleVerifyError> {
    // Require `iat` and ensure it is not unreasonably in the future.
    let iat = claims
        .get("iat")
        .and_then(|value| value.as_i64())
        .ok_or_else(|| GoogleVerifyError::InvalidClaim("iat".to_string()))?;
    let now = Utc::now().timestamp();
    let leeway = leeway_seconds as i64;
    if iat > now + leeway {
        return Err(GoogleVerifyError::InvalidClaim("iat in future".to_string()));
    }
    Ok(())
}
