use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

// Identity plane configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct IdentityPlaneConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    /// OAuth client IDs accepted as the `aud` claim of Google ID tokens.
    pub google_client_ids: Vec<String>,
    /// Override for the Google JWKS endpoint; tests point this at a local server.
    pub google_jwks_url: Option<String>,
    pub jwks_ttl: Duration,
    pub session_ttl: Duration,
    /// Hex-encoded 32-byte Ed25519 seed; a fresh key is generated when unset.
    pub session_signing_seed: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdentityPlaneConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    google_client_ids: Option<Vec<String>>,
    google_jwks_url: Option<String>,
    jwks_ttl_seconds: Option<u64>,
    session_ttl_seconds: Option<u64>,
    session_signing_seed: Option<String>,
}

impl IdentityPlaneConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("UKOOL_ID_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8443".to_string())
            .parse()
            .with_context(|| "parse UKOOL_ID_BIND")?;
        let metrics_bind = std::env::var("UKOOL_ID_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse UKOOL_ID_METRICS_BIND")?;
        let google_client_ids = std::env::var("UKOOL_ID_GOOGLE_CLIENT_IDS")
            .map(|raw| {
                raw.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        let google_jwks_url = std::env::var("UKOOL_ID_GOOGLE_JWKS_URL").ok();
        let jwks_ttl = std::env::var("UKOOL_ID_JWKS_TTL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .map(Duration::from_secs)
            .with_context(|| "parse UKOOL_ID_JWKS_TTL_SECONDS")?;
        let session_ttl = std::env::var("UKOOL_ID_SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .map(Duration::from_secs)
            .with_context(|| "parse UKOOL_ID_SESSION_TTL_SECONDS")?;
        let session_signing_seed = std::env::var("UKOOL_ID_SESSION_SIGNING_SEED").ok();
        Ok(Self {
            bind_addr,
            metrics_bind,
            google_client_ids,
            google_jwks_url,
            jwks_ttl,
            session_ttl,
            session_signing_seed,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("UKOOL_ID_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read UKOOL_ID_CONFIG: {path}"))?;
            let override_cfg: IdentityPlaneConfigOverride = serde_yaml::from_str(&contents)
                .with_context(|| "parse identity plane config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.google_client_ids {
                config.google_client_ids = value;
            }
            if let Some(value) = override_cfg.google_jwks_url {
                config.google_jwks_url = Some(value);
            }
            if let Some(value) = override_cfg.jwks_ttl_seconds {
                config.jwks_ttl = Duration::from_secs(value);
            }
            if let Some(value) = override_cfg.session_ttl_seconds {
                config.session_ttl = Duration::from_secs(value);
            }
            if let Some(value) = override_cfg.session_signing_seed {
                config.session_signing_seed = Some(value);
            }
        }
        Ok(config)
    }
}
