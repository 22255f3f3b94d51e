//! Identity-plane HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, the Google token verifier, and session
//! signing keys, then starts the main API server and the metrics endpoint.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
mod api;
mod app;
mod auth;
mod config;
mod model;
mod observability;
mod store;

use app::{AppState, build_router};
use auth::google::{GoogleIdpConfig, GoogleTokenVerifier};
use auth::keys::{generate_signing_keys, signing_keys_from_seed};
use std::future::Future;
use std::sync::Arc;
use store::{UserDirectory, memory::InMemoryDirectory};

/// Clock skew tolerated when validating upstream ID tokens, in seconds.
const UPSTREAM_CLOCK_SKEW_SECONDS: u64 = 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::IdentityPlaneConfig::from_env_or_yaml().expect("identity plane config");
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(
    config: config::IdentityPlaneConfig,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability(app::SERVICE_NAME);
    let state = build_state(&config)?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, "identity plane listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: &config::IdentityPlaneConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn UserDirectory + Send + Sync> = Arc::new(InMemoryDirectory::new());

    let signing_keys = match &config.session_signing_seed {
        Some(seed) => signing_keys_from_seed(seed)?,
        None => {
            // Sessions from earlier process lifetimes stop verifying after a
            // restart; persistent deployments should pin a seed.
            tracing::warn!("no session signing seed configured; generating an ephemeral key");
            generate_signing_keys()?
        }
    };

    Ok(AppState {
        store,
        idp: match &config.google_jwks_url {
            Some(url) => GoogleIdpConfig {
                jwks_url: url.clone(),
                ..GoogleIdpConfig::for_audiences(config.google_client_ids.clone())
            },
            None => GoogleIdpConfig::for_audiences(config.google_client_ids.clone()),
        },
        verifier: GoogleTokenVerifier::new(config.jwks_ttl, UPSTREAM_CLOCK_SKEW_SECONDS),
        signing_keys: Arc::new(signing_keys),
        session_ttl: config.session_ttl,
    })
}
