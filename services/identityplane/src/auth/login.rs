//! Google sign-in endpoint handler.
//!
//! # Purpose
//! Validates Google ID tokens, resolves the internal user record, and mints
//! session tokens. This is the identity-verification-to-session exchange in
//! one place.
use crate::api::error::{
    ApiError, api_internal, api_internal_message, api_unauthorized, api_validation_error,
};
use crate::api::types::{LoginRequest, LoginResponse};
use crate::app::AppState;
use crate::auth::google::GoogleVerifyError;
use crate::auth::resolver;
use crate::auth::session::mint_session;
use axum::Json;
use axum::extract::State;

#[utoipa::path(
    post,
    path = "/api/auth/google",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session issued", body = LoginResponse),
        (status = 400, description = "Missing idToken"),
        (status = 401, description = "Verification failed")
    )
)]
pub async fn login_google(
    State(state): State<AppState>,
    body: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, ApiError> {
    // Missing or empty input is a client error and fails before any network
    // or crypto work.
    let id_token = body
        .and_then(|Json(value)| value.id_token)
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| api_validation_error("missing idToken"))?;

    let subject = match state.verifier.validate(&id_token, &state.idp).await {
        Ok(subject) => subject,
        Err(GoogleVerifyError::MissingToken) => {
            return Err(api_validation_error("missing idToken"));
        }
        Err(err) => {
            // The detailed reason stays in server-side logs. The response is
            // the same 401 for expired, forged, wrong-audience, and every
            // other failure so callers cannot probe which check tripped.
            tracing::warn!(error = %err, "google id token verification failed");
            return Err(api_unauthorized("invalid token"));
        }
    };

    let user = resolver::resolve(state.store.as_ref(), &subject)
        .await
        .map_err(|err| api_internal("failed to resolve user", &err))?;

    let session_token = mint_session(&state.signing_keys, &user.id, state.session_ttl)
        .map_err(|err| {
            tracing::error!(error = %err, "failed to mint session token");
            api_internal_message("failed to mint session")
        })?;

    metrics::counter!("identity_logins_total").increment(1);
    Ok(Json(LoginResponse {
        user,
        session_token,
        expires_in: state.session_ttl.as_secs(),
    }))
}
