//! HTTP surface.
//!
//! # Purpose
//! Route handlers, wire types, and the error envelope. Handlers stay thin:
//! they parse the request, call into `auth` and `store`, and translate
//! failures into the shared error body.
pub mod error;
pub mod openapi;
pub mod system;
pub mod types;
pub mod users;

use crate::api::error::{ApiError, api_unauthorized};
use crate::app::AppState;
use crate::auth::session::verify_session;
use axum::http::HeaderMap;

/// Verification leeway for inbound session tokens, in seconds.
const SESSION_LEEWAY_SECONDS: u64 = 30;

/// Pulls the bearer token out of the `Authorization` header.
fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Authenticates a request via its session token and returns the caller's
/// user id.
///
/// # Errors
/// `401` when the header is missing, malformed, or the token fails
/// verification. The token carries identity only; callers that need the
/// caller's current role must read it from the directory.
pub(crate) fn require_session(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = extract_bearer(headers).ok_or_else(|| api_unauthorized("missing session token"))?;
    let claims = verify_session(&state.signing_keys, token, SESSION_LEEWAY_SECONDS)
        .map_err(|err| {
            tracing::debug!(error = %err, "session token verification failed");
            api_unauthorized("invalid session token")
        })?;
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extract_bearer_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Basic abc"),
        );
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer "),
        );
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok"),
        );
        assert_eq!(extract_bearer(&headers), Some("tok"));
    }
}
