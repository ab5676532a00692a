//! Bearer token authentication.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use studia_core::{Error, Identity};

use crate::{ApiError, AppState};

/// Authenticated caller. Rejects with 401 when the `Authorization` header is
/// missing, is not a bearer token, or the identity provider refuses it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

/// Token part of a `Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = bearer_token(header).ok_or_else(|| {
            ApiError::Unauthorized("Authorization header must be a bearer token".to_string())
        })?;

        match state.identity.authenticate(token).await {
            Ok(identity) => Ok(AuthUser(identity)),
            Err(Error::Unauthorized(msg)) => {
                tracing::debug!(subsystem = "auth", reason = %msg, "Rejected bearer token");
                Err(ApiError::Unauthorized("Invalid or expired token".to_string()))
            }
            Err(other) => Err(ApiError::from(other)),
        }
    }
}
