//! Credential extractors for protected routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::auth::{CreatorClaims, bearer_token, secrets_match};
use crate::error::MarketError;

fn presented_bearer(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
}

/// Proof that the request carries the admin bearer token.
///
/// When no admin token is configured every request is refused.
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_token.as_deref() else {
            tracing::warn!(target: "security", path = %parts.uri.path(), "admin route called while admin access is disabled");
            return Err(MarketError::Unauthorized(
                "admin access is disabled".to_string(),
            ));
        };
        let Some(presented) = presented_bearer(parts) else {
            return Err(MarketError::Unauthorized(
                "missing bearer token".to_string(),
            ));
        };
        if !secrets_match(presented, expected) {
            tracing::warn!(target: "security", path = %parts.uri.path(), "invalid admin token");
            return Err(MarketError::Unauthorized("invalid admin token".to_string()));
        }
        Ok(Self)
    }
}

/// Claims of the signed-in creator, taken from a bearer session token.
#[derive(Debug, Clone)]
pub struct CreatorAuth(pub CreatorClaims);

impl FromRequestParts<AppState> for CreatorAuth {
    type Rejection = MarketError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = presented_bearer(parts) else {
            return Err(MarketError::Unauthorized(
                "missing bearer token".to_string(),
            ));
        };
        let claims = state.tokens.validate(token).inspect_err(|_| {
            tracing::warn!(target: "security", path = %parts.uri.path(), "rejected creator token");
        })?;
        Ok(Self(claims))
    }
}
