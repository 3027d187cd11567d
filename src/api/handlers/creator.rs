//! Creator handlers: wallet sign-in and dashboard.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CreatorAuthRequest, CreatorAuthResponse, CreatorProfileResponse};
use crate::api::extractors::CreatorAuth;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `POST /auth/creator`: Sign in with a wallet.
///
/// # Errors
///
/// Returns [`MarketError`] when the wallet is missing or malformed.
#[utoipa::path(
    post,
    path = "/api/auth/creator",
    tag = "Creators",
    summary = "Creator sign-in",
    description = "Finds the creator owning the wallet, registering it on first use, and returns a bearer token for creator routes.",
    request_body = CreatorAuthRequest,
    responses(
        (status = 200, description = "Signed in", body = CreatorAuthResponse),
        (status = 400, description = "Missing or invalid wallet address", body = ErrorResponse),
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<CreatorAuthRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Json(req) = payload?;
    let session = state
        .creators
        .authenticate(req.wallet_address.as_deref())
        .await?;
    Ok(Json(CreatorAuthResponse {
        success: true,
        session,
    }))
}

/// `GET /auth/creator`: Dashboard of the signed-in creator.
///
/// # Errors
///
/// Returns [`MarketError`] without a valid creator token or when the
/// creator no longer exists.
#[utoipa::path(
    get,
    path = "/api/auth/creator",
    tag = "Creators",
    summary = "Creator dashboard",
    description = "Returns the creator named in the bearer token with their content, newest first, and sales counters.",
    security(("creator_token" = [])),
    responses(
        (status = 200, description = "Creator dashboard", body = CreatorProfileResponse),
        (status = 401, description = "Missing or invalid creator token", body = ErrorResponse),
        (status = 404, description = "Creator not found", body = ErrorResponse),
    )
)]
pub async fn get_profile(
    CreatorAuth(claims): CreatorAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketError> {
    let profile = state.creators.profile(&claims.creator_id).await?;
    Ok(Json(CreatorProfileResponse {
        success: true,
        profile,
    }))
}

/// Creator routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/creator", post(sign_in).get(get_profile))
}
