//! Access gate handler: redeem an access token for the paid content.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{AccessQuery, AccessResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `GET /content/{id}/access`: Check an access token.
///
/// # Errors
///
/// Returns [`MarketError`] when the token is missing or unknown, belongs to
/// other content or another wallet, or backs an unconfirmed purchase.
#[utoipa::path(
    get,
    path = "/api/content/{id}/access",
    tag = "Access",
    summary = "Check content access",
    description = "Resolves the purchase behind the token and, if it is a confirmed purchase of this content, returns the content including its file location. When `walletAddress` is given it must be the buyer's.",
    params(
        ("id" = String, Path, description = "Content ID"),
        AccessQuery,
    ),
    responses(
        (status = 200, description = "Access granted", body = AccessResponse),
        (status = 400, description = "Token missing", body = ErrorResponse),
        (status = 403, description = "Token does not grant access", body = ErrorResponse),
        (status = 404, description = "Unknown token", body = ErrorResponse),
    )
)]
pub async fn check_access(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
    query: Result<Query<AccessQuery>, QueryRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Query(query) = query?;
    let grant = state
        .access
        .check_access(
            &content_id,
            query.token.as_deref(),
            query.wallet_address.as_deref(),
        )
        .await?;
    Ok(Json(AccessResponse::from(grant)))
}

/// Access routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/content/{id}/access", get(check_access))
}
