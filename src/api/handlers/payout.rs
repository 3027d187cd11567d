//! Admin payout handlers.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{PendingPayoutsResponse, ProcessPayoutRequest, ProcessPayoutResponse};
use crate::api::extractors::AdminAccess;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `GET /payouts/pending`: Earnings awaiting payout, per creator.
///
/// # Errors
///
/// Returns [`MarketError::Unauthorized`] without a valid admin token.
#[utoipa::path(
    get,
    path = "/api/payouts/pending",
    tag = "Payouts",
    summary = "List pending payouts",
    description = "Groups every earnings row still pending payout by creator, with the exact total owed. Requires the admin bearer token.",
    security(("admin_token" = [])),
    responses(
        (status = 200, description = "Pending payouts", body = PendingPayoutsResponse),
        (status = 401, description = "Missing or invalid admin token", body = ErrorResponse),
    )
)]
pub async fn list_pending(
    _admin: AdminAccess,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketError> {
    let payouts = state.payouts.list_pending_payouts().await?;
    Ok(Json(PendingPayoutsResponse {
        success: true,
        payouts,
    }))
}

/// `POST /payouts/process`: Mark earnings of a creator as paid.
///
/// # Errors
///
/// Returns [`MarketError`] without a valid admin token, on an invalid
/// request, or when the creator does not exist.
#[utoipa::path(
    post,
    path = "/api/payouts/process",
    tag = "Payouts",
    summary = "Process a payout",
    description = "Moves the listed pending earnings of the creator to paid. Earnings already paid or owned by another creator are reported as skipped, so replays pay nothing twice. Requires the admin bearer token.",
    security(("admin_token" = [])),
    request_body = ProcessPayoutRequest,
    responses(
        (status = 200, description = "Payout processed", body = ProcessPayoutResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid admin token", body = ErrorResponse),
        (status = 404, description = "Creator not found", body = ErrorResponse),
    )
)]
pub async fn process_payout(
    _admin: AdminAccess,
    State(state): State<AppState>,
    payload: Result<Json<ProcessPayoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Json(req) = payload?;
    let receipt = state
        .payouts
        .process_payout(req.creator_id.as_deref(), &req.earnings_ids)
        .await?;
    Ok(Json(ProcessPayoutResponse {
        success: true,
        receipt,
    }))
}

/// Payout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payouts/pending", get(list_pending))
        .route("/payouts/process", post(process_payout))
}
