//! Purchase handlers: submit a payment claim, list a wallet's library.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{LibraryResponse, PurchaseRequest, PurchaseResponse, WalletQuery};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};

/// `POST /purchase`: Record a purchase and unlock the content.
///
/// # Errors
///
/// Returns [`MarketError`] when the claim fails validation, the content is
/// unknown, the transaction hash was already used, or the payment is
/// rejected.
#[utoipa::path(
    post,
    path = "/api/purchase",
    tag = "Purchases",
    summary = "Submit a purchase",
    description = "Validates a payment claim, consumes its transaction hash and records the purchase, the buyer's library entry and the creator's earnings in one write. The returned `accessUrl` carries the transaction hash as access token.",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchase recorded", body = PurchaseResponse),
        (status = 400, description = "Invalid claim or transaction already processed", body = ErrorResponse),
        (status = 404, description = "Content not found", body = ErrorResponse),
        (status = 422, description = "Payment rejected by the verifier", body = ErrorResponse),
        (status = 503, description = "Ledger or verifier unavailable", body = ErrorResponse),
    )
)]
pub async fn submit_purchase(
    State(state): State<AppState>,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Json(req) = payload?;
    let purchase = state.purchases.submit_purchase(req.into()).await?;
    Ok(Json(PurchaseResponse {
        success: true,
        purchase,
    }))
}

/// `GET /library`: Content unlocked by a wallet.
///
/// # Errors
///
/// Returns [`MarketError`] when the wallet is missing or malformed.
#[utoipa::path(
    get,
    path = "/api/library",
    tag = "Purchases",
    summary = "List a wallet's library",
    description = "Returns the content a wallet has unlocked, newest purchase first, with content and creator details.",
    params(WalletQuery),
    responses(
        (status = 200, description = "Library entries", body = LibraryResponse),
        (status = 400, description = "Missing or invalid wallet address", body = ErrorResponse),
    )
)]
pub async fn get_library(
    State(state): State<AppState>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Query(query) = query?;
    let library = state
        .purchases
        .library_for_wallet(query.wallet_address.as_deref())
        .await?;
    Ok(Json(LibraryResponse {
        success: true,
        library,
    }))
}

/// `GET /purchase`: Alias of `GET /library`.
///
/// # Errors
///
/// See [`get_library`].
#[utoipa::path(
    get,
    path = "/api/purchase",
    tag = "Purchases",
    summary = "List a wallet's purchases",
    description = "Same as `GET /api/library`.",
    params(WalletQuery),
    responses(
        (status = 200, description = "Library entries", body = LibraryResponse),
        (status = 400, description = "Missing or invalid wallet address", body = ErrorResponse),
    )
)]
pub async fn list_purchases(
    state: State<AppState>,
    query: Result<Query<WalletQuery>, QueryRejection>,
) -> Result<impl IntoResponse, MarketError> {
    get_library(state, query).await
}

/// Purchase routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(submit_purchase).get(list_purchases))
        .route("/library", get(get_library))
}
