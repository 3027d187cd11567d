//! Catalog handlers: browse and publish content.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    ContentListQuery, ContentListResponse, PublishContentRequest, PublishContentResponse,
};
use crate::api::extractors::CreatorAuth;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, MarketError};
use crate::service::catalog_service::build_query;

/// `GET /content`: Browse active content.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRequest`] for an unknown `sortBy`.
#[utoipa::path(
    get,
    path = "/api/content",
    tag = "Content",
    summary = "List content",
    description = "Lists active content with creator summary and sales count, optionally filtered by category and a case-insensitive search.",
    params(ContentListQuery),
    responses(
        (status = 200, description = "Matching content", body = ContentListResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
    )
)]
pub async fn list_content(
    State(state): State<AppState>,
    query: Result<Query<ContentListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Query(params) = query?;
    let query = build_query(
        params.category.as_deref(),
        params.search.as_deref(),
        params.sort_by.as_deref(),
    )?;
    let content = state.catalog.list(&query).await?;
    Ok(Json(ContentListResponse {
        success: true,
        content,
    }))
}

/// `POST /content`: Publish content as the signed-in creator.
///
/// # Errors
///
/// Returns [`MarketError`] without a valid creator token or when a field is
/// invalid.
#[utoipa::path(
    post,
    path = "/api/content",
    tag = "Content",
    summary = "Publish content",
    description = "Creates an active content item owned by the creator named in the bearer token.",
    security(("creator_token" = [])),
    request_body = PublishContentRequest,
    responses(
        (status = 201, description = "Content published", body = PublishContentResponse),
        (status = 400, description = "Invalid content fields", body = ErrorResponse),
        (status = 401, description = "Missing or invalid creator token", body = ErrorResponse),
        (status = 404, description = "Creator not found", body = ErrorResponse),
    )
)]
pub async fn publish_content(
    CreatorAuth(claims): CreatorAuth,
    State(state): State<AppState>,
    payload: Result<Json<PublishContentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, MarketError> {
    let Json(req) = payload?;
    let content = state.catalog.publish(&claims.creator_id, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(PublishContentResponse {
            success: true,
            content,
        }),
    ))
}

/// Content routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/content", get(list_content).post(publish_content))
}
