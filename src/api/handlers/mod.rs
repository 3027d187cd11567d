//! REST endpoint handlers organized by resource.

pub mod access;
pub mod content;
pub mod creator;
pub mod payout;
pub mod purchase;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(purchase::routes())
        .merge(access::routes())
        .merge(content::routes())
        .merge(creator::routes())
        .merge(payout::routes())
}
