//! Access gate DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::PurchaseSummary;
use crate::service::{AccessGrant, UnlockedContent};

/// Query string of `GET /api/content/{id}/access`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AccessQuery {
    /// Access token: the transaction hash of the purchase.
    pub token: Option<String>,
    /// Requesting wallet. Must be the buyer's when given.
    pub wallet_address: Option<String>,
}

/// Response body of a granted access check.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    /// Always `true`.
    pub success: bool,
    /// Always `true`; denials are error responses.
    pub has_access: bool,
    /// The unlocked content, including its file location.
    pub content: UnlockedContent,
    /// The purchase backing the grant.
    pub purchase: PurchaseSummary,
}

impl From<AccessGrant> for AccessResponse {
    fn from(grant: AccessGrant) -> Self {
        Self {
            success: true,
            has_access: true,
            content: grant.content,
            purchase: grant.purchase,
        }
    }
}
