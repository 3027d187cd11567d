//! Admin payout DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::CreatorPayout;
use crate::service::PayoutReceipt;

/// Response body for `GET /api/payouts/pending`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingPayoutsResponse {
    /// Always `true`.
    pub success: bool,
    /// Pending earnings per creator, longest-waiting creator first.
    pub payouts: Vec<CreatorPayout>,
}

/// Request body for `POST /api/payouts/process`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPayoutRequest {
    /// Creator being paid.
    pub creator_id: Option<String>,
    /// Earnings to mark as paid.
    #[serde(default)]
    pub earnings_ids: Vec<String>,
}

/// Response body for `POST /api/payouts/process`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProcessPayoutResponse {
    /// Always `true`.
    pub success: bool,
    /// Paid and skipped earnings.
    #[serde(flatten)]
    pub receipt: PayoutReceipt,
}
