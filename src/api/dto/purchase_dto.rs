//! Purchase and library DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AmountInput;
use crate::domain::LibraryItem;
use crate::service::{PurchaseReceipt, PurchaseSubmission};

/// Request body for `POST /api/purchase`.
///
/// Every field is optional at the wire level so a missing field surfaces as
/// a structured validation error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Content to unlock.
    #[schema(example = "clx1content")]
    pub content_id: Option<String>,
    /// Buying wallet.
    #[schema(example = "0x52908400098527886e0f7030069857d2e4169ee7")]
    pub buyer_address: Option<String>,
    /// Hash of the paying transaction.
    pub transaction_hash: Option<String>,
    /// Amount paid, as a decimal string or number.
    #[schema(value_type = Option<String>, example = "0.05")]
    pub amount: Option<AmountInput>,
}

impl From<PurchaseRequest> for PurchaseSubmission {
    fn from(req: PurchaseRequest) -> Self {
        Self {
            content_id: req.content_id,
            buyer_address: req.buyer_address,
            transaction_hash: req.transaction_hash,
            amount: req.amount.map(AmountInput::into_text),
        }
    }
}

/// Response body for `POST /api/purchase`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchaseResponse {
    /// Always `true`.
    pub success: bool,
    /// The recorded purchase and its access URL.
    pub purchase: PurchaseReceipt,
}

/// Response body for `GET /api/library`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LibraryResponse {
    /// Always `true`.
    pub success: bool,
    /// Unlocked content, newest first.
    pub library: Vec<LibraryItem>,
}
