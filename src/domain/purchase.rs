//! Purchases: the record that a transaction hash unlocked a content item.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::fee::FeeSplit;
use super::library::{LibraryEntry, access_url};
use super::{Earnings, EarningsId, EarningsStatus, LibraryEntryId, PurchaseId};

/// Source label written on earnings created by a sale.
pub const CONTENT_SALE_SOURCE: &str = "content_sale";

/// Lifecycle state of a purchase.
///
/// The purchase service only ever writes [`PurchaseStatus::Confirmed`]. The
/// other states exist so rows reconciled by other processes are
/// representable, and the access gate refuses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Awaiting confirmation.
    Pending,
    /// Payment accepted; access granted.
    Confirmed,
    /// Payment failed or was reversed.
    Failed,
}

impl PurchaseStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown purchase status: {other}")),
        }
    }
}

/// A validated payment claim in canonical form.
///
/// Wallet address and transaction hash are lowercase; the amount is
/// strictly positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseClaim {
    /// Content the buyer wants to unlock.
    pub content_id: String,
    /// Wallet that will own the access grant.
    pub buyer_address: String,
    /// On-chain transaction the buyer claims paid for the content.
    pub transaction_hash: String,
    /// Claimed amount in platform currency units.
    pub amount: Decimal,
}

/// A purchase row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Purchase identifier.
    pub id: PurchaseId,
    /// Unlocked content.
    pub content_id: String,
    /// Wallet the access is bound to.
    pub buyer_address: String,
    /// Consumed transaction hash, also the access token.
    pub transaction_hash: String,
    /// Gross amount.
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Platform share.
    #[schema(value_type = String)]
    pub platform_fee: Decimal,
    /// Creator share.
    #[schema(value_type = String)]
    pub creator_earnings: Decimal,
    /// Lifecycle state.
    pub status: PurchaseStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Purchase fields returned alongside unlocked content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseSummary {
    /// Purchase identifier.
    pub id: PurchaseId,
    /// Consumed transaction hash.
    pub transaction_hash: String,
    /// Gross amount.
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Purchase> for PurchaseSummary {
    fn from(purchase: &Purchase) -> Self {
        Self {
            id: purchase.id,
            transaction_hash: purchase.transaction_hash.clone(),
            amount: purchase.amount,
            created_at: purchase.created_at,
        }
    }
}

/// The three rows written for one confirmed purchase.
///
/// A ledger store must persist all of them or none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    /// The purchase itself.
    pub purchase: Purchase,
    /// Access grant for the buyer's wallet.
    pub library_entry: LibraryEntry,
    /// Creator share awaiting payout.
    pub earnings: Earnings,
}

impl PurchaseRecord {
    /// Builds the rows for a confirmed purchase of content owned by
    /// `creator_id`.
    #[must_use]
    pub fn confirmed(
        claim: &PurchaseClaim,
        creator_id: &str,
        split: FeeSplit,
        base_url: &str,
    ) -> Self {
        let now = Utc::now();
        let purchase_id = PurchaseId::new();

        let purchase = Purchase {
            id: purchase_id,
            content_id: claim.content_id.clone(),
            buyer_address: claim.buyer_address.clone(),
            transaction_hash: claim.transaction_hash.clone(),
            amount: split.amount,
            platform_fee: split.platform_fee,
            creator_earnings: split.creator_earnings,
            status: PurchaseStatus::Confirmed,
            created_at: now,
        };

        let library_entry = LibraryEntry {
            id: LibraryEntryId::new(),
            wallet_address: claim.buyer_address.clone(),
            content_id: claim.content_id.clone(),
            purchase_id,
            access_url: access_url(base_url, &claim.content_id, &claim.transaction_hash),
            created_at: now,
        };

        let earnings = Earnings {
            id: EarningsId::new(),
            creator_id: creator_id.to_string(),
            purchase_id,
            amount: split.creator_earnings,
            source: CONTENT_SALE_SOURCE.to_string(),
            status: EarningsStatus::PendingPayout,
            paid_at: None,
            created_at: now,
        };

        Self {
            purchase,
            library_entry,
            earnings,
        }
    }
}
