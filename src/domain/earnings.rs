//! Creator earnings and payout grouping.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::{CreatorSummary, EarningsId, PurchaseId};

/// Payout state of an earnings row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EarningsStatus {
    /// Owed to the creator, not yet transferred.
    PendingPayout,
    /// Transferred to the creator's wallet.
    Paid,
}

impl EarningsStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PendingPayout => "pending_payout",
            Self::Paid => "paid",
        }
    }
}

impl fmt::Display for EarningsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EarningsStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payout" => Ok(Self::PendingPayout),
            "paid" => Ok(Self::Paid),
            other => Err(format!("unknown earnings status: {other}")),
        }
    }
}

/// Creator share of one purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    /// Earnings identifier.
    pub id: EarningsId,
    /// Creator owed the amount.
    pub creator_id: String,
    /// Purchase that produced the earnings.
    pub purchase_id: PurchaseId,
    /// Amount owed (the purchase's creator earnings).
    #[schema(value_type = String)]
    pub amount: Decimal,
    /// Origin label, e.g. `content_sale`.
    pub source: String,
    /// Payout state.
    pub status: EarningsStatus,
    /// When the payout was recorded.
    pub paid_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Pending earnings of one creator, ready for a batch payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorPayout {
    /// Payout destination.
    pub creator: CreatorSummary,
    /// Sum of `earnings` amounts.
    #[schema(value_type = String)]
    pub total_amount: Decimal,
    /// Constituent earnings, oldest first.
    pub earnings: Vec<Earnings>,
}

/// Result of a payout batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayoutOutcome {
    /// Earnings transitioned to paid by this call.
    pub paid: Vec<EarningsId>,
    /// Requested earnings left untouched (already paid or not the creator's).
    pub skipped: Vec<EarningsId>,
}

/// Groups pending earnings by creator.
///
/// `rows` must be ordered by creation time ascending. Groups appear in the
/// order of their oldest earning and keep that ordering internally, so the
/// creator waiting longest is listed first.
#[must_use]
pub fn group_by_creator(rows: Vec<(Earnings, CreatorSummary)>) -> Vec<CreatorPayout> {
    let mut payouts: Vec<CreatorPayout> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (earning, creator) in rows {
        let slot = match positions.get(&earning.creator_id) {
            Some(&slot) => slot,
            None => {
                positions.insert(earning.creator_id.clone(), payouts.len());
                payouts.push(CreatorPayout {
                    creator,
                    total_amount: Decimal::ZERO,
                    earnings: Vec::new(),
                });
                payouts.len() - 1
            }
        };
        if let Some(payout) = payouts.get_mut(slot) {
            payout.total_amount += earning.amount;
            payout.earnings.push(earning);
        }
    }

    payouts
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn creator(id: &str) -> CreatorSummary {
        CreatorSummary {
            id: id.to_string(),
            username: format!("user_{id}"),
            wallet_address: format!("0x{}", "2".repeat(40)),
            avatar: None,
        }
    }

    fn earning(creator_id: &str, amount: Decimal, age_minutes: i64) -> Earnings {
        Earnings {
            id: EarningsId::new(),
            creator_id: creator_id.to_string(),
            purchase_id: PurchaseId::new(),
            amount,
            source: "content_sale".to_string(),
            status: EarningsStatus::PendingPayout,
            paid_at: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[test]
    fn groups_preserve_oldest_first_order() {
        let rows = vec![
            (earning("b", Decimal::new(95, 2), 30), creator("b")),
            (earning("a", Decimal::new(190, 2), 20), creator("a")),
            (earning("b", Decimal::new(95, 2), 10), creator("b")),
        ];
        let payouts = group_by_creator(rows);

        assert_eq!(payouts.len(), 2);
        let first = payouts.first().map(|p| (p.creator.id.as_str(), p.total_amount));
        assert_eq!(first, Some(("b", Decimal::new(190, 2))));
        let second = payouts.get(1).map(|p| (p.creator.id.as_str(), p.earnings.len()));
        assert_eq!(second, Some(("a", 1)));
    }

    #[test]
    fn empty_input_gives_no_payouts() {
        assert!(group_by_creator(Vec::new()).is_empty());
    }

    #[test]
    fn status_parses_database_values() {
        assert_eq!("paid".parse::<EarningsStatus>(), Ok(EarningsStatus::Paid));
        assert_eq!(
            "pending_payout".parse::<EarningsStatus>(),
            Ok(EarningsStatus::PendingPayout)
        );
        assert!("queued".parse::<EarningsStatus>().is_err());
    }
}
