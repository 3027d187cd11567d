//! Payout service: lists what creators are owed and records payouts.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use super::non_blank;
use crate::domain::earnings::group_by_creator;
use crate::domain::{CreatorPayout, CreatorSummary, EarningsId, PayoutOutcome};
use crate::error::MarketError;
use crate::persistence::LedgerStore;

/// Result of [`PayoutService::process_payout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReceipt {
    /// Human-readable summary.
    pub message: String,
    /// Creator paid.
    pub creator: CreatorSummary,
    /// Earnings moved to paid by this call.
    pub paid_earnings_ids: Vec<EarningsId>,
    /// Requested earnings that were already paid or not the creator's.
    pub skipped_earnings_ids: Vec<EarningsId>,
}

/// Settles creator earnings.
#[derive(Debug, Clone)]
pub struct PayoutService {
    ledger: Arc<dyn LedgerStore>,
}

impl PayoutService {
    /// Creates a new `PayoutService`.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Lists pending earnings grouped by creator, the longest-waiting
    /// creator first.
    ///
    /// # Errors
    ///
    /// Returns a store error from the ledger.
    pub async fn list_pending_payouts(&self) -> Result<Vec<CreatorPayout>, MarketError> {
        let rows = self.ledger.pending_earnings().await?;
        Ok(group_by_creator(rows))
    }

    /// Marks the listed earnings of a creator as paid.
    ///
    /// Earnings that are already paid or belong to someone else are
    /// reported as skipped, so replaying the same request pays nothing
    /// twice.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidRequest`] if the creator ID is blank, the ID
    ///   list is empty, or an ID is not a UUID.
    /// - [`MarketError::CreatorNotFound`] if the creator does not exist.
    /// - Store errors from the ledger.
    pub async fn process_payout(
        &self,
        creator_id: Option<&str>,
        earnings_ids: &[String],
    ) -> Result<PayoutReceipt, MarketError> {
        let Some(creator_id) = non_blank(creator_id) else {
            return Err(MarketError::InvalidRequest(
                "creatorId is required".to_string(),
            ));
        };
        if earnings_ids.is_empty() {
            return Err(MarketError::InvalidRequest(
                "earningsIds must not be empty".to_string(),
            ));
        }

        let mut requested: Vec<EarningsId> = Vec::with_capacity(earnings_ids.len());
        for raw in earnings_ids {
            let id: EarningsId = raw.trim().parse().map_err(|_| {
                MarketError::InvalidRequest(format!("invalid earnings id: {raw}"))
            })?;
            if !requested.contains(&id) {
                requested.push(id);
            }
        }

        let Some(creator) = self.ledger.find_creator(creator_id).await? else {
            return Err(MarketError::CreatorNotFound(creator_id.to_string()));
        };

        let paid = self
            .ledger
            .mark_earnings_paid(&creator.id, &requested, Utc::now())
            .await?;
        let outcome = PayoutOutcome {
            skipped: requested
                .iter()
                .filter(|id| !paid.contains(id))
                .copied()
                .collect(),
            paid,
        };

        tracing::info!(
            creator_id = %creator.id,
            paid = outcome.paid.len(),
            skipped = outcome.skipped.len(),
            "payout processed"
        );

        Ok(PayoutReceipt {
            message: format!("Payout processed for {}", creator.username),
            creator: CreatorSummary::from(&creator),
            paid_earnings_ids: outcome.paid,
            skipped_earnings_ids: outcome.skipped,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::persistence::InMemoryLedger;
    use crate::service::PurchaseSubmission;
    use crate::service::test_support::{
        marketplace, purchase_service, seed_content, seed_creator, tx_hash, wallet,
    };

    async fn buy(ledger: &Arc<InMemoryLedger>, content_id: &str, hash: char) {
        let service = purchase_service(Arc::clone(ledger));
        let Ok(_) = service
            .submit_purchase(PurchaseSubmission {
                content_id: Some(content_id.to_string()),
                buyer_address: Some(wallet('1')),
                transaction_hash: Some(tx_hash(hash)),
                amount: Some("1.0".to_string()),
            })
            .await
        else {
            panic!("purchase failed");
        };
    }

    fn payout_service(ledger: &Arc<InMemoryLedger>) -> PayoutService {
        let store: Arc<dyn LedgerStore> = Arc::clone(ledger) as Arc<dyn LedgerStore>;
        PayoutService::new(store)
    }

    #[tokio::test]
    async fn pending_payouts_are_grouped_with_exact_totals() {
        let (ledger, creator) = marketplace().await;
        let other = seed_creator(&ledger, &wallet('4')).await;
        seed_content(&ledger, &other.id, "c3", Decimal::ONE).await;

        buy(&ledger, "c1", 'a').await;
        buy(&ledger, "c3", 'b').await;
        buy(&ledger, "c2", 'c').await;

        let Ok(payouts) = payout_service(&ledger).list_pending_payouts().await else {
            panic!("listing failed");
        };
        assert_eq!(payouts.len(), 2);
        let Some(first) = payouts.first() else {
            panic!("expected a payout group");
        };
        assert_eq!(first.creator.id, creator.id);
        assert_eq!(first.earnings.len(), 2);
        assert_eq!(first.total_amount, Decimal::new(190, 2));
    }

    #[tokio::test]
    async fn payout_is_idempotent() {
        let (ledger, creator) = marketplace().await;
        buy(&ledger, "c1", 'a').await;
        let service = payout_service(&ledger);

        let Ok(pending) = service.list_pending_payouts().await else {
            panic!("listing failed");
        };
        let ids: Vec<String> = pending
            .iter()
            .flat_map(|p| p.earnings.iter().map(|e| e.id.to_string()))
            .collect();

        let Ok(first) = service.process_payout(Some(&creator.id), &ids).await else {
            panic!("first payout failed");
        };
        assert_eq!(first.paid_earnings_ids.len(), 1);
        assert!(first.skipped_earnings_ids.is_empty());
        assert_eq!(first.message, format!("Payout processed for {}", creator.username));

        let Ok(second) = service.process_payout(Some(&creator.id), &ids).await else {
            panic!("second payout failed");
        };
        assert!(second.paid_earnings_ids.is_empty());
        assert_eq!(second.skipped_earnings_ids.len(), 1);

        let Ok(after) = service.list_pending_payouts().await else {
            panic!("listing failed");
        };
        assert!(after.is_empty());
    }

    #[tokio::test]
    async fn foreign_earnings_are_skipped() {
        let (ledger, _) = marketplace().await;
        let other = seed_creator(&ledger, &wallet('4')).await;
        buy(&ledger, "c1", 'a').await;
        let service = payout_service(&ledger);

        let Ok(pending) = service.list_pending_payouts().await else {
            panic!("listing failed");
        };
        let ids: Vec<String> = pending
            .iter()
            .flat_map(|p| p.earnings.iter().map(|e| e.id.to_string()))
            .collect();

        let Ok(receipt) = service.process_payout(Some(&other.id), &ids).await else {
            panic!("payout failed");
        };
        assert!(receipt.paid_earnings_ids.is_empty());
        assert_eq!(receipt.skipped_earnings_ids.len(), 1);

        let Ok(still_pending) = service.list_pending_payouts().await else {
            panic!("listing failed");
        };
        assert_eq!(still_pending.len(), 1);
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected() {
        let (ledger, creator) = marketplace().await;
        let service = payout_service(&ledger);
        let some_id = vec![EarningsId::new().to_string()];

        assert!(matches!(
            service.process_payout(None, &some_id).await,
            Err(MarketError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.process_payout(Some(&creator.id), &[]).await,
            Err(MarketError::InvalidRequest(_))
        ));
        assert!(matches!(
            service
                .process_payout(Some(&creator.id), &["nope".to_string()])
                .await,
            Err(MarketError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.process_payout(Some("ghost"), &some_id).await,
            Err(MarketError::CreatorNotFound(_))
        ));
    }
}
