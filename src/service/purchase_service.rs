//! Purchase service: turns a payment claim into an access grant.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::non_blank;
use crate::domain::fee::{ensure_ledger_amount, parse_positive_amount};
use crate::domain::validators::{canonical_hex, is_valid_transaction_hash, is_valid_wallet_address};
use crate::domain::{FeeSplit, LibraryItem, PurchaseClaim, PurchaseId, PurchaseRecord};
use crate::error::MarketError;
use crate::persistence::LedgerStore;
use crate::verifier::PaymentVerifier;

/// A purchase claim exactly as the client sent it.
///
/// Every field is optional here; presence is the first thing
/// [`PurchaseService::submit_purchase`] checks. `amount` is the textual
/// form of the claimed amount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseSubmission {
    /// Content to unlock.
    pub content_id: Option<String>,
    /// Buying wallet.
    pub buyer_address: Option<String>,
    /// Paying transaction.
    pub transaction_hash: Option<String>,
    /// Claimed amount.
    pub amount: Option<String>,
}

/// Result of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseReceipt {
    /// Purchase identifier.
    pub id: PurchaseId,
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
    /// URL that redeems the access grant.
    pub access_url: String,
}

/// Validates purchase claims and records confirmed purchases.
#[derive(Debug, Clone)]
pub struct PurchaseService {
    ledger: Arc<dyn LedgerStore>,
    verifier: Arc<dyn PaymentVerifier>,
    public_base_url: String,
}

impl PurchaseService {
    /// Creates a new `PurchaseService`.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        verifier: Arc<dyn PaymentVerifier>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            verifier,
            public_base_url: public_base_url.into(),
        }
    }

    /// Validates a claim and records the purchase, its library entry and
    /// the creator's earnings in one atomic write.
    ///
    /// Checks run in a fixed order and stop at the first failure: field
    /// presence and amount, wallet syntax, hash syntax, content existence,
    /// hash reuse, payment verification.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidRequest`] if a field is missing or the amount
    ///   is not a positive decimal.
    /// - [`MarketError::InvalidWalletAddress`] / [`MarketError::InvalidTransactionHash`]
    ///   on malformed identifiers.
    /// - [`MarketError::ContentNotFound`] if the content does not exist.
    /// - [`MarketError::DuplicateTransaction`] if the hash was already used,
    ///   including by a concurrent submission that won the race.
    /// - [`MarketError::PaymentRejected`] / [`MarketError::VerifierUnavailable`]
    ///   from the payment verifier.
    /// - Store errors from the ledger.
    pub async fn submit_purchase(
        &self,
        submission: PurchaseSubmission,
    ) -> Result<PurchaseReceipt, MarketError> {
        let claim = validate_submission(&submission)?;

        let Some(content) = self.ledger.find_content(&claim.content_id).await? else {
            return Err(MarketError::ContentNotFound(claim.content_id));
        };

        if self
            .ledger
            .find_purchase_by_transaction(&claim.transaction_hash)
            .await?
            .is_some()
        {
            log_duplicate(&claim);
            return Err(MarketError::DuplicateTransaction);
        }

        self.verifier.verify(&claim).await?;

        let split = FeeSplit::compute(claim.amount)?;
        let record =
            PurchaseRecord::confirmed(&claim, &content.creator_id, split, &self.public_base_url);

        if let Err(err) = self.ledger.record_purchase(&record).await {
            if matches!(err, MarketError::DuplicateTransaction) {
                log_duplicate(&claim);
            }
            return Err(err);
        }

        tracing::info!(
            purchase_id = %record.purchase.id,
            content_id = %claim.content_id,
            buyer = %claim.buyer_address,
            amount = %split.amount,
            platform_fee = %split.platform_fee,
            "purchase confirmed"
        );

        Ok(PurchaseReceipt {
            id: record.purchase.id,
            transaction_hash: record.purchase.transaction_hash,
            amount: split.amount,
            platform_fee: split.platform_fee,
            creator_earnings: split.creator_earnings,
            access_url: record.library_entry.access_url,
        })
    }

    /// Lists the content unlocked by a wallet, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidRequest`] if the wallet is missing,
    /// [`MarketError::InvalidWalletAddress`] if it is malformed, or a store
    /// error from the ledger.
    pub async fn library_for_wallet(
        &self,
        wallet_address: Option<&str>,
    ) -> Result<Vec<LibraryItem>, MarketError> {
        let Some(wallet) = non_blank(wallet_address) else {
            return Err(MarketError::InvalidRequest(
                "walletAddress is required".to_string(),
            ));
        };
        if !is_valid_wallet_address(wallet) {
            tracing::warn!(target: "security", wallet, "library lookup with invalid wallet");
            return Err(MarketError::InvalidWalletAddress);
        }
        self.ledger.library_for_wallet(&canonical_hex(wallet)).await
    }
}

/// Turns a raw submission into a canonical claim.
fn validate_submission(submission: &PurchaseSubmission) -> Result<PurchaseClaim, MarketError> {
    let (Some(content_id), Some(buyer), Some(hash), Some(amount_raw)) = (
        non_blank(submission.content_id.as_deref()),
        non_blank(submission.buyer_address.as_deref()),
        non_blank(submission.transaction_hash.as_deref()),
        non_blank(submission.amount.as_deref()),
    ) else {
        return Err(MarketError::InvalidRequest(
            "contentId, buyerAddress, transactionHash and amount are required".to_string(),
        ));
    };

    let Some(amount) = parse_positive_amount(amount_raw) else {
        return Err(MarketError::InvalidRequest(
            "amount must be a positive decimal".to_string(),
        ));
    };
    let amount = ensure_ledger_amount(amount, "amount")?;

    if !is_valid_wallet_address(buyer) {
        tracing::warn!(target: "security", buyer, "purchase with invalid wallet address");
        return Err(MarketError::InvalidWalletAddress);
    }

    if !is_valid_transaction_hash(hash) {
        tracing::warn!(target: "security", tx_hash = hash, "purchase with invalid transaction hash");
        return Err(MarketError::InvalidTransactionHash);
    }

    Ok(PurchaseClaim {
        content_id: content_id.to_string(),
        buyer_address: canonical_hex(buyer),
        transaction_hash: canonical_hex(hash),
        amount,
    })
}

fn log_duplicate(claim: &PurchaseClaim) {
    tracing::warn!(
        target: "security",
        tx_hash = %claim.transaction_hash,
        buyer = %claim.buyer_address,
        content_id = %claim.content_id,
        "duplicate transaction hash submitted"
    );
}
