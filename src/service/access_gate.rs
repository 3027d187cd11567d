//! Access gate: redeems an access token for the unlocked content.
//!
//! The token is the transaction hash of the purchase. A grant requires, in
//! order: a non-blank token, a purchase recorded under it, that purchase
//! being for the requested content, and the purchase being confirmed. When a
//! requesting wallet is supplied it must be the buyer's.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::non_blank;
use crate::domain::validators::{canonical_hex, is_valid_transaction_hash};
use crate::domain::{Content, CreatorSummary, PurchaseStatus, PurchaseSummary};
use crate::error::MarketError;
use crate::persistence::LedgerStore;

/// Content payload handed to a token holder, including the file location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedContent {
    /// Content identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Listed price.
    #[schema(value_type = String)]
    pub price: Decimal,
    /// Location of the paid file.
    pub file_url: String,
    /// Preview image location.
    pub thumbnail_url: Option<String>,
    /// Content owner.
    pub creator: CreatorSummary,
}

impl UnlockedContent {
    fn new(content: Content, creator: CreatorSummary) -> Self {
        Self {
            id: content.id,
            title: content.title,
            description: content.description,
            category: content.category,
            price: content.price,
            file_url: content.file_url,
            thumbnail_url: content.thumbnail_url,
            creator,
        }
    }
}

/// A successful access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    /// The unlocked content.
    pub content: UnlockedContent,
    /// The purchase backing the grant.
    pub purchase: PurchaseSummary,
}

/// Decides whether a token unlocks a content item.
#[derive(Debug, Clone)]
pub struct AccessGate {
    ledger: Arc<dyn LedgerStore>,
    require_wallet: bool,
}

impl AccessGate {
    /// Creates a new gate. With `require_wallet`, requests that do not name
    /// the requesting wallet are denied.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, require_wallet: bool) -> Self {
        Self {
            ledger,
            require_wallet,
        }
    }

    /// Checks `token` against `content_id` and returns the content on
    /// success.
    ///
    /// # Errors
    ///
    /// - [`MarketError::MissingToken`] if no token was presented.
    /// - [`MarketError::InvalidToken`] if no purchase uses the token.
    /// - [`MarketError::AccessDenied`] if the purchase is for other content,
    ///   or the requesting wallet is not the buyer (or is required and
    ///   absent).
    /// - [`MarketError::PurchaseNotConfirmed`] if the purchase is pending or
    ///   failed.
    /// - [`MarketError::ContentNotFound`] if the content row is gone.
    /// - Store errors from the ledger.
    pub async fn check_access(
        &self,
        content_id: &str,
        token: Option<&str>,
        requester: Option<&str>,
    ) -> Result<AccessGrant, MarketError> {
        let Some(token) = non_blank(token) else {
            return Err(MarketError::MissingToken);
        };

        if !is_valid_transaction_hash(token) {
            tracing::warn!(target: "security", content_id, "malformed access token");
            return Err(MarketError::InvalidToken);
        }

        let Some(purchase) = self
            .ledger
            .find_purchase_by_transaction(&canonical_hex(token))
            .await?
        else {
            tracing::warn!(target: "security", content_id, "unknown access token");
            return Err(MarketError::InvalidToken);
        };

        if purchase.content_id != content_id {
            tracing::warn!(
                target: "security",
                content_id,
                purchased = %purchase.content_id,
                "access token presented for other content"
            );
            return Err(MarketError::AccessDenied(
                "token does not grant access to this content".to_string(),
            ));
        }

        if purchase.status != PurchaseStatus::Confirmed {
            tracing::warn!(
                target: "security",
                content_id,
                status = %purchase.status,
                "access token for unconfirmed purchase"
            );
            return Err(MarketError::PurchaseNotConfirmed);
        }

        match non_blank(requester) {
            Some(wallet) if !wallet.eq_ignore_ascii_case(&purchase.buyer_address) => {
                tracing::warn!(
                    target: "security",
                    content_id,
                    requester = wallet,
                    "access token presented by another wallet"
                );
                return Err(MarketError::AccessDenied(
                    "token belongs to a different wallet".to_string(),
                ));
            }
            None if self.require_wallet => {
                return Err(MarketError::AccessDenied(
                    "walletAddress is required".to_string(),
                ));
            }
            _ => {}
        }

        let Some((content, creator)) = self.ledger.find_content_with_creator(content_id).await?
        else {
            return Err(MarketError::ContentNotFound(content_id.to_string()));
        };

        tracing::debug!(content_id, purchase_id = %purchase.id, "access granted");
        Ok(AccessGrant {
            content: UnlockedContent::new(content, creator),
            purchase: PurchaseSummary::from(&purchase),
        })
    }
}
