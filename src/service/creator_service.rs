//! Creator service: wallet sign-in and the creator dashboard.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::non_blank;
use crate::auth::TokenIssuer;
use crate::domain::validators::{canonical_hex, is_valid_wallet_address};
use crate::domain::{Content, Creator, CreatorStats};
use crate::error::MarketError;
use crate::persistence::LedgerStore;

/// A signed-in creator and their session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSession {
    /// The creator.
    pub creator: Creator,
    /// Bearer token for creator routes.
    pub token: String,
}

/// Creator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorProfile {
    /// The creator.
    pub creator: Creator,
    /// Their content, newest first.
    pub content: Vec<Content>,
    /// Content and sales counters.
    pub stats: CreatorStats,
}

/// Authenticates creators and assembles their dashboard.
#[derive(Debug, Clone)]
pub struct CreatorService {
    ledger: Arc<dyn LedgerStore>,
    tokens: Arc<TokenIssuer>,
}

impl CreatorService {
    /// Creates a new `CreatorService`.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { ledger, tokens }
    }

    /// Signs a creator in by wallet, registering them on first use.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidRequest`] if the wallet is missing.
    /// - [`MarketError::InvalidWalletAddress`] if it is malformed.
    /// - Store errors from the ledger, or [`MarketError::Internal`] if the
    ///   token cannot be signed.
    pub async fn authenticate(
        &self,
        wallet_address: Option<&str>,
    ) -> Result<CreatorSession, MarketError> {
        let Some(wallet) = non_blank(wallet_address) else {
            return Err(MarketError::InvalidRequest(
                "walletAddress is required".to_string(),
            ));
        };
        if !is_valid_wallet_address(wallet) {
            tracing::warn!(target: "security", wallet, "creator sign-in with invalid wallet");
            return Err(MarketError::InvalidWalletAddress);
        }

        let candidate = Creator::for_wallet(&canonical_hex(wallet));
        let creator = self.ledger.find_or_create_creator(candidate).await?;
        let token = self.tokens.issue(&creator.id, &creator.wallet_address)?;

        tracing::info!(creator_id = %creator.id, "creator authenticated");
        Ok(CreatorSession { creator, token })
    }

    /// Loads the dashboard of a creator.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::CreatorNotFound`] if the creator does not
    /// exist, or a store error from the ledger.
    pub async fn profile(&self, creator_id: &str) -> Result<CreatorProfile, MarketError> {
        let Some(creator) = self.ledger.find_creator(creator_id).await? else {
            return Err(MarketError::CreatorNotFound(creator_id.to_string()));
        };
        let content = self.ledger.content_by_creator(creator_id).await?;
        let stats = self.ledger.creator_stats(creator_id).await?;
        Ok(CreatorProfile {
            creator,
            content,
            stats,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryLedger;
    use crate::service::PurchaseSubmission;
    use crate::service::test_support::{marketplace, purchase_service, tx_hash, wallet};

    fn service(ledger: &Arc<InMemoryLedger>, tokens: &Arc<TokenIssuer>) -> CreatorService {
        let store: Arc<dyn LedgerStore> = Arc::clone(ledger) as Arc<dyn LedgerStore>;
        CreatorService::new(store, Arc::clone(tokens))
    }

    #[tokio::test]
    async fn first_sign_in_registers_then_reuses_creator() {
        let ledger = Arc::new(InMemoryLedger::new());
        let tokens = Arc::new(TokenIssuer::new("test-secret", 60));
        let service = service(&ledger, &tokens);

        let upper = format!("0x{}", "AB".repeat(20));
        let Ok(first) = service.authenticate(Some(&upper)).await else {
            panic!("sign-in failed");
        };
        assert_eq!(first.creator.wallet_address, upper.to_lowercase());
        assert_eq!(first.creator.username, "Creator_0xabab");

        let Ok(claims) = tokens.validate(&first.token) else {
            panic!("token should validate");
        };
        assert_eq!(claims.creator_id, first.creator.id);

        let Ok(second) = service.authenticate(Some(&upper.to_lowercase())).await else {
            panic!("sign-in failed");
        };
        assert_eq!(second.creator.id, first.creator.id);
    }

    #[tokio::test]
    async fn sign_in_validates_wallet() {
        let ledger = Arc::new(InMemoryLedger::new());
        let tokens = Arc::new(TokenIssuer::new("test-secret", 60));
        let service = service(&ledger, &tokens);

        assert!(matches!(
            service.authenticate(None).await,
            Err(MarketError::InvalidRequest(_))
        ));
        assert!(matches!(
            service.authenticate(Some("0x12")).await,
            Err(MarketError::InvalidWalletAddress)
        ));
    }

    #[tokio::test]
    async fn profile_counts_content_and_sales() {
        let (ledger, creator) = marketplace().await;
        let Ok(_) = purchase_service(Arc::clone(&ledger))
            .submit_purchase(PurchaseSubmission {
                content_id: Some("c1".to_string()),
                buyer_address: Some(wallet('1')),
                transaction_hash: Some(tx_hash('a')),
                amount: Some("1".to_string()),
            })
            .await
        else {
            panic!("purchase failed");
        };

        let tokens = Arc::new(TokenIssuer::new("test-secret", 60));
        let Ok(profile) = service(&ledger, &tokens).profile(&creator.id).await else {
            panic!("profile failed");
        };
        assert_eq!(profile.content.len(), 2);
        assert_eq!(
            profile.stats,
            CreatorStats {
                content_count: 2,
                purchase_count: 1,
            }
        );

        assert!(matches!(
            service(&ledger, &tokens).profile("ghost").await,
            Err(MarketError::CreatorNotFound(_))
        ));
    }
}
