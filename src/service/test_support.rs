//! Fixtures shared by the service tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::{Content, ContentDraft, Creator, PurchaseClaim};
use crate::error::MarketError;
use crate::persistence::{InMemoryLedger, LedgerStore};
use crate::verifier::{PaymentVerifier, TrustingVerifier};

use super::PurchaseService;

pub(crate) const BASE_URL: &str = "http://localhost:3000";

pub(crate) fn wallet(digit: char) -> String {
    format!("0x{}", digit.to_string().repeat(40))
}

pub(crate) fn tx_hash(digit: char) -> String {
    format!("0x{}", digit.to_string().repeat(64))
}

pub(crate) async fn seed_creator(ledger: &InMemoryLedger, wallet_address: &str) -> Creator {
    let creator = Creator::for_wallet(wallet_address);
    ledger.insert_creator(creator.clone()).await;
    creator
}

#[allow(clippy::panic)]
pub(crate) async fn seed_content(
    ledger: &InMemoryLedger,
    creator_id: &str,
    content_id: &str,
    price: Decimal,
) -> Content {
    let mut content = ContentDraft {
        title: format!("Item {content_id}"),
        description: format!("Description of {content_id}"),
        category: "Art".to_string(),
        price,
        file_url: format!("/uploads/{content_id}.bin"),
        thumbnail_url: None,
    }
    .into_content(creator_id);
    content.id = content_id.to_string();
    let Ok(()) = ledger.insert_content(&content).await else {
        panic!("seeding content {content_id} failed");
    };
    content
}

/// Ledger with one creator owning `c1` and `c2`, both priced at 1.0.
pub(crate) async fn marketplace() -> (Arc<InMemoryLedger>, Creator) {
    let ledger = Arc::new(InMemoryLedger::new());
    let creator = seed_creator(&ledger, &wallet('2')).await;
    seed_content(&ledger, &creator.id, "c1", Decimal::ONE).await;
    seed_content(&ledger, &creator.id, "c2", Decimal::ONE).await;
    (ledger, creator)
}

pub(crate) fn purchase_service(ledger: Arc<InMemoryLedger>) -> PurchaseService {
    let store: Arc<dyn LedgerStore> = ledger;
    PurchaseService::new(store, Arc::new(TrustingVerifier), BASE_URL)
}

/// Verifier that yields before answering, so concurrent submissions all
/// pass the duplicate pre-check before any of them writes.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SlowVerifier;

#[async_trait]
impl PaymentVerifier for SlowVerifier {
    async fn verify(&self, _claim: &PurchaseClaim) -> Result<(), MarketError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(())
    }
}

/// Verifier that refuses every claim.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RejectingVerifier;

#[async_trait]
impl PaymentVerifier for RejectingVerifier {
    async fn verify(&self, _claim: &PurchaseClaim) -> Result<(), MarketError> {
        Err(MarketError::PaymentRejected("no such payment".to_string()))
    }
}
