//! In-process ledger used when persistence is disabled and in tests.
//!
//! All tables live behind one [`RwLock`]; every mutation that must be atomic
//! (check-then-insert of a transaction hash, the three rows of a sale, the
//! conditional payout update) happens under a single write guard.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::LedgerStore;
use crate::domain::{
    Content, ContentListing, ContentQuery, ContentSort, Creator, CreatorStats, CreatorSummary,
    Earnings, EarningsId, EarningsStatus, LibraryEntry, LibraryItem, Purchase, PurchaseId,
    PurchaseRecord,
};
use crate::error::MarketError;

#[derive(Debug, Default)]
struct Tables {
    creators: HashMap<String, Creator>,
    content: HashMap<String, Content>,
    purchases: HashMap<PurchaseId, Purchase>,
    purchases_by_hash: HashMap<String, PurchaseId>,
    library: Vec<LibraryEntry>,
    earnings: Vec<Earnings>,
}

impl Tables {
    fn creator_summary(&self, creator_id: &str) -> Option<CreatorSummary> {
        self.creators.get(creator_id).map(CreatorSummary::from)
    }

    fn purchase_count(&self, content_id: &str) -> i64 {
        let count = self
            .purchases
            .values()
            .filter(|p| p.content_id == content_id)
            .count();
        i64::try_from(count).unwrap_or(i64::MAX)
    }
}

/// Row counts of the ledger tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerCounts {
    /// Rows in `purchases`.
    pub purchases: usize,
    /// Rows in `user_library`.
    pub library_entries: usize,
    /// Rows in `earnings`.
    pub earnings: usize,
}

/// [`LedgerStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    tables: RwLock<Tables>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a creator directly, replacing any creator with the same ID.
    pub async fn insert_creator(&self, creator: Creator) {
        let mut tables = self.tables.write().await;
        tables.creators.insert(creator.id.clone(), creator);
    }

    /// Returns the current row counts of the sale tables.
    pub async fn counts(&self) -> LedgerCounts {
        let tables = self.tables.read().await;
        LedgerCounts {
            purchases: tables.purchases.len(),
            library_entries: tables.library.len(),
            earnings: tables.earnings.len(),
        }
    }

    /// Inserts a bare purchase row, bypassing the sale invariants. Used to
    /// model rows written by other processes.
    #[cfg(test)]
    pub(crate) async fn insert_purchase(&self, purchase: Purchase) {
        let mut tables = self.tables.write().await;
        tables
            .purchases_by_hash
            .insert(purchase.transaction_hash.clone(), purchase.id);
        tables.purchases.insert(purchase.id, purchase);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn ping(&self) -> Result<(), MarketError> {
        Ok(())
    }

    async fn find_content(&self, content_id: &str) -> Result<Option<Content>, MarketError> {
        let tables = self.tables.read().await;
        Ok(tables.content.get(content_id).cloned())
    }

    async fn find_content_with_creator(
        &self,
        content_id: &str,
    ) -> Result<Option<(Content, CreatorSummary)>, MarketError> {
        let tables = self.tables.read().await;
        Ok(tables.content.get(content_id).and_then(|content| {
            tables
                .creator_summary(&content.creator_id)
                .map(|creator| (content.clone(), creator))
        }))
    }

    async fn list_content(&self, query: &ContentQuery) -> Result<Vec<ContentListing>, MarketError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<ContentListing> = tables
            .content
            .values()
            .filter(|content| content.is_active)
            .filter_map(|content| {
                let creator = tables.creator_summary(&content.creator_id)?;
                query
                    .matches(content, &creator.username)
                    .then(|| ContentListing {
                        content: content.clone(),
                        purchase_count: tables.purchase_count(&content.id),
                        creator,
                    })
            })
            .collect();

        match query.sort {
            ContentSort::CreatedAt => {
                listings.sort_by(|a, b| b.content.created_at.cmp(&a.content.created_at));
            }
            ContentSort::Price => listings.sort_by(|a, b| a.content.price.cmp(&b.content.price)),
            ContentSort::Title => listings.sort_by(|a, b| b.content.title.cmp(&a.content.title)),
        }
        Ok(listings)
    }

    async fn content_by_creator(&self, creator_id: &str) -> Result<Vec<Content>, MarketError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Content> = tables
            .content
            .values()
            .filter(|c| c.creator_id == creator_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn insert_content(&self, content: &Content) -> Result<(), MarketError> {
        let mut tables = self.tables.write().await;
        if !tables.creators.contains_key(&content.creator_id) {
            return Err(MarketError::CreatorNotFound(content.creator_id.clone()));
        }
        tables.content.insert(content.id.clone(), content.clone());
        Ok(())
    }

    async fn find_creator(&self, creator_id: &str) -> Result<Option<Creator>, MarketError> {
        let tables = self.tables.read().await;
        Ok(tables.creators.get(creator_id).cloned())
    }

    async fn find_or_create_creator(&self, candidate: Creator) -> Result<Creator, MarketError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .creators
            .values()
            .find(|c| c.wallet_address == candidate.wallet_address)
        {
            return Ok(existing.clone());
        }
        tables
            .creators
            .insert(candidate.id.clone(), candidate.clone());
        Ok(candidate)
    }

    async fn creator_stats(&self, creator_id: &str) -> Result<CreatorStats, MarketError> {
        let tables = self.tables.read().await;
        let owned: Vec<&str> = tables
            .content
            .values()
            .filter(|c| c.creator_id == creator_id)
            .map(|c| c.id.as_str())
            .collect();
        let purchase_count = tables
            .purchases
            .values()
            .filter(|p| owned.contains(&p.content_id.as_str()))
            .count();
        Ok(CreatorStats {
            content_count: i64::try_from(owned.len()).unwrap_or(i64::MAX),
            purchase_count: i64::try_from(purchase_count).unwrap_or(i64::MAX),
        })
    }

    async fn find_purchase_by_transaction(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<Purchase>, MarketError> {
        let tables = self.tables.read().await;
        Ok(tables
            .purchases_by_hash
            .get(transaction_hash)
            .and_then(|id| tables.purchases.get(id))
            .cloned())
    }

    async fn record_purchase(&self, record: &PurchaseRecord) -> Result<(), MarketError> {
        let mut tables = self.tables.write().await;
        let purchase = &record.purchase;

        if tables
            .purchases_by_hash
            .contains_key(&purchase.transaction_hash)
        {
            return Err(MarketError::DuplicateTransaction);
        }
        if !tables.content.contains_key(&purchase.content_id) {
            return Err(MarketError::PersistenceError(format!(
                "purchase references unknown content {}",
                purchase.content_id
            )));
        }
        if !tables.creators.contains_key(&record.earnings.creator_id) {
            return Err(MarketError::PersistenceError(format!(
                "earnings reference unknown creator {}",
                record.earnings.creator_id
            )));
        }

        tables
            .purchases_by_hash
            .insert(purchase.transaction_hash.clone(), purchase.id);
        tables.purchases.insert(purchase.id, purchase.clone());
        tables.library.push(record.library_entry.clone());
        tables.earnings.push(record.earnings.clone());
        Ok(())
    }

    async fn library_for_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<LibraryItem>, MarketError> {
        let tables = self.tables.read().await;
        let mut items: Vec<LibraryItem> = tables
            .library
            .iter()
            .filter(|entry| entry.wallet_address.eq_ignore_ascii_case(wallet_address))
            .filter_map(|entry| {
                let content = tables.content.get(&entry.content_id)?;
                let creator = tables.creator_summary(&content.creator_id)?;
                Some(LibraryItem {
                    entry: entry.clone(),
                    content: content.clone(),
                    creator,
                })
            })
            .collect();
        items.sort_by(|a, b| b.entry.created_at.cmp(&a.entry.created_at));
        Ok(items)
    }

    async fn pending_earnings(&self) -> Result<Vec<(Earnings, CreatorSummary)>, MarketError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<(Earnings, CreatorSummary)> = tables
            .earnings
            .iter()
            .filter(|e| e.status == EarningsStatus::PendingPayout)
            .filter_map(|e| {
                tables
                    .creator_summary(&e.creator_id)
                    .map(|creator| (e.clone(), creator))
            })
            .collect();
        rows.sort_by(|a, b| a.0.created_at.cmp(&b.0.created_at));
        Ok(rows)
    }

    async fn mark_earnings_paid(
        &self,
        creator_id: &str,
        earnings_ids: &[EarningsId],
        paid_at: DateTime<Utc>,
    ) -> Result<Vec<EarningsId>, MarketError> {
        let mut tables = self.tables.write().await;
        let mut paid = Vec::new();
        for earning in tables.earnings.iter_mut().filter(|e| {
            e.creator_id == creator_id
                && e.status == EarningsStatus::PendingPayout
                && earnings_ids.contains(&e.id)
        }) {
            earning.status = EarningsStatus::Paid;
            earning.paid_at = Some(paid_at);
            paid.push(earning.id);
        }
        Ok(paid)
    }
}
