//! Persistence layer: the marketplace ledger.
//!
//! [`LedgerStore`] is the capability the services depend on. It owns the
//! two invariants that cannot live in application code: transaction hashes
//! are globally unique, and the purchase/library/earnings rows of one sale
//! are written atomically. [`postgres::PostgresLedger`] enforces both with a
//! unique constraint and a database transaction; [`memory::InMemoryLedger`]
//! with a single write lock.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Content, ContentListing, ContentQuery, Creator, CreatorStats, CreatorSummary, Earnings,
    EarningsId, LibraryItem, Purchase, PurchaseRecord,
};
use crate::error::MarketError;

pub use memory::InMemoryLedger;
pub use postgres::PostgresLedger;

/// Durable storage for content, creators, purchases, library entries and
/// earnings.
///
/// Every method may fail with [`MarketError::StoreUnavailable`] when the
/// backing store cannot be reached, or [`MarketError::PersistenceError`] on
/// any other storage failure.
#[async_trait]
pub trait LedgerStore: Send + Sync + fmt::Debug {
    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), MarketError>;

    /// Looks up a content item by ID, active or not.
    async fn find_content(&self, content_id: &str) -> Result<Option<Content>, MarketError>;

    /// Looks up a content item together with its creator.
    async fn find_content_with_creator(
        &self,
        content_id: &str,
    ) -> Result<Option<(Content, CreatorSummary)>, MarketError>;

    /// Lists active content matching `query`, in the query's sort order.
    async fn list_content(&self, query: &ContentQuery) -> Result<Vec<ContentListing>, MarketError>;

    /// Lists every content item of a creator, newest first.
    async fn content_by_creator(&self, creator_id: &str) -> Result<Vec<Content>, MarketError>;

    /// Stores a new content item. Fails with [`MarketError::CreatorNotFound`]
    /// if the owning creator does not exist.
    async fn insert_content(&self, content: &Content) -> Result<(), MarketError>;

    /// Looks up a creator by ID.
    async fn find_creator(&self, creator_id: &str) -> Result<Option<Creator>, MarketError>;

    /// Returns the creator registered for `candidate.wallet_address`,
    /// inserting `candidate` if there is none. Safe under concurrent calls
    /// for the same wallet.
    async fn find_or_create_creator(&self, candidate: Creator) -> Result<Creator, MarketError>;

    /// Counts a creator's content items and sales.
    async fn creator_stats(&self, creator_id: &str) -> Result<CreatorStats, MarketError>;

    /// Looks up the purchase that consumed `transaction_hash`.
    async fn find_purchase_by_transaction(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<Purchase>, MarketError>;

    /// Atomically writes the purchase, library entry and earnings of one
    /// sale.
    ///
    /// Fails with [`MarketError::DuplicateTransaction`], leaving no rows
    /// behind, if the transaction hash was already consumed, including by a
    /// concurrent call that committed first.
    async fn record_purchase(&self, record: &PurchaseRecord) -> Result<(), MarketError>;

    /// Lists a wallet's library entries with content and creator, newest
    /// first.
    async fn library_for_wallet(&self, wallet_address: &str)
    -> Result<Vec<LibraryItem>, MarketError>;

    /// Lists every pending earnings row with its creator, oldest first.
    async fn pending_earnings(&self) -> Result<Vec<(Earnings, CreatorSummary)>, MarketError>;

    /// Marks the given earnings of `creator_id` as paid.
    ///
    /// Only rows that belong to the creator and are still pending change;
    /// the IDs of those rows are returned. Repeating the call is a no-op.
    async fn mark_earnings_paid(
        &self,
        creator_id: &str,
        earnings_ids: &[EarningsId],
        paid_at: DateTime<Utc>,
    ) -> Result<Vec<EarningsId>, MarketError>;
}
