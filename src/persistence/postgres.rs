//! PostgreSQL implementation of the ledger.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::LedgerStore;
use super::models::{
    ContentListingRow, ContentWithCreatorRow, CreatorRow, LibraryItemRow, PendingEarningsRow,
    PurchaseRow,
};
use crate::config::DatabaseConfig;
use crate::domain::{
    Content, ContentListing, ContentQuery, ContentSort, Creator, CreatorStats, CreatorSummary,
    Earnings, EarningsId, LibraryItem, Purchase, PurchaseRecord,
};
use crate::error::MarketError;

const CONTENT_COLUMNS: &str = "c.id, c.title, c.description, c.category, c.price, c.file_url, \
     c.thumbnail_url, c.is_active, c.created_at, \
     cr.id AS creator_id, cr.username AS creator_username, \
     cr.wallet_address AS creator_wallet_address, cr.avatar AS creator_avatar";

const CREATOR_COLUMNS: &str = "id, wallet_address, username, email, bio, avatar, created_at";

const PURCHASE_COLUMNS: &str = "id, content_id, buyer_address, transaction_hash, amount, \
     platform_fee, creator_earnings, status, created_at";

/// Maps a sqlx error onto the ledger error taxonomy.
///
/// Connectivity failures become [`MarketError::StoreUnavailable`]; everything
/// else is a [`MarketError::PersistenceError`].
fn store_error(err: sqlx::Error) -> MarketError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => MarketError::StoreUnavailable(err.to_string()),
        other => MarketError::PersistenceError(other.to_string()),
    }
}

/// Escapes `LIKE` wildcards and wraps the needle for a substring match.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const fn order_clause(sort: ContentSort) -> &'static str {
    match sort {
        ContentSort::CreatedAt => "c.created_at DESC",
        ContentSort::Price => "c.price ASC, c.created_at DESC",
        ContentSort::Title => "c.title DESC",
    }
}

/// PostgreSQL-backed ledger using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates a ledger over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool with the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::StoreUnavailable`] if the database cannot be
    /// reached within the connect timeout.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, MarketError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| MarketError::StoreUnavailable(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), MarketError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MarketError::PersistenceError(e.to_string()))
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl LedgerStore for PostgresLedger {
    async fn ping(&self) -> Result<(), MarketError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn find_content(&self, content_id: &str) -> Result<Option<Content>, MarketError> {
        Ok(self
            .find_content_with_creator(content_id)
            .await?
            .map(|(content, _)| content))
    }

    async fn find_content_with_creator(
        &self,
        content_id: &str,
    ) -> Result<Option<(Content, CreatorSummary)>, MarketError> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM content c \
             JOIN creators cr ON cr.id = c.creator_id WHERE c.id = $1"
        );
        let row = sqlx::query_as::<_, ContentWithCreatorRow>(&sql)
            .bind(content_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn list_content(&self, query: &ContentQuery) -> Result<Vec<ContentListing>, MarketError> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS}, \
             (SELECT count(*) FROM purchases p WHERE p.content_id = c.id) AS purchase_count \
             FROM content c JOIN creators cr ON cr.id = c.creator_id \
             WHERE c.is_active \
             AND ($1::text IS NULL OR c.category = $1) \
             AND ($2::text IS NULL OR c.title ILIKE $2 OR c.description ILIKE $2 \
                  OR cr.username ILIKE $2) \
             ORDER BY {}",
            order_clause(query.sort)
        );
        let rows = sqlx::query_as::<_, ContentListingRow>(&sql)
            .bind(query.category.as_deref())
            .bind(query.search.as_deref().map(like_pattern))
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn content_by_creator(&self, creator_id: &str) -> Result<Vec<Content>, MarketError> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM content c \
             JOIN creators cr ON cr.id = c.creator_id \
             WHERE c.creator_id = $1 ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ContentWithCreatorRow>(&sql)
            .bind(creator_id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows
            .into_iter()
            .map(|row| <(Content, CreatorSummary)>::from(row).0)
            .collect())
    }

    async fn insert_content(&self, content: &Content) -> Result<(), MarketError> {
        sqlx::query(
            "INSERT INTO content (id, title, description, category, price, file_url, \
             thumbnail_url, creator_id, is_active, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&content.id)
        .bind(&content.title)
        .bind(&content.description)
        .bind(&content.category)
        .bind(content.price)
        .bind(&content.file_url)
        .bind(content.thumbnail_url.as_deref())
        .bind(&content.creator_id)
        .bind(content.is_active)
        .bind(content.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db) = &e
                && db.is_foreign_key_violation()
            {
                return MarketError::CreatorNotFound(content.creator_id.clone());
            }
            store_error(e)
        })?;
        Ok(())
    }

    async fn find_creator(&self, creator_id: &str) -> Result<Option<Creator>, MarketError> {
        let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE id = $1");
        let row = sqlx::query_as::<_, CreatorRow>(&sql)
            .bind(creator_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.map(Into::into))
    }

    async fn find_or_create_creator(&self, candidate: Creator) -> Result<Creator, MarketError> {
        sqlx::query(
            "INSERT INTO creators (id, wallet_address, username, email, bio, avatar, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (wallet_address) DO NOTHING",
        )
        .bind(&candidate.id)
        .bind(&candidate.wallet_address)
        .bind(&candidate.username)
        .bind(candidate.email.as_deref())
        .bind(candidate.bio.as_deref())
        .bind(candidate.avatar.as_deref())
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        let sql = format!("SELECT {CREATOR_COLUMNS} FROM creators WHERE wallet_address = $1");
        let row = sqlx::query_as::<_, CreatorRow>(&sql)
            .bind(&candidate.wallet_address)
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(row.into())
    }

    async fn creator_stats(&self, creator_id: &str) -> Result<CreatorStats, MarketError> {
        let (content_count, purchase_count) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT \
             (SELECT count(*) FROM content WHERE creator_id = $1), \
             (SELECT count(*) FROM purchases p JOIN content c ON c.id = p.content_id \
              WHERE c.creator_id = $1)",
        )
        .bind(creator_id)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(CreatorStats {
            content_count,
            purchase_count,
        })
    }

    async fn find_purchase_by_transaction(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<Purchase>, MarketError> {
        let sql = format!("SELECT {PURCHASE_COLUMNS} FROM purchases WHERE transaction_hash = $1");
        let row = sqlx::query_as::<_, PurchaseRow>(&sql)
            .bind(transaction_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;
        row.map(Purchase::try_from).transpose()
    }

    async fn record_purchase(&self, record: &PurchaseRecord) -> Result<(), MarketError> {
        let purchase = &record.purchase;
        let entry = &record.library_entry;
        let earnings = &record.earnings;

        // Dropping `tx` without commit rolls back every insert below.
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let inserted = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO purchases (id, content_id, buyer_address, transaction_hash, amount, \
             platform_fee, creator_earnings, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (transaction_hash) DO NOTHING RETURNING id",
        )
        .bind(purchase.id.as_uuid())
        .bind(&purchase.content_id)
        .bind(&purchase.buyer_address)
        .bind(&purchase.transaction_hash)
        .bind(purchase.amount)
        .bind(purchase.platform_fee)
        .bind(purchase.creator_earnings)
        .bind(purchase.status.as_str())
        .bind(purchase.created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(store_error)?;

        if inserted.is_none() {
            return Err(MarketError::DuplicateTransaction);
        }

        sqlx::query(
            "INSERT INTO user_library (id, wallet_address, content_id, purchase_id, access_url, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.wallet_address)
        .bind(&entry.content_id)
        .bind(entry.purchase_id.as_uuid())
        .bind(&entry.access_url)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        sqlx::query(
            "INSERT INTO earnings (id, creator_id, purchase_id, amount, source, status, paid_at, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(earnings.id.as_uuid())
        .bind(&earnings.creator_id)
        .bind(earnings.purchase_id.as_uuid())
        .bind(earnings.amount)
        .bind(&earnings.source)
        .bind(earnings.status.as_str())
        .bind(earnings.paid_at)
        .bind(earnings.created_at)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(())
    }

    async fn library_for_wallet(
        &self,
        wallet_address: &str,
    ) -> Result<Vec<LibraryItem>, MarketError> {
        let sql = format!(
            "SELECT ul.id AS library_id, ul.wallet_address, ul.purchase_id, ul.access_url, \
             ul.created_at AS library_created_at, {CONTENT_COLUMNS} \
             FROM user_library ul \
             JOIN content c ON c.id = ul.content_id \
             JOIN creators cr ON cr.id = c.creator_id \
             WHERE lower(ul.wallet_address) = lower($1) \
             ORDER BY ul.created_at DESC"
        );
        let rows = sqlx::query_as::<_, LibraryItemRow>(&sql)
            .bind(wallet_address)
            .fetch_all(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn pending_earnings(&self) -> Result<Vec<(Earnings, CreatorSummary)>, MarketError> {
        let rows = sqlx::query_as::<_, PendingEarningsRow>(
            "SELECT e.id, e.creator_id, e.purchase_id, e.amount, e.source, e.status, e.paid_at, \
             e.created_at, cr.username AS creator_username, \
             cr.wallet_address AS creator_wallet_address, cr.avatar AS creator_avatar \
             FROM earnings e JOIN creators cr ON cr.id = e.creator_id \
             WHERE e.status = 'pending_payout' \
             ORDER BY e.created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn mark_earnings_paid(
        &self,
        creator_id: &str,
        earnings_ids: &[EarningsId],
        paid_at: DateTime<Utc>,
    ) -> Result<Vec<EarningsId>, MarketError> {
        let ids: Vec<Uuid> = earnings_ids.iter().map(|id| *id.as_uuid()).collect();
        let paid = sqlx::query_scalar::<_, Uuid>(
            "UPDATE earnings SET status = 'paid', paid_at = $3 \
             WHERE id = ANY($1) AND creator_id = $2 AND status = 'pending_payout' \
             RETURNING id",
        )
        .bind(&ids)
        .bind(creator_id)
        .bind(paid_at)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(paid.into_iter().map(EarningsId::from_uuid).collect())
    }
}
