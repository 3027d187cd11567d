//! Database rows for the ledger tables and their domain conversions.
//!
//! Joined queries alias creator columns with a `creator_` prefix so the
//! row structs can be flattened into each other without name clashes.
//!
//! `NUMERIC(36, 18)` columns come back with scale 18; conversions normalize
//! them so amounts read from the database print the same as the values
//! that were written.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    Content, ContentListing, Creator, CreatorSummary, Earnings, EarningsId, LibraryEntry,
    LibraryEntryId, LibraryItem, Purchase, PurchaseId,
};
use crate::error::MarketError;

/// A row from the `creators` table.
#[derive(Debug, Clone, FromRow)]
pub struct CreatorRow {
    /// Creator ID.
    pub id: String,
    /// Canonical wallet address.
    pub wallet_address: String,
    /// Display name.
    pub username: String,
    /// Contact email.
    pub email: Option<String>,
    /// Profile text.
    pub bio: Option<String>,
    /// Avatar URL.
    pub avatar: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<CreatorRow> for Creator {
    fn from(row: CreatorRow) -> Self {
        Self {
            id: row.id,
            wallet_address: row.wallet_address,
            username: row.username,
            email: row.email,
            bio: row.bio,
            avatar: row.avatar,
            created_at: row.created_at,
        }
    }
}

/// Creator columns of a joined query, aliased with a `creator_` prefix.
#[derive(Debug, Clone, FromRow)]
pub struct CreatorColumns {
    /// `creators.id`.
    pub creator_id: String,
    /// `creators.username`.
    pub creator_username: String,
    /// `creators.wallet_address`.
    pub creator_wallet_address: String,
    /// `creators.avatar`.
    pub creator_avatar: Option<String>,
}

impl From<CreatorColumns> for CreatorSummary {
    fn from(columns: CreatorColumns) -> Self {
        Self {
            id: columns.creator_id,
            username: columns.creator_username,
            wallet_address: columns.creator_wallet_address,
            avatar: columns.creator_avatar,
        }
    }
}

/// A row from the `content` table. The owner is read through
/// [`CreatorColumns`] when the query joins `creators`.
#[derive(Debug, Clone, FromRow)]
pub struct ContentRow {
    /// Content ID.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Listed price.
    pub price: Decimal,
    /// Paid file location.
    pub file_url: String,
    /// Preview image location.
    pub thumbnail_url: Option<String>,
    /// Whether the item is listed.
    pub is_active: bool,
    /// Publish timestamp.
    pub created_at: DateTime<Utc>,
}

impl ContentRow {
    fn into_content(self, creator_id: String) -> Content {
        Content {
            id: self.id,
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price.normalize(),
            file_url: self.file_url,
            thumbnail_url: self.thumbnail_url,
            creator_id,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// Content joined with its creator.
#[derive(Debug, Clone, FromRow)]
pub struct ContentWithCreatorRow {
    /// Content columns.
    #[sqlx(flatten)]
    pub content: ContentRow,
    /// Creator columns.
    #[sqlx(flatten)]
    pub creator: CreatorColumns,
}

impl From<ContentWithCreatorRow> for (Content, CreatorSummary) {
    fn from(row: ContentWithCreatorRow) -> Self {
        let content = row.content.into_content(row.creator.creator_id.clone());
        (content, row.creator.into())
    }
}

/// Catalog row: content, creator and sales count.
#[derive(Debug, Clone, FromRow)]
pub struct ContentListingRow {
    /// Content columns.
    #[sqlx(flatten)]
    pub content: ContentRow,
    /// Creator columns.
    #[sqlx(flatten)]
    pub creator: CreatorColumns,
    /// `count(*)` of purchases for the item.
    pub purchase_count: i64,
}

impl From<ContentListingRow> for ContentListing {
    fn from(row: ContentListingRow) -> Self {
        let content = row.content.into_content(row.creator.creator_id.clone());
        Self {
            content,
            creator: row.creator.into(),
            purchase_count: row.purchase_count,
        }
    }
}

/// A row from the `purchases` table.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseRow {
    /// Purchase ID.
    pub id: Uuid,
    /// Unlocked content.
    pub content_id: String,
    /// Buying wallet.
    pub buyer_address: String,
    /// Consumed transaction hash.
    pub transaction_hash: String,
    /// Gross amount.
    pub amount: Decimal,
    /// Platform share.
    pub platform_fee: Decimal,
    /// Creator share.
    pub creator_earnings: Decimal,
    /// Status string (`pending`, `confirmed`, `failed`).
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PurchaseRow> for Purchase {
    type Error = MarketError;

    fn try_from(row: PurchaseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PurchaseId::from_uuid(row.id),
            content_id: row.content_id,
            buyer_address: row.buyer_address,
            transaction_hash: row.transaction_hash,
            amount: row.amount.normalize(),
            platform_fee: row.platform_fee.normalize(),
            creator_earnings: row.creator_earnings.normalize(),
            status: row.status.parse().map_err(MarketError::PersistenceError)?,
            created_at: row.created_at,
        })
    }
}

/// A `user_library` row joined with its content and creator.
///
/// Library columns are aliased with a `library_` prefix where they would
/// clash with the content columns.
#[derive(Debug, Clone, FromRow)]
pub struct LibraryItemRow {
    /// `user_library.id`.
    pub library_id: Uuid,
    /// Wallet holding the grant.
    pub wallet_address: String,
    /// Backing purchase.
    pub purchase_id: Uuid,
    /// Redeem URL.
    pub access_url: String,
    /// `user_library.created_at`.
    pub library_created_at: DateTime<Utc>,
    /// Content columns.
    #[sqlx(flatten)]
    pub content: ContentRow,
    /// Creator columns.
    #[sqlx(flatten)]
    pub creator: CreatorColumns,
}

impl From<LibraryItemRow> for LibraryItem {
    fn from(row: LibraryItemRow) -> Self {
        let content = row.content.into_content(row.creator.creator_id.clone());
        Self {
            entry: LibraryEntry {
                id: LibraryEntryId::from_uuid(row.library_id),
                wallet_address: row.wallet_address,
                content_id: content.id.clone(),
                purchase_id: PurchaseId::from_uuid(row.purchase_id),
                access_url: row.access_url,
                created_at: row.library_created_at,
            },
            content,
            creator: row.creator.into(),
        }
    }
}

/// A row from the `earnings` table.
#[derive(Debug, Clone, FromRow)]
pub struct EarningsRow {
    /// Earnings ID.
    pub id: Uuid,
    /// Creator owed the amount.
    pub creator_id: String,
    /// Originating purchase.
    pub purchase_id: Uuid,
    /// Amount owed.
    pub amount: Decimal,
    /// Origin label.
    pub source: String,
    /// Status string (`pending_payout`, `paid`).
    pub status: String,
    /// Payout timestamp.
    pub paid_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<EarningsRow> for Earnings {
    type Error = MarketError;

    fn try_from(row: EarningsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EarningsId::from_uuid(row.id),
            creator_id: row.creator_id,
            purchase_id: PurchaseId::from_uuid(row.purchase_id),
            amount: row.amount.normalize(),
            source: row.source,
            status: row.status.parse().map_err(MarketError::PersistenceError)?,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}

/// A pending earnings row joined with its creator.
#[derive(Debug, Clone, FromRow)]
pub struct PendingEarningsRow {
    /// Earnings columns.
    #[sqlx(flatten)]
    pub earnings: EarningsRow,
    /// Creator username.
    pub creator_username: String,
    /// Creator payout wallet.
    pub creator_wallet_address: String,
    /// Creator avatar.
    pub creator_avatar: Option<String>,
}

impl TryFrom<PendingEarningsRow> for (Earnings, CreatorSummary) {
    type Error = MarketError;

    fn try_from(row: PendingEarningsRow) -> Result<Self, Self::Error> {
        let creator = CreatorSummary {
            id: row.earnings.creator_id.clone(),
            username: row.creator_username,
            wallet_address: row.creator_wallet_address,
            avatar: row.creator_avatar,
        };
        Ok((row.earnings.try_into()?, creator))
    }
}
