//! Domain layer: ledger records, identifiers, fee policy and validators.
//!
//! This module holds the marketplace model shared by the services and the
//! ledger stores: content and creators, the purchase/library/earnings rows
//! written for every sale, the 5% platform fee split, and the syntax checks
//! that gate every claim.

pub mod content;
pub mod creator;
pub mod earnings;
pub mod fee;
pub mod ids;
pub mod library;
pub mod purchase;
pub mod validators;

pub use content::{Content, ContentDraft, ContentListing, ContentQuery, ContentSort};
pub use creator::{Creator, CreatorStats, CreatorSummary};
pub use earnings::{CreatorPayout, Earnings, EarningsStatus, PayoutOutcome};
pub use fee::FeeSplit;
pub use ids::{EarningsId, LibraryEntryId, PurchaseId};
pub use library::{LibraryEntry, LibraryItem};
pub use purchase::{Purchase, PurchaseClaim, PurchaseRecord, PurchaseStatus, PurchaseSummary};
