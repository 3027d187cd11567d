//! Service layer: business logic orchestration.
//!
//! Each service is a stateless coordinator over a shared
//! [`LedgerStore`](crate::persistence::LedgerStore):
//!
//! - [`PurchaseService`] turns payment claims into access grants.
//! - [`AccessGate`] redeems access tokens.
//! - [`PayoutService`] settles creator earnings.
//! - [`CatalogService`] publishes and lists content.
//! - [`CreatorService`] authenticates creators and builds their dashboard.

pub mod access_gate;
pub mod catalog_service;
pub mod creator_service;
pub mod payout_service;
pub mod purchase_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use access_gate::{AccessGate, AccessGrant, UnlockedContent};
pub use catalog_service::{CatalogService, ContentSubmission};
pub use creator_service::{CreatorProfile, CreatorService, CreatorSession};
pub use payout_service::{PayoutReceipt, PayoutService};
pub use purchase_service::{PurchaseReceipt, PurchaseService, PurchaseSubmission};

/// Trims `value` and drops it when blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
