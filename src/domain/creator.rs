//! Creator identity: the owner of content and the payout destination.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// A content creator, identified by the wallet they authenticate with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    /// Creator identifier.
    pub id: String,
    /// Wallet address (canonical lowercase, unique).
    pub wallet_address: String,
    /// Display name.
    pub username: String,
    /// Contact email, private to the creator.
    pub email: Option<String>,
    /// Profile text, private to the creator.
    pub bio: Option<String>,
    /// Avatar image URL.
    pub avatar: Option<String>,
    /// First authentication timestamp.
    pub created_at: DateTime<Utc>,
}

impl Creator {
    /// Builds a fresh creator for a wallet seen for the first time.
    ///
    /// The username defaults to `Creator_` followed by the first six
    /// characters of the wallet address.
    #[must_use]
    pub fn for_wallet(wallet_address: &str) -> Self {
        let prefix: String = wallet_address.chars().take(6).collect();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            wallet_address: wallet_address.to_string(),
            username: format!("Creator_{prefix}"),
            email: None,
            bio: None,
            avatar: None,
            created_at: Utc::now(),
        }
    }
}

/// Public view of a creator, safe to embed in content and payout payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    /// Creator identifier.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Payout wallet address.
    pub wallet_address: String,
    /// Avatar image URL.
    pub avatar: Option<String>,
}

impl From<&Creator> for CreatorSummary {
    fn from(creator: &Creator) -> Self {
        Self {
            id: creator.id.clone(),
            username: creator.username.clone(),
            wallet_address: creator.wallet_address.clone(),
            avatar: creator.avatar.clone(),
        }
    }
}

/// Aggregate counters shown on the creator dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorStats {
    /// Number of content items published.
    pub content_count: i64,
    /// Number of purchases of the creator's content.
    pub purchase_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_username_uses_wallet_prefix() {
        let creator = Creator::for_wallet("0x39d36a64a1e16e52d8353eff82ace7c96502f269");
        assert_eq!(creator.username, "Creator_0x39d3");
        assert!(creator.email.is_none());
    }

    #[test]
    fn summary_omits_private_fields() {
        let mut creator = Creator::for_wallet("0x39d36a64a1e16e52d8353eff82ace7c96502f269");
        creator.email = Some("me@example.com".to_string());
        let summary = CreatorSummary::from(&creator);
        let json = serde_json::to_value(&summary).unwrap_or_default();
        assert!(json.get("email").is_none());
        assert!(json.get("bio").is_none());
        assert_eq!(
            json.get("walletAddress").and_then(|v| v.as_str()),
            Some("0x39d36a64a1e16e52d8353eff82ace7c96502f269")
        );
    }
}
