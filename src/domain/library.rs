//! Per-wallet library of unlocked content.

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use utoipa::ToSchema;

use super::{Content, CreatorSummary, LibraryEntryId, PurchaseId};

/// Grant stating that `wallet_address` may access `content_id`.
///
/// The grant is bound to the buying wallet only, never to the content in
/// general or to whichever account funded the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    /// Entry identifier.
    pub id: LibraryEntryId,
    /// Wallet holding the grant.
    pub wallet_address: String,
    /// Unlocked content.
    pub content_id: String,
    /// Purchase backing the grant.
    pub purchase_id: PurchaseId,
    /// URL that redeems the grant; embeds the transaction hash as token.
    pub access_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Library entry joined with its content and creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    /// The grant.
    #[serde(flatten)]
    pub entry: LibraryEntry,
    /// Unlocked content.
    pub content: Content,
    /// Content owner.
    pub creator: CreatorSummary,
}

/// Builds the access URL `<base>/content/<content_id>/access?token=<token>`.
///
/// `content_id` is percent-encoded as a single path segment. A base that is
/// not an absolute URL is joined as plain text.
#[must_use]
pub fn access_url(base_url: &str, content_id: &str, token: &str) -> String {
    let mut url = match Url::parse(base_url) {
        Ok(url) if !url.cannot_be_a_base() => url,
        _ => {
            return format!(
                "{}/content/{content_id}/access?token={token}",
                base_url.trim_end_matches('/')
            );
        }
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["content", content_id, "access"]);
    }
    url.query_pairs_mut().append_pair("token", token);
    url.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_url_strips_trailing_slash() {
        assert_eq!(
            access_url("http://localhost:3000/", "c1", "0xabc"),
            "http://localhost:3000/content/c1/access?token=0xabc"
        );
        assert_eq!(
            access_url("http://localhost:3000", "c1", "0xabc"),
            "http://localhost:3000/content/c1/access?token=0xabc"
        );
    }

    #[test]
    fn access_url_keeps_a_base_path() {
        assert_eq!(
            access_url("https://drip.example/market/", "c1", "0xabc"),
            "https://drip.example/market/content/c1/access?token=0xabc"
        );
    }

    #[test]
    fn content_id_is_one_encoded_segment() {
        assert_eq!(
            access_url("http://localhost:3000", "a b/c?d#e", "0xabc"),
            "http://localhost:3000/content/a%20b%2Fc%3Fd%23e/access?token=0xabc"
        );
    }
}
