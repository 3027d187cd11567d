//! Catalog service: content publishing and browsing.

use std::sync::Arc;

use super::non_blank;
use crate::domain::fee::{ensure_ledger_amount, parse_positive_amount};
use crate::domain::{Content, ContentDraft, ContentListing, ContentQuery, ContentSort};
use crate::error::MarketError;
use crate::persistence::LedgerStore;

/// Category value that disables the category filter.
pub const ALL_CATEGORIES: &str = "All";

/// Content fields as submitted by a creator. `price` is textual.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentSubmission {
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Listed price.
    pub price: Option<String>,
    /// Location of the paid file.
    pub file_url: Option<String>,
    /// Preview image location.
    pub thumbnail_url: Option<String>,
}

impl ContentSubmission {
    fn into_draft(self) -> Result<ContentDraft, MarketError> {
        let required = |value: Option<String>, field: &str| {
            non_blank(value.as_deref())
                .map(str::to_string)
                .ok_or_else(|| MarketError::InvalidRequest(format!("{field} is required")))
        };
        let title = required(self.title, "title")?;
        let description = required(self.description, "description")?;
        let category = required(self.category, "category")?;
        let file_url = required(self.file_url, "fileUrl")?;
        let price = non_blank(self.price.as_deref())
            .and_then(parse_positive_amount)
            .ok_or_else(|| {
                MarketError::InvalidRequest("price must be a positive decimal".to_string())
            })?;
        let price = ensure_ledger_amount(price, "price")?;

        Ok(ContentDraft {
            title,
            description,
            category,
            price,
            file_url,
            thumbnail_url: non_blank(self.thumbnail_url.as_deref()).map(str::to_string),
        })
    }
}

/// Builds a catalog query from raw query-string values.
///
/// A blank category or `All` lists every category; a blank search is no
/// search.
///
/// # Errors
///
/// Returns [`MarketError::InvalidRequest`] for an unknown `sortBy`.
pub fn build_query(
    category: Option<&str>,
    search: Option<&str>,
    sort_by: Option<&str>,
) -> Result<ContentQuery, MarketError> {
    let sort = match non_blank(sort_by) {
        Some(raw) => raw.parse::<ContentSort>().map_err(MarketError::InvalidRequest)?,
        None => ContentSort::default(),
    };
    Ok(ContentQuery {
        category: non_blank(category)
            .filter(|c| *c != ALL_CATEGORIES)
            .map(str::to_string),
        search: non_blank(search).map(str::to_string),
        sort,
    })
}

/// Publishes and lists content.
#[derive(Debug, Clone)]
pub struct CatalogService {
    ledger: Arc<dyn LedgerStore>,
}

impl CatalogService {
    /// Creates a new `CatalogService`.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self { ledger }
    }

    /// Lists active content matching `query`.
    ///
    /// # Errors
    ///
    /// Returns a store error from the ledger.
    pub async fn list(&self, query: &ContentQuery) -> Result<Vec<ContentListing>, MarketError> {
        self.ledger.list_content(query).await
    }

    /// Publishes a new active content item owned by `creator_id`.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidRequest`] if a required field is blank or
    ///   the price is not a positive decimal.
    /// - [`MarketError::CreatorNotFound`] if the creator does not exist.
    /// - Store errors from the ledger.
    pub async fn publish(
        &self,
        creator_id: &str,
        submission: ContentSubmission,
    ) -> Result<Content, MarketError> {
        let draft = submission.into_draft()?;
        if self.ledger.find_creator(creator_id).await?.is_none() {
            return Err(MarketError::CreatorNotFound(creator_id.to_string()));
        }
        let content = draft.into_content(creator_id);
        self.ledger.insert_content(&content).await?;
        tracing::info!(content_id = %content.id, creator_id, price = %content.price, "content published");
        Ok(content)
    }
}
