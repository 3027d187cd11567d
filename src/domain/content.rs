//! Paid content items and catalog queries.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use super::CreatorSummary;

/// A published content item.
///
/// `file_url` is never serialized: the file location is only handed out by
/// the access gate to holders of a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    /// Content identifier.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category label (e.g. `"Art"`).
    pub category: String,
    /// Listed price in platform currency units.
    #[schema(value_type = String)]
    pub price: Decimal,
    /// Location of the paid file.
    #[serde(skip_serializing)]
    pub file_url: String,
    /// Preview image location.
    pub thumbnail_url: Option<String>,
    /// Owning creator.
    pub creator_id: String,
    /// Whether the item is listed in the catalog.
    pub is_active: bool,
    /// Publish timestamp.
    pub created_at: DateTime<Utc>,
}

/// Creator-supplied fields for a new content item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDraft {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Listed price.
    pub price: Decimal,
    /// Location of the paid file.
    pub file_url: String,
    /// Preview image location.
    pub thumbnail_url: Option<String>,
}

impl ContentDraft {
    /// Turns the draft into an active content item owned by `creator_id`.
    #[must_use]
    pub fn into_content(self, creator_id: &str) -> Content {
        Content {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: self.description,
            category: self.category,
            price: self.price,
            file_url: self.file_url,
            thumbnail_url: self.thumbnail_url,
            creator_id: creator_id.to_string(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Catalog entry: content plus its creator and sales count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentListing {
    /// The content item.
    #[serde(flatten)]
    pub content: Content,
    /// Public creator view.
    pub creator: CreatorSummary,
    /// Number of purchases recorded for this item.
    pub purchase_count: i64,
}

/// Sort order for catalog listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentSort {
    /// Newest first.
    #[default]
    CreatedAt,
    /// Cheapest first.
    Price,
    /// Title, descending.
    Title,
}

impl FromStr for ContentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "price" => Ok(Self::Price),
            "title" => Ok(Self::Title),
            other => Err(format!("unsupported sortBy: {other}")),
        }
    }
}

/// Filters applied to the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQuery {
    /// Exact category match. `None` lists every category.
    pub category: Option<String>,
    /// Case-insensitive substring over title, description and creator name.
    pub search: Option<String>,
    /// Sort order.
    pub sort: ContentSort,
}

impl ContentQuery {
    /// Returns `true` if `content` passes the category and search filters.
    #[must_use]
    pub fn matches(&self, content: &Content, creator_username: &str) -> bool {
        if let Some(category) = &self.category
            && &content.category != category
        {
            return false;
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                content.title.to_lowercase().contains(&needle)
                    || content.description.to_lowercase().contains(&needle)
                    || creator_username.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Content {
        ContentDraft {
            title: "Sunset Loop".to_string(),
            description: "A looping sunset animation".to_string(),
            category: "Art".to_string(),
            price: Decimal::ONE,
            file_url: "/uploads/sunset.mp4".to_string(),
            thumbnail_url: None,
        }
        .into_content("creator-1")
    }

    #[test]
    fn file_url_is_not_serialized() {
        let json = serde_json::to_value(sample()).unwrap_or_default();
        assert!(json.get("fileUrl").is_none());
        assert_eq!(json.get("price").and_then(|v| v.as_str()), Some("1"));
    }

    #[test]
    fn sort_parses_known_keys() {
        assert_eq!("price".parse::<ContentSort>(), Ok(ContentSort::Price));
        assert_eq!("createdAt".parse::<ContentSort>(), Ok(ContentSort::CreatedAt));
        assert!("rating".parse::<ContentSort>().is_err());
    }

    #[test]
    fn query_filters_by_category_and_search() {
        let content = sample();
        let any = ContentQuery::default();
        assert!(any.matches(&content, "alice"));

        let art = ContentQuery {
            category: Some("Art".to_string()),
            ..ContentQuery::default()
        };
        assert!(art.matches(&content, "alice"));

        let music = ContentQuery {
            category: Some("Music".to_string()),
            ..ContentQuery::default()
        };
        assert!(!music.matches(&content, "alice"));

        let by_creator = ContentQuery {
            search: Some("ALI".to_string()),
            ..ContentQuery::default()
        };
        assert!(by_creator.matches(&content, "alice"));

        let miss = ContentQuery {
            search: Some("podcast".to_string()),
            ..ContentQuery::default()
        };
        assert!(!miss.matches(&content, "alice"));
    }
}
