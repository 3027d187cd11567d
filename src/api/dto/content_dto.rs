//! Catalog DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::AmountInput;
use crate::domain::{Content, ContentListing};
use crate::service::ContentSubmission;

/// Query string of `GET /api/content`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContentListQuery {
    /// Category filter. `All` or blank lists every category.
    pub category: Option<String>,
    /// Case-insensitive search over title, description and creator name.
    pub search: Option<String>,
    /// `createdAt` (newest first, default), `price` (cheapest first) or
    /// `title`.
    pub sort_by: Option<String>,
}

/// Response body for `GET /api/content`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentListResponse {
    /// Always `true`.
    pub success: bool,
    /// Matching active content.
    pub content: Vec<ContentListing>,
}

/// Request body for `POST /api/content`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishContentRequest {
    /// Title.
    pub title: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Price, as a decimal string or number.
    #[schema(value_type = Option<String>, example = "0.01")]
    pub price: Option<AmountInput>,
    /// Location of the paid file.
    pub file_url: Option<String>,
    /// Preview image location.
    pub thumbnail_url: Option<String>,
}

impl From<PublishContentRequest> for ContentSubmission {
    fn from(req: PublishContentRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            price: req.price.map(AmountInput::into_text),
            file_url: req.file_url,
            thumbnail_url: req.thumbnail_url,
        }
    }
}

/// Response body for `POST /api/content`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishContentResponse {
    /// Always `true`.
    pub success: bool,
    /// The published item.
    pub content: Content,
}
