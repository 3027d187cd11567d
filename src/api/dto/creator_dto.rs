//! Creator sign-in and dashboard DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::service::{CreatorProfile, CreatorSession};

/// Request body for `POST /api/auth/creator`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorAuthRequest {
    /// Creator wallet.
    pub wallet_address: Option<String>,
}

/// Response body for `POST /api/auth/creator`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatorAuthResponse {
    /// Always `true`.
    pub success: bool,
    /// Creator and bearer token.
    #[serde(flatten)]
    pub session: CreatorSession,
}

/// Response body for `GET /api/auth/creator`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatorProfileResponse {
    /// Always `true`.
    pub success: bool,
    /// Creator, content and counters.
    #[serde(flatten)]
    pub profile: CreatorProfile,
}
