//! Creator session tokens and admin credential checks.
//!
//! Creators authenticate with their wallet address and receive an HS256 JWT
//! carrying their creator ID and wallet. Admin routes use a static bearer
//! token from configuration.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::MarketError;

/// Upper bound on token lifetime: one year.
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Claims embedded in a creator token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorClaims {
    /// Authenticated creator.
    pub creator_id: String,
    /// Wallet the creator signed in with (canonical lowercase).
    pub wallet_address: String,
    /// Expiry, Unix seconds.
    pub exp: i64,
    /// Issue time, Unix seconds.
    pub iat: i64,
}

/// Issues and validates creator tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Creates an issuer signing with `secret`. Lifetimes above one year
    /// are capped.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(i64::try_from(ttl_secs.min(MAX_TTL_SECS)).unwrap_or(0)),
        }
    }

    /// Creates an issuer with a secret that only lives as long as the
    /// process. Tokens do not survive a restart.
    #[must_use]
    pub fn ephemeral(ttl_secs: u64) -> Self {
        let secret = format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple());
        Self::new(&secret, ttl_secs)
    }

    /// Issues a token for a creator.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if signing fails.
    pub fn issue(&self, creator_id: &str, wallet_address: &str) -> Result<String, MarketError> {
        let now = Utc::now();
        let claims = CreatorClaims {
            creator_id: creator_id.to_string(),
            wallet_address: wallet_address.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| MarketError::Internal(format!("failed to sign token: {e}")))
    }

    /// Validates a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Unauthorized`] if the token is malformed,
    /// carries a bad signature or has expired.
    pub fn validate(&self, token: &str) -> Result<CreatorClaims, MarketError> {
        decode::<CreatorClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    MarketError::Unauthorized("token expired".to_string())
                }
                _ => MarketError::Unauthorized("invalid token".to_string()),
            })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Compares two secrets without short-circuiting on the first mismatch.
#[must_use]
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
