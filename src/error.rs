//! Marketplace error types with HTTP status code mapping.
//!
//! [`MarketError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code, a numeric code and a stable reason
//! string so clients can branch on the failure without parsing messages.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned to clients for failures that are not their fault.
const GENERIC_FAILURE: &str = "operation failed";

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2101,
///     "reason": "DuplicateTransaction",
///     "message": "transaction already processed"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, reason and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`MarketError`]).
    pub code: u32,
    /// Stable, machine-readable reason (the variant name).
    pub reason: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// Broad failure category, used to decide retry and logging behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input. The caller must fix and resubmit.
    Validation,
    /// Content, token or creator absent.
    NotFound,
    /// Transaction hash already consumed.
    Conflict,
    /// Content/token mismatch, unconfirmed purchase or missing credentials.
    Authorization,
    /// Store or verifier unreachable. Safe to retry with backoff.
    DependencyUnavailable,
    /// Client exceeded its request budget.
    RateLimited,
    /// Anything unexpected. Detail stays in server logs.
    Internal,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status               |
/// |-----------|-----------------------|---------------------------|
/// | 1000–1999 | Validation            | 400 Bad Request           |
/// | 2000–2099 | Not Found             | 404 Not Found             |
/// | 2100–2199 | Conflict              | 400 Bad Request           |
/// | 3000–3999 | Authorization         | 401 / 403                 |
/// | 4000–4999 | Payment / throttling  | 422 / 429                 |
/// | 5000–5999 | Server / dependencies | 500 / 503                 |
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Request validation failed (missing field, malformed amount, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Wallet address is not `0x` followed by 40 hex characters.
    #[error("invalid wallet address format")]
    InvalidWalletAddress,

    /// Transaction hash is not `0x` followed by 64 hex characters.
    #[error("invalid transaction hash format")]
    InvalidTransactionHash,

    /// Access check was attempted without a token.
    #[error("access token required")]
    MissingToken,

    /// Content with the given ID does not exist.
    #[error("content not found: {0}")]
    ContentNotFound(String),

    /// No purchase matches the presented access token.
    #[error("invalid access token")]
    InvalidToken,

    /// Creator with the given ID does not exist.
    #[error("creator not found: {0}")]
    CreatorNotFound(String),

    /// The transaction hash has already been consumed by a purchase.
    #[error("transaction already processed")]
    DuplicateTransaction,

    /// The token does not grant access to the requested content.
    #[error("content access denied: {0}")]
    AccessDenied(String),

    /// The purchase behind the token is not in the confirmed state.
    #[error("purchase not confirmed")]
    PurchaseNotConfirmed,

    /// Missing or invalid credentials for a protected route.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The payment verifier refused the claimed transaction.
    #[error("payment rejected: {0}")]
    PaymentRejected(String),

    /// Client exceeded rate limit.
    #[error("rate limit exceeded; retry after {retry_after_ms} ms")]
    RateLimited {
        /// Milliseconds until the client may retry.
        retry_after_ms: u64,
    },

    /// The ledger store could not be reached.
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(String),

    /// The payment verifier backend could not be reached.
    #[error("payment verifier unavailable: {0}")]
    VerifierUnavailable(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidWalletAddress => 1002,
            Self::InvalidTransactionHash => 1003,
            Self::MissingToken => 1004,
            Self::ContentNotFound(_) => 2001,
            Self::InvalidToken => 2002,
            Self::CreatorNotFound(_) => 2003,
            Self::DuplicateTransaction => 2101,
            Self::AccessDenied(_) => 3001,
            Self::PurchaseNotConfirmed => 3002,
            Self::Unauthorized(_) => 3003,
            Self::PaymentRejected(_) => 4001,
            Self::RateLimited { .. } => 4290,
            Self::Internal(_) => 5000,
            Self::PersistenceError(_) => 5001,
            Self::StoreUnavailable(_) => 5031,
            Self::VerifierUnavailable(_) => 5032,
        }
    }

    /// Returns the stable reason string for this variant.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "InvalidRequest",
            Self::InvalidWalletAddress => "InvalidWalletAddress",
            Self::InvalidTransactionHash => "InvalidTransactionHash",
            Self::MissingToken => "MissingToken",
            Self::ContentNotFound(_) => "ContentNotFound",
            Self::InvalidToken => "InvalidToken",
            Self::CreatorNotFound(_) => "CreatorNotFound",
            Self::DuplicateTransaction => "DuplicateTransaction",
            Self::AccessDenied(_) => "AccessDenied",
            Self::PurchaseNotConfirmed => "PurchaseNotConfirmed",
            Self::Unauthorized(_) => "Unauthorized",
            Self::PaymentRejected(_) => "PaymentRejected",
            Self::RateLimited { .. } => "RateLimited",
            Self::StoreUnavailable(_) => "StoreUnavailable",
            Self::VerifierUnavailable(_) => "VerifierUnavailable",
            Self::PersistenceError(_) => "PersistenceError",
            Self::Internal(_) => "Internal",
        }
    }

    /// Returns the failure category of this variant.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidWalletAddress
            | Self::InvalidTransactionHash
            | Self::MissingToken
            | Self::PaymentRejected(_) => ErrorKind::Validation,
            Self::ContentNotFound(_) | Self::InvalidToken | Self::CreatorNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateTransaction => ErrorKind::Conflict,
            Self::AccessDenied(_) | Self::PurchaseNotConfirmed | Self::Unauthorized(_) => {
                ErrorKind::Authorization
            }
            Self::StoreUnavailable(_) | Self::VerifierUnavailable(_) => {
                ErrorKind::DependencyUnavailable
            }
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::PersistenceError(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidWalletAddress
            | Self::InvalidTransactionHash
            | Self::MissingToken
            | Self::DuplicateTransaction => StatusCode::BAD_REQUEST,
            Self::ContentNotFound(_) | Self::InvalidToken | Self::CreatorNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AccessDenied(_) | Self::PurchaseNotConfirmed => StatusCode::FORBIDDEN,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::PaymentRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::StoreUnavailable(_) | Self::VerifierUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients. Internal failures are collapsed to
    /// a generic text.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => GENERIC_FAILURE.to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<JsonRejection> for MarketError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for MarketError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.kind() {
            ErrorKind::Internal => tracing::error!(error = %self, "request failed"),
            ErrorKind::DependencyUnavailable => tracing::warn!(error = %self, "dependency unavailable"),
            _ => tracing::debug!(error = %self, "request rejected"),
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                reason: self.reason(),
                message: self.public_message(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        if let Self::RateLimited { retry_after_ms } = self {
            let secs = retry_after_ms.div_ceil(1_000).max(1);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_transaction_is_a_bad_request_conflict() {
        let err = MarketError::DuplicateTransaction;
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.reason(), "DuplicateTransaction");
    }

    #[test]
    fn access_failures_are_forbidden() {
        assert_eq!(
            MarketError::AccessDenied("mismatch".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            MarketError::PurchaseNotConfirmed.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(MarketError::InvalidToken.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(MarketError::MissingToken.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_unavailable_maps_to_503() {
        let err = MarketError::StoreUnavailable("pool timed out".to_string());
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = MarketError::PersistenceError("relation \"purchases\" does not exist".to_string());
        assert_eq!(err.public_message(), GENERIC_FAILURE);

        let err = MarketError::ContentNotFound("c1".to_string());
        assert_eq!(err.public_message(), "content not found: c1");
    }

    #[test]
    fn rate_limited_sets_retry_after() {
        let response = MarketError::RateLimited {
            retry_after_ms: 1_500,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
            Some("2")
        );
    }

    #[test]
    fn reasons_are_distinct() {
        let errors = [
            MarketError::InvalidRequest(String::new()),
            MarketError::InvalidWalletAddress,
            MarketError::InvalidTransactionHash,
            MarketError::MissingToken,
            MarketError::ContentNotFound(String::new()),
            MarketError::InvalidToken,
            MarketError::CreatorNotFound(String::new()),
            MarketError::DuplicateTransaction,
            MarketError::AccessDenied(String::new()),
            MarketError::PurchaseNotConfirmed,
            MarketError::Unauthorized(String::new()),
            MarketError::PaymentRejected(String::new()),
            MarketError::RateLimited { retry_after_ms: 1 },
            MarketError::StoreUnavailable(String::new()),
            MarketError::VerifierUnavailable(String::new()),
            MarketError::PersistenceError(String::new()),
            MarketError::Internal(String::new()),
        ];
        let mut reasons: Vec<&str> = errors.iter().map(MarketError::reason).collect();
        let total = reasons.len();
        reasons.sort_unstable();
        reasons.dedup();
        assert_eq!(reasons.len(), total);

        let mut codes: Vec<u32> = errors.iter().map(MarketError::error_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }
}
