//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

/// Decimal amount as sent by a client: a JSON string (`"0.05"`) or a JSON
/// number (`0.05`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// Textual amount, passed through untouched.
    Text(String),
    /// Numeric amount, converted to its shortest textual form.
    Number(serde_json::Number),
}

impl AmountInput {
    /// Returns the text handed to the decimal parser.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Query string naming a wallet.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct WalletQuery {
    /// Wallet address (`0x` + 40 hex characters).
    pub wallet_address: Option<String>,
}
