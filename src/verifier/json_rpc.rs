//! On-chain payment verification over EVM JSON-RPC.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::PaymentVerifier;
use crate::config::JsonRpcConfig;
use crate::domain::PurchaseClaim;
use crate::error::MarketError;

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcTransaction {
    to: Option<String>,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    status: Option<String>,
    block_number: Option<String>,
}

/// Parses an EVM hex quantity (`0x`-prefixed, no leading zero requirement).
#[must_use]
pub fn parse_hex_quantity(quantity: &str) -> Option<u128> {
    let digits = quantity.strip_prefix("0x")?;
    if digits.is_empty() {
        return None;
    }
    u128::from_str_radix(digits, 16).ok()
}

/// Converts a currency amount to integer base units (wei for 18 decimals),
/// rounding up so the required value is never below the claimed amount.
#[must_use]
pub fn to_base_units(amount: Decimal, decimals: u32) -> Option<u128> {
    let mut scaled = amount;
    for _ in 0..decimals {
        scaled = scaled.checked_mul(Decimal::TEN)?;
    }
    scaled.ceil().to_u128()
}

/// Verifier backed by an EVM node.
///
/// A claim is accepted when the transaction exists, was sent to the
/// platform wallet with at least the claimed value, succeeded, and has the
/// configured number of confirmations.
#[derive(Debug, Clone)]
pub struct JsonRpcVerifier {
    client: reqwest::Client,
    config: JsonRpcConfig,
}

impl JsonRpcVerifier {
    /// Creates a verifier for the given node.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Internal`] if the HTTP client cannot be built.
    pub fn new(config: JsonRpcConfig) -> Result<Self, MarketError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MarketError::Internal(format!("rpc client: {e}")))?;
        Ok(Self { client, config })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Option<T>, MarketError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.config.rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| MarketError::VerifierUnavailable(format!("{method}: {e}")))?;

        if !response.status().is_success() {
            return Err(MarketError::VerifierUnavailable(format!(
                "{method}: http {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| MarketError::VerifierUnavailable(format!("{method}: {e}")))?;

        if let Some(err) = body.error {
            return Err(MarketError::VerifierUnavailable(format!(
                "{method}: rpc error {}: {}",
                err.code, err.message
            )));
        }
        if body.result.is_null() {
            return Ok(None);
        }
        serde_json::from_value(body.result)
            .map(Some)
            .map_err(|e| MarketError::VerifierUnavailable(format!("{method}: {e}")))
    }
}

fn rejected(claim: &PurchaseClaim, reason: &str) -> MarketError {
    tracing::warn!(
        target: "security",
        tx_hash = %claim.transaction_hash,
        buyer = %claim.buyer_address,
        reason,
        "payment claim rejected"
    );
    MarketError::PaymentRejected(reason.to_string())
}

fn quantity(field: &str, raw: &str) -> Result<u128, MarketError> {
    parse_hex_quantity(raw)
        .ok_or_else(|| MarketError::VerifierUnavailable(format!("malformed {field}: {raw}")))
}

#[async_trait]
impl PaymentVerifier for JsonRpcVerifier {
    async fn verify(&self, claim: &PurchaseClaim) -> Result<(), MarketError> {
        let hash = json!([claim.transaction_hash]);

        let Some(tx) = self
            .call::<RpcTransaction>("eth_getTransactionByHash", hash.clone())
            .await?
        else {
            return Err(rejected(claim, "transaction not found"));
        };

        let to_platform = tx
            .to
            .as_deref()
            .is_some_and(|to| to.eq_ignore_ascii_case(&self.config.platform_wallet));
        if !to_platform {
            return Err(rejected(claim, "payment was not sent to the platform wallet"));
        }

        let paid = quantity("value", &tx.value)?;
        let required = to_base_units(claim.amount, self.config.currency_decimals)
            .ok_or_else(|| MarketError::InvalidRequest("amount out of range".to_string()))?;
        if paid < required {
            return Err(rejected(claim, "paid value is below the claimed amount"));
        }

        let Some(receipt) = self
            .call::<RpcReceipt>("eth_getTransactionReceipt", hash)
            .await?
        else {
            return Err(rejected(claim, "transaction is not mined yet"));
        };
        if receipt.status.as_deref() != Some("0x1") {
            return Err(rejected(claim, "transaction failed on chain"));
        }
        let Some(block_raw) = receipt.block_number.as_deref() else {
            return Err(rejected(claim, "transaction is not mined yet"));
        };
        let block = quantity("blockNumber", block_raw)?;

        let Some(head_raw) = self.call::<String>("eth_blockNumber", json!([])).await? else {
            return Err(MarketError::VerifierUnavailable(
                "eth_blockNumber returned null".to_string(),
            ));
        };
        let head = quantity("blockNumber", &head_raw)?;

        let confirmations = head.saturating_sub(block).saturating_add(1);
        if confirmations < u128::from(self.config.min_confirmations) {
            return Err(rejected(claim, "not enough confirmations"));
        }

        tracing::debug!(
            tx_hash = %claim.transaction_hash,
            %confirmations,
            "payment verified on chain"
        );
        Ok(())
    }
}
