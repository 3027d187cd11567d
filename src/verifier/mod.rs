//! Payment verification: deciding whether a claimed transaction really paid
//! for the content.
//!
//! The purchase service calls [`PaymentVerifier::verify`] after the claim
//! passed syntax checks and before any row is written. Two implementations
//! exist:
//!
//! - [`TrustingVerifier`] accepts every claim. The transaction hash and
//!   amount are taken at face value, so anyone who learns a valid hash can
//!   replay it for content that was never paid (the hash can only be
//!   consumed once, though).
//! - [`JsonRpcVerifier`] looks the transaction up on an EVM node and checks
//!   recipient, value, receipt status and confirmations.

pub mod json_rpc;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::VerifierConfig;
use crate::domain::PurchaseClaim;
use crate::error::MarketError;

pub use json_rpc::JsonRpcVerifier;

/// Checks a payment claim against the payment network.
#[async_trait]
pub trait PaymentVerifier: Send + Sync + fmt::Debug {
    /// Accepts or rejects `claim`.
    ///
    /// Fails with [`MarketError::PaymentRejected`] when the payment does not
    /// back the claim, or [`MarketError::VerifierUnavailable`] when the
    /// answer cannot be obtained.
    async fn verify(&self, claim: &PurchaseClaim) -> Result<(), MarketError>;
}

/// Verifier that accepts every claim without an on-chain lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingVerifier;

#[async_trait]
impl PaymentVerifier for TrustingVerifier {
    async fn verify(&self, claim: &PurchaseClaim) -> Result<(), MarketError> {
        tracing::debug!(
            target: "security",
            tx_hash = %claim.transaction_hash,
            amount = %claim.amount,
            "payment claim accepted without on-chain verification"
        );
        Ok(())
    }
}

/// Builds the verifier selected by `config`.
///
/// # Errors
///
/// Returns [`MarketError::Internal`] if the HTTP client for the JSON-RPC
/// verifier cannot be built.
pub fn from_config(config: &VerifierConfig) -> Result<Arc<dyn PaymentVerifier>, MarketError> {
    match config {
        VerifierConfig::Trusting => {
            tracing::warn!(
                "payment verifier: trust mode, transaction hashes are not checked on chain"
            );
            Ok(Arc::new(TrustingVerifier))
        }
        VerifierConfig::JsonRpc(rpc) => {
            tracing::info!(rpc_url = %rpc.rpc_url, "payment verifier: json-rpc");
            Ok(Arc::new(JsonRpcVerifier::new(rpc.clone())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[tokio::test]
    async fn trusting_verifier_accepts_any_claim() {
        let claim = PurchaseClaim {
            content_id: "c1".to_string(),
            buyer_address: format!("0x{}", "1".repeat(40)),
            transaction_hash: format!("0x{}", "f".repeat(64)),
            amount: Decimal::new(1, 3),
        };
        assert!(TrustingVerifier.verify(&claim).await.is_ok());
    }

    #[test]
    fn config_selects_trusting_verifier() {
        let verifier = from_config(&VerifierConfig::Trusting);
        assert!(verifier.is_ok_and(|v| format!("{v:?}") == "TrustingVerifier"));
    }
}
