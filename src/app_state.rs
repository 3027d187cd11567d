//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::api::rate_limit::ClientRateLimiter;
use crate::auth::TokenIssuer;
use crate::config::MarketConfig;
use crate::persistence::LedgerStore;
use crate::service::{AccessGate, CatalogService, CreatorService, PayoutService, PurchaseService};
use crate::verifier::PaymentVerifier;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Purchase submission and wallet libraries.
    pub purchases: Arc<PurchaseService>,
    /// Token redemption.
    pub access: Arc<AccessGate>,
    /// Admin payouts.
    pub payouts: Arc<PayoutService>,
    /// Content browsing and publishing.
    pub catalog: Arc<CatalogService>,
    /// Creator sign-in and dashboard.
    pub creators: Arc<CreatorService>,
    /// Ledger, for health checks.
    pub ledger: Arc<dyn LedgerStore>,
    /// Creator session tokens.
    pub tokens: Arc<TokenIssuer>,
    /// Admin bearer token. `None` disables admin routes.
    pub admin_token: Option<Arc<str>>,
    /// Per-client request budget.
    pub rate_limiter: Arc<ClientRateLimiter>,
}

impl AppState {
    /// Wires every service over one ledger and verifier.
    #[must_use]
    pub fn new(
        config: &MarketConfig,
        ledger: Arc<dyn LedgerStore>,
        verifier: Arc<dyn PaymentVerifier>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            purchases: Arc::new(PurchaseService::new(
                Arc::clone(&ledger),
                verifier,
                config.public_base_url.as_str(),
            )),
            access: Arc::new(AccessGate::new(
                Arc::clone(&ledger),
                config.access_require_wallet,
            )),
            payouts: Arc::new(PayoutService::new(Arc::clone(&ledger))),
            catalog: Arc::new(CatalogService::new(Arc::clone(&ledger))),
            creators: Arc::new(CreatorService::new(
                Arc::clone(&ledger),
                Arc::clone(&tokens),
            )),
            ledger,
            tokens,
            admin_token: config.admin_token.as_deref().map(Arc::from),
            rate_limiter: Arc::new(ClientRateLimiter::new(config.rate_limit)),
        }
    }
}
