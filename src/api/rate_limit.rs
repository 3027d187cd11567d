//! Per-client rate limiting.
//!
//! Budgets are tracked in process memory by a keyed `governor` limiter, one
//! bucket per client IP and route path. State is lost on restart and idle
//! buckets are pruned by [`ClientRateLimiter::spawn_pruner`].

use std::fmt;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tokio::task::JoinHandle;

use crate::app_state::AppState;
use crate::config::RateLimitConfig;
use crate::error::MarketError;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Keyed token-bucket limiter allowing `max_requests` per window.
pub struct ClientRateLimiter {
    limiter: KeyedLimiter,
}

impl fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRateLimiter")
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}

impl ClientRateLimiter {
    /// Creates a limiter with a burst of `max_requests` that refills evenly
    /// over the window. Zero values are raised to one.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        let burst = NonZeroU32::new(config.max_requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(config.window() / burst.get())
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);
        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Consumes one request from the bucket of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::RateLimited`] with the time until the next
    /// request is allowed when the bucket is empty.
    pub fn check(&self, key: &str) -> Result<(), MarketError> {
        self.limiter.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.limiter.clock().now());
            MarketError::RateLimited {
                retry_after_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            }
        })
    }

    /// Drops buckets that have fully refilled.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of buckets currently held.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    /// Prunes idle buckets every `every` until the task is aborted.
    pub fn spawn_pruner(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                limiter.prune();
                tracing::debug!(tracked_keys = limiter.tracked_keys(), "rate limiter pruned");
            }
        })
    }
}

/// Client address: first `X-Forwarded-For` hop, else the socket peer.
fn client_ip(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

/// Middleware rejecting requests over the client's budget with `429`.
///
/// # Errors
///
/// Returns [`MarketError::RateLimited`] when the client's bucket is empty.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, MarketError> {
    let ip = client_ip(&request);
    let key = format!("{ip}:{}", request.uri().path());
    if let Err(err) = state.rate_limiter.check(&key) {
        tracing::warn!(target: "security", client = %ip, path = %request.uri().path(), "rate limit exceeded");
        return Err(err);
    }
    Ok(next.run(request).await)
}
