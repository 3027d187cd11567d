//! drip-gateway server entry point.
//!
//! Loads configuration, selects the ledger store and payment verifier, and
//! starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use drip_gateway::api;
use drip_gateway::app_state::AppState;
use drip_gateway::auth::TokenIssuer;
use drip_gateway::config::{LogFormat, MarketConfig};
use drip_gateway::persistence::{InMemoryLedger, LedgerStore, PostgresLedger};
use drip_gateway::verifier;

/// Interval between rate limiter prunes.
const RATE_LIMIT_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_ledger(config: &MarketConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled: using the in-memory ledger, data is lost on restart");
        return Ok(Arc::new(InMemoryLedger::new()));
    }
    let ledger = PostgresLedger::connect(&config.database)
        .await
        .context("connecting to PostgreSQL")?;
    if config.database.run_migrations {
        ledger.migrate().await.context("running migrations")?;
        tracing::info!("database migrations applied");
    }
    Ok(Arc::new(ledger))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = MarketConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting drip-gateway");

    // Build infrastructure
    let ledger = open_ledger(&config).await?;
    let verifier = verifier::from_config(&config.verifier).context("building payment verifier")?;
    let tokens = Arc::new(match config.jwt_secret.as_deref() {
        Some(secret) => TokenIssuer::new(secret, config.creator_token_ttl_secs),
        None => {
            tracing::warn!(
                "JWT_SECRET not set: creator tokens use a per-process secret and expire on restart"
            );
            TokenIssuer::ephemeral(config.creator_token_ttl_secs)
        }
    });
    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set: payout routes are disabled");
    }

    // Build application state
    let app_state = AppState::new(&config, ledger, verifier, tokens);
    let pruner = app_state
        .rate_limiter
        .spawn_pruner(RATE_LIMIT_PRUNE_INTERVAL);

    // Build router
    let app = api::app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pruner.abort();
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
