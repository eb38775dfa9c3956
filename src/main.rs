mod api;
mod config;
mod errors;
mod exchanges;
mod models;
mod refresh;
mod store;

use api::ApiServer;
use api::models::AppState;
use config::Config;
use exchanges::coindcx::CoinDcx;
use std::sync::Arc;
use store::PairStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        "dcx-futures-mirror starting: upstream {} on port {}",
        config.exchange_base_url,
        config.api_port
    );

    // ── 1. Long-lived resources: HTTP client and connection pool ───
    let exchange = CoinDcx::new(config.exchange_base_url.clone(), config.http_timeout)?;
    let pair_store = PairStore::new(store::connect(&config.database_url).await?);
    let pool = pair_store.pool().clone();

    // ── 2. Serve until Ctrl+C ──────────────────────────────────────
    let state = AppState::new(Arc::new(exchange), pair_store);
    ApiServer::new(state).run(&config, shutdown_signal()).await?;

    // ── 3. Release the pool once in-flight requests have drained ───
    tracing::info!("Shutting down...");
    pool.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
