//! Transfer Gateway - Entry Point
//!
//! Initializes configuration, logging and the chain connection, then
//! serves the transfer API until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config (path from TRANSFER_GATEWAY_CONFIG, default config.toml)
//! 2. Init tracing (JSON structured logging)
//! 3. Connect the RPC provider and validate the chain ID
//! 4. Verify configured token decimals against the chain
//! 5. Build poller, gas engine, allowance manager, dispatcher, aggregator
//! 6. Serve HTTP (/transfer, /balances, /live, /ready, /metrics)
//! 7. Wait for SIGINT → readiness off → cancel in-flight waits → drain

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use transfer_gateway::adapters::chain::{AlloyChainClient, RpcProvider};
use transfer_gateway::adapters::http::{self, AppState};
use transfer_gateway::adapters::metrics::{HealthState, MetricsRegistry};
use transfer_gateway::config;
use transfer_gateway::usecases::{
    cancel_pair, AllowanceManager, BalanceAggregator, ConfirmationPoller, GasPolicyEngine,
    TokenRegistry, TransferDispatcher,
};

const CONFIG_ENV: &str = "TRANSFER_GATEWAY_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration ───────────────────────────────
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.service.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        chain_id = config.chain.chain_id,
        tokens = config.tokens.len(),
        "Starting transfer gateway"
    );

    // ── 3. Connect to the chain ─────────────────────────────
    let provider = Arc::new(
        RpcProvider::connect(&config.chain)
            .await
            .context("Failed to connect to RPC")?,
    );
    let chain = Arc::new(AlloyChainClient::new(provider));

    // ── 4. Verify token metadata on-chain ───────────────────
    let tokens = Arc::new(TokenRegistry::new(
        Arc::clone(&chain),
        config.token_descriptors(),
    ));
    tokens
        .refresh()
        .await
        .context("Token verification failed")?;

    // ── 5. Build the engine ─────────────────────────────────
    let poller = ConfirmationPoller::new(
        config.confirmation.poll_interval(),
        config.confirmation.timeout(),
    );
    let gas = GasPolicyEngine::new(&config.gas, poller);
    let allowances = AllowanceManager::new(
        Arc::clone(&chain),
        gas.clone(),
        config.allowance.clone(),
    );
    let dispatcher = TransferDispatcher::new(Arc::clone(&chain), gas, allowances);
    let balances = BalanceAggregator::new(
        Arc::clone(&chain),
        tokens.tokens().await,
        config.balances.query_timeout(),
    );

    let metrics = Arc::new(MetricsRegistry::new().context("Failed to register metrics")?);
    let health = Arc::new(HealthState::new(Arc::clone(&chain)));

    // Fired on shutdown so in-flight confirmation waits stop.
    let (cancel_handle, shutdown_signal) = cancel_pair();

    let state = Arc::new(AppState {
        dispatcher,
        balances,
        tokens,
        metrics,
        health: Arc::clone(&health),
        shutdown: shutdown_signal,
    });

    // ── 6. Serve until SIGINT ───────────────────────────────
    let shutdown = async move {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
        info!("SIGINT received, initiating graceful shutdown");

        // ── 7. Graceful shutdown ────────────────────────────
        // Readiness probe → 503, then release every pending wait.
        // Broadcast transactions are not retracted.
        health.stop_accepting();
        cancel_handle.cancel();
    };

    http::serve(state, &config.service.bind_address, shutdown).await?;

    info!("Shutdown complete");
    Ok(())
}
