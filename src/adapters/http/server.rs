//! Gateway HTTP Server - axum 0.7 Router
//!
//! Routes:
//! - `POST /transfer`: execute a native or ERC-20 transfer and wait for it
//! - `GET /balances/:address`: per-token balance snapshot
//! - `/live`, `/ready`: orchestrator probes
//! - `/metrics`: Prometheus text exposition
//!
//! Every request observes the shared shutdown `CancelSignal`, so in-flight
//! confirmation waits end with `Cancelled` once shutdown starts.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument, warn};

use crate::adapters::metrics::{HealthState, MetricsRegistry};
use crate::domain::error::TransferError;
use crate::ports::chain_client::ChainClient;
use crate::usecases::balances::{BalanceAggregator, BalanceSnapshot};
use crate::usecases::cancel::CancelSignal;
use crate::usecases::dispatcher::TransferDispatcher;
use crate::usecases::token_registry::TokenRegistry;

use super::error::ApiError;
use super::types::{TransferBody, TransferResponse};

/// Everything the handlers share.
pub struct AppState<C: ChainClient> {
    pub dispatcher: TransferDispatcher<C>,
    pub balances: BalanceAggregator<C>,
    pub tokens: Arc<TokenRegistry<C>>,
    pub metrics: Arc<MetricsRegistry>,
    pub health: Arc<HealthState<C>>,
    /// Fires on graceful shutdown.
    pub shutdown: CancelSignal,
}

/// Build the gateway router over shared state.
pub fn router<C: ChainClient>(state: Arc<AppState<C>>) -> Router {
    Router::new()
        .route("/transfer", post(transfer::<C>))
        .route("/balances/:address", get(balances::<C>))
        .route("/live", get(liveness))
        .route("/ready", get(readiness::<C>))
        .route("/metrics", get(metrics::<C>))
        .with_state(state)
}

/// Serve the router until `shutdown` resolves, then drain.
#[instrument(skip(state, shutdown))]
pub async fn serve<C: ChainClient>(
    state: Arc<AppState<C>>,
    bind_address: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    info!(address = %bind_address, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn transfer<C: ChainClient>(
    State(state): State<Arc<AppState<C>>>,
    body: Result<Json<TransferBody>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let Json(body) = body.map_err(|e| TransferError::invalid(e.body_text()))?;

    let token = state
        .tokens
        .find(&body.token)
        .await
        .ok_or_else(|| TransferError::invalid(format!("unknown token: {}", body.token)))?;
    let token_name = token.name.clone();

    let started = Instant::now();
    let result = state
        .dispatcher
        .execute(body.into_request(token), &state.shutdown)
        .await;
    let elapsed = started.elapsed().as_secs_f64();

    match result {
        Ok(receipt) => {
            state.metrics.record_transfer(&token_name, "succeeded", elapsed);
            state
                .metrics
                .record_gas_attempts(&token_name, receipt.transaction.attempts);
            Ok(Json(receipt.into()))
        }
        Err(e) => {
            warn!(token = %token_name, kind = e.kind(), error = %e, "Transfer request failed");
            state.metrics.record_transfer(&token_name, e.kind(), elapsed);
            Err(e.into())
        }
    }
}

async fn balances<C: ChainClient>(
    State(state): State<Arc<AppState<C>>>,
    Path(address): Path<String>,
) -> Result<Json<BalanceSnapshot>, ApiError> {
    let snapshot = state.balances.get_balances(&address, &state.shutdown).await?;
    state.metrics.record_snapshot(&snapshot);
    Ok(Json(snapshot))
}

/// Liveness probe: always returns 200 if the process is running.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness probe: 200 only while accepting work and the chain answers.
async fn readiness<C: ChainClient>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    if state.health.is_ready().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}

async fn metrics<C: ChainClient>(State(state): State<Arc<AppState<C>>>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
