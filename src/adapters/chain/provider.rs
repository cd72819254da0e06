//! RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to the configured EVM network via alloy-rs.
//! Validates RPC connectivity and chain ID at startup and exposes a
//! shared provider instance for all on-chain operations.
//!
//! `on_builtin` yields a `RootProvider<BoxTransport>`, which we store as
//! a type-erased `dyn Provider` to keep the API clean across the adapter.

use std::sync::Arc;
use std::time::Duration;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::config::ChainConfig;

/// Shared RPC provider backed by alloy-rs 0.9.
///
/// All chain operations share a single provider instance to avoid
/// redundant connections and enable connection pooling.
pub struct RpcProvider {
    /// The alloy provider connected to the RPC endpoint (type-erased).
    provider: Arc<dyn Provider + Send + Sync>,
    /// Chain ID confirmed at connect time.
    chain_id: u64,
    /// Upper bound on any single RPC request.
    request_timeout: Duration,
}

impl RpcProvider {
    /// Connect to the RPC endpoint and validate the chain ID.
    ///
    /// The URL comes from `config.toml` (never hardcoded) and is never
    /// logged, since hosted endpoints often embed API keys.
    #[instrument(skip_all)]
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .on_builtin(&config.rpc_url)
            .await
            .context("Invalid RPC URL")?;

        // Wrap in Arc<dyn Provider> for type erasure
        let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

        let chain_id = provider
            .get_chain_id()
            .await
            .context("Failed to query chain ID")?;

        anyhow::ensure!(
            chain_id == config.chain_id,
            "Expected chain_id={}, got {chain_id}",
            config.chain_id
        );

        info!(chain_id, "Connected to RPC");

        Ok(Self {
            provider,
            chain_id,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Get a shared reference to the alloy provider (type-erased).
    pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
        Arc::clone(&self.provider)
    }

    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Check if the RPC connection is healthy via a lightweight call.
    pub async fn is_healthy(&self) -> bool {
        matches!(
            tokio::time::timeout(self.request_timeout, self.provider.get_block_number()).await,
            Ok(Ok(_))
        )
    }
}
