//! Health State - Liveness and Readiness
//!
//! Readiness combines two facts: the gateway is still accepting work
//! (cleared when shutdown starts) and the chain client answers a
//! lightweight RPC call. Liveness only needs the process to respond.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ports::chain_client::ChainClient;

/// Shared health state polled by readiness probes.
pub struct HealthState<C: ChainClient> {
    chain: Arc<C>,
    /// Cleared when graceful shutdown begins.
    accepting: AtomicBool,
}

impl<C: ChainClient> HealthState<C> {
    pub const fn new(chain: Arc<C>) -> Self {
        Self {
            chain,
            accepting: AtomicBool::new(true),
        }
    }

    /// Flip readiness off ahead of shutdown.
    pub fn stop_accepting(&self) {
        self.accepting.store(false, Ordering::Relaxed);
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Relaxed)
    }

    /// Ready to serve traffic: accepting and the chain answers.
    pub async fn is_ready(&self) -> bool {
        self.is_accepting() && self.chain.is_healthy().await
    }
}
