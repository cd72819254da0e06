//! Confirmation Poller - Receipt Polling Until Inclusion
//!
//! Queries the chain client for a transaction's receipt at a fixed
//! cadence until it lands in a block, the timeout elapses, or the
//! caller cancels. Waiting suspends the task; it never spins.
//!
//! Outcomes:
//! - Receipt with block number → Succeeded / Failed by the receipt flag
//! - Timeout → `ConfirmationTimeout` (outcome unknown, not negative)
//! - Cancellation → `Cancelled` (the broadcast transaction is untouched)

use std::time::Duration;

use alloy::primitives::TxHash;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

use crate::domain::error::TransferError;
use crate::domain::transfer::SubmittedTransaction;
use crate::ports::chain_client::ChainClient;

use super::cancel::CancelSignal;

/// Floor on the poll cadence.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timeout-bounded, cancellable receipt poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPoller {
    interval: Duration,
    timeout: Duration,
}

impl ConfirmationPoller {
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: interval.max(MIN_POLL_INTERVAL),
            timeout,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Poll until `hash` is included.
    pub async fn await_receipt<C: ChainClient + ?Sized>(
        &self,
        chain: &C,
        hash: TxHash,
        cancel: &CancelSignal,
    ) -> Result<SubmittedTransaction, TransferError> {
        self.await_transaction(chain, SubmittedTransaction::pending(hash, 0), cancel)
            .await
    }

    /// Poll until the pending transaction `tx` is included and resolve it.
    #[instrument(skip(self, chain, tx, cancel), fields(tx_hash = %tx.hash))]
    pub async fn await_transaction<C: ChainClient + ?Sized>(
        &self,
        chain: &C,
        tx: SubmittedTransaction,
        cancel: &CancelSignal,
    ) -> Result<SubmittedTransaction, TransferError> {
        let hash = tx.hash;
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut polls: u32 = 0;

        loop {
            let receipt = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(polls, "Stopped waiting for receipt: cancelled");
                    return Err(TransferError::Cancelled { hash: Some(hash) });
                }
                receipt = timeout_at(deadline, chain.get_receipt(hash)) => match receipt {
                    Ok(receipt) => receipt?,
                    Err(_) => {
                        let waited = started.elapsed();
                        warn!(waited_ms = waited.as_millis() as u64, polls, "Confirmation timed out during receipt query");
                        return Err(TransferError::ConfirmationTimeout { hash, waited });
                    }
                },
            };
            polls += 1;

            if receipt.is_included() {
                let resolved = tx.resolve(receipt);
                info!(
                    status = %resolved.status,
                    block = ?resolved.block_number,
                    polls,
                    "Transaction resolved"
                );
                return Ok(resolved);
            }

            let now = Instant::now();
            if now >= deadline {
                let waited = now - started;
                warn!(waited_ms = waited.as_millis() as u64, polls, "Confirmation timed out");
                return Err(TransferError::ConfirmationTimeout { hash, waited });
            }

            debug!(polls, "Transaction pending");

            let wake = (now + self.interval).min(deadline);
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!(polls, "Stopped waiting for receipt: cancelled");
                    return Err(TransferError::Cancelled { hash: Some(hash) });
                }
                () = sleep_until(wake) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_floor() {
        let p = ConfirmationPoller::new(Duration::ZERO, Duration::from_secs(5));
        assert_eq!(p.interval(), MIN_POLL_INTERVAL);

        let p = ConfirmationPoller::new(Duration::from_secs(2), Duration::from_secs(5));
        assert_eq!(p.interval(), Duration::from_secs(2));
        assert_eq!(p.timeout(), Duration::from_secs(5));
    }
}
