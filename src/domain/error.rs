//! Transfer error taxonomy.
//!
//! Every failure that can leave the core carries its kind. Retries are
//! confined to gas-related rejections inside the gas policy engine; all
//! other kinds propagate unchanged to the caller.

use std::time::Duration;

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::ports::chain_client::ChainError;

/// Errors surfaced by the transfer and balance use cases.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// Malformed input, rejected before any network call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The call reverts at estimation time; it is invalid, not underfunded on gas.
    #[error("execution reverted: {0}")]
    ExecutionReverted(String),

    /// Gas-related rejections persisted through every allowed attempt.
    #[error("gas allowance exceeded after {attempts} attempts (last gas limit {last_gas_limit})")]
    GasAllowanceExceeded {
        /// Number of sends attempted.
        attempts: u32,
        /// Gas limit used on the final attempt.
        last_gas_limit: u64,
    },

    /// No receipt with a block number within the timeout. Outcome unknown.
    #[error("transaction {hash} not confirmed within {waited:?}")]
    ConfirmationTimeout {
        /// Hash of the broadcast transaction.
        hash: TxHash,
        /// Time spent waiting.
        waited: Duration,
    },

    /// The caller stopped waiting. Broadcast transactions are not retracted.
    #[error("operation cancelled")]
    Cancelled {
        /// Hash being awaited when the cancellation arrived, if any.
        hash: Option<TxHash>,
    },

    /// Node refused the call for a non-gas reason (nonce conflict, bad params).
    #[error("rejected by node: {0}")]
    Rejected(String),

    /// Transport-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// Included in a block but execution failed.
    #[error("transaction {hash} failed on-chain in block {block_number}")]
    TransactionFailed {
        /// Hash of the failed transaction.
        hash: TxHash,
        /// Block that included it.
        block_number: u64,
    },
}

impl TransferError {
    /// Stable label for logs, metrics and HTTP bodies.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::ExecutionReverted(_) => "execution_reverted",
            Self::GasAllowanceExceeded { .. } => "gas_allowance_exceeded",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Rejected(_) => "rejected",
            Self::Network(_) => "network_error",
            Self::TransactionFailed { .. } => "transaction_failed",
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

impl From<ChainError> for TransferError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::Reverted(msg) => Self::ExecutionReverted(msg),
            ChainError::Rejected(msg) => Self::Rejected(msg),
            ChainError::Network(msg) => Self::Network(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_error_kind_preserved() {
        let err: TransferError = ChainError::Reverted("bad".into()).into();
        assert_eq!(err.kind(), "execution_reverted");

        let err: TransferError = ChainError::Network("dns".into()).into();
        assert_eq!(err.kind(), "network_error");

        let err: TransferError = ChainError::Rejected("nonce too low".into()).into();
        assert_eq!(err.kind(), "rejected");
    }

    #[test]
    fn test_error_display() {
        let err = TransferError::GasAllowanceExceeded {
            attempts: 3,
            last_gas_limit: 172_800,
        };
        assert!(err.to_string().contains("3 attempts"));
        assert!(err.to_string().contains("172800"));
    }
}
