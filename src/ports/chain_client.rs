//! Chain Client Port - On-chain Interaction Interface
//!
//! Signed submission, gas estimation, receipt lookup and read-only
//! contract queries. Implementations must be safe to share across
//! concurrent transfers; the core performs no locking around them.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::transfer::{Account, ContractCall, ReceiptInfo};

/// Message fragments nodes use when a send fails for lack of gas.
const GAS_MARKERS: [&str; 5] = [
    "gas allowance",
    "out of gas",
    "intrinsic gas too low",
    "gas required exceeds allowance",
    "gas limit reached",
];

/// Failure classes reported by a chain client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainError {
    /// The EVM reverted the call.
    #[error("execution reverted: {0}")]
    Reverted(String),

    /// The node answered with an error (gas, nonce, malformed params).
    #[error("rpc error: {0}")]
    Rejected(String),

    /// The request never got a usable answer.
    #[error("transport error: {0}")]
    Network(String),
}

impl ChainError {
    /// Whether this is a node rejection caused by an insufficient gas limit.
    pub fn is_gas_related(&self) -> bool {
        match self {
            Self::Rejected(msg) => {
                let msg = msg.to_lowercase();
                GAS_MARKERS.iter().any(|m| msg.contains(m))
            }
            Self::Reverted(_) | Self::Network(_) => false,
        }
    }
}

/// Trait for on-chain interactions.
#[async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Estimate the gas a call needs.
    ///
    /// # Errors
    /// `ChainError::Reverted` when the call would revert.
    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64, ChainError>;

    /// Sign `call` with the account's key and broadcast it.
    async fn send(
        &self,
        account: &Account,
        call: &ContractCall,
        gas_limit: u64,
    ) -> Result<TxHash, ChainError>;

    /// Current receipt for `hash`; `block_number` is `None` while pending.
    async fn get_receipt(&self, hash: TxHash) -> Result<ReceiptInfo, ChainError>;

    /// Read-only `eth_call` against a contract.
    async fn query(&self, contract: Address, data: Bytes) -> Result<Bytes, ChainError>;

    /// Native coin balance in wei.
    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError>;

    /// Check if the chain client connection is healthy.
    async fn is_healthy(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_related_matching() {
        assert!(ChainError::Rejected("Transaction gas allowance exceeded".into()).is_gas_related());
        assert!(ChainError::Rejected("OUT OF GAS".into()).is_gas_related());
        assert!(ChainError::Rejected("intrinsic gas too low".into()).is_gas_related());
        assert!(!ChainError::Rejected("nonce too low".into()).is_gas_related());
        assert!(!ChainError::Reverted("out of gas".into()).is_gas_related());
        assert!(!ChainError::Network("gas allowance".into()).is_gas_related());
    }
}
