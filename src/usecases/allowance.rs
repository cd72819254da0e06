//! Allowance Manager - ERC-20 Spend Approvals
//!
//! Before a token transfer, reads `allowance(owner, spender)` and, when
//! it is zero, submits `approve(spender, amount)` through the gas policy
//! engine and waits for it to confirm.
//!
//! Approvals default to max uint256 to avoid repeated transactions on
//! later transfers. That leaves a standing unlimited approval; set
//! `approval = "exact"` to approve only the transferred amount instead.
//!
//! A nonzero allowance is accepted as-is unless `top_up_insufficient`
//! is enabled, in which case an allowance below the transfer amount
//! also triggers an approval.

use std::sync::Arc;

use alloy::primitives::{Address, TxHash, U256};
use tracing::{info, instrument};

use crate::config::{AllowanceConfig, ApprovalAmount};
use crate::domain::erc20;
use crate::domain::error::TransferError;
use crate::domain::transfer::{Account, ContractCall, TxStatus};
use crate::ports::chain_client::ChainClient;

use super::cancel::CancelSignal;
use super::gas_policy::GasPolicyEngine;

/// What `ensure_allowance` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceOutcome {
    /// Existing allowance was accepted.
    Sufficient { current: U256 },
    /// An approval was submitted and confirmed.
    Approved { tx_hash: TxHash, granted: U256 },
}

impl AllowanceOutcome {
    pub const fn approval_hash(&self) -> Option<TxHash> {
        match self {
            Self::Sufficient { .. } => None,
            Self::Approved { tx_hash, .. } => Some(*tx_hash),
        }
    }
}

/// Checks and tops up ERC-20 allowances.
pub struct AllowanceManager<C: ChainClient> {
    chain: Arc<C>,
    gas: GasPolicyEngine,
    config: AllowanceConfig,
}

impl<C: ChainClient> AllowanceManager<C> {
    pub const fn new(chain: Arc<C>, gas: GasPolicyEngine, config: AllowanceConfig) -> Self {
        Self { chain, gas, config }
    }

    /// Current `allowance(owner, spender)` on `token`. Never cached.
    pub async fn current_allowance(
        &self,
        owner: Address,
        spender: Address,
        token: Address,
    ) -> Result<U256, TransferError> {
        let raw = self
            .chain
            .query(token, erc20::allowance(owner, spender))
            .await?;
        erc20::decode_u256("allowance", &raw).map_err(|e| TransferError::Network(e.to_string()))
    }

    /// Make sure `spender` may move `amount` of `token` for `owner`.
    ///
    /// # Errors
    /// Propagates query and submission errors; an approval that resolves
    /// as failed on-chain yields `TransactionFailed`.
    #[instrument(skip(self, owner, cancel), fields(token = %token, spender = %spender))]
    pub async fn ensure_allowance(
        &self,
        owner: &Account,
        owner_address: Address,
        spender: Address,
        token: Address,
        amount: U256,
        cancel: &CancelSignal,
    ) -> Result<AllowanceOutcome, TransferError> {
        let current = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransferError::Cancelled { hash: None }),
            current = self.current_allowance(owner_address, spender, token) => current?,
        };

        if !self.needs_approval(current, amount) {
            info!(current = %current, "Allowance sufficient");
            return Ok(AllowanceOutcome::Sufficient { current });
        }

        let granted = match self.config.approval {
            ApprovalAmount::Unlimited => U256::MAX,
            ApprovalAmount::Exact => amount,
        };

        info!(current = %current, granted = %granted, "Submitting approval");

        let call = ContractCall::contract(owner_address, token, erc20::approve(spender, granted));
        let tx = self
            .gas
            .submit(self.chain.as_ref(), owner, &call, self.gas.policy(), cancel)
            .await?;

        if tx.status != TxStatus::Succeeded {
            return Err(TransferError::TransactionFailed {
                hash: tx.hash,
                block_number: tx.block_number.unwrap_or_default(),
            });
        }

        info!(tx_hash = %tx.hash, "Approval confirmed");
        Ok(AllowanceOutcome::Approved {
            tx_hash: tx.hash,
            granted,
        })
    }

    fn needs_approval(&self, current: U256, amount: U256) -> bool {
        current.is_zero() || (self.config.top_up_insufficient && current < amount)
    }
}
