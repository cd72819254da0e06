//! Transfer Dispatcher - Native and ERC-20 Transfer Orchestration
//!
//! Transfer flow:
//! 1. Validate the request locally (no network on failure)
//! 2. Scale the amount to base units
//! 3. Token path only: ensure the spender allowance
//! 4. Build the call for the token kind
//! 5. Submit through the gas policy engine and wait for the receipt
//! 6. Re-read the receipt success flag and attach it to the result
//!
//! The token kind is resolved once, in `plan`, into a `TransferPlan`;
//! nothing downstream branches on it again.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::TransferError;
use crate::domain::token::{NATIVE_DECIMALS, TokenKind};
use crate::domain::transfer::{ContractCall, TransferReceipt, TransferRequest, TxStatus};
use crate::domain::{erc20, units};
use crate::ports::chain_client::ChainClient;

use super::allowance::AllowanceManager;
use super::cancel::CancelSignal;
use super::gas_policy::GasPolicyEngine;

/// A validated request with typed addresses and scaled amount.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ValidatedTransfer {
    sender: Address,
    receiver: Address,
    raw_amount: U256,
}

/// Per-kind transfer strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferPlan {
    /// Value transfer straight to the receiver.
    Native,
    /// `transfer(to, amount)` on the contract, after an allowance check.
    Erc20 { contract: Address, spender: Address },
}

impl TransferPlan {
    const fn from_kind(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Native => Self::Native,
            TokenKind::Erc20 { contract, spender } => Self::Erc20 { contract, spender },
        }
    }

    fn build_call(self, transfer: &ValidatedTransfer) -> ContractCall {
        match self {
            Self::Native => {
                ContractCall::native_transfer(transfer.sender, transfer.receiver, transfer.raw_amount)
            }
            Self::Erc20 { contract, .. } => ContractCall::contract(
                transfer.sender,
                contract,
                erc20::transfer(transfer.receiver, transfer.raw_amount),
            ),
        }
    }
}

/// Executes transfer requests end to end.
pub struct TransferDispatcher<C: ChainClient> {
    chain: Arc<C>,
    gas: GasPolicyEngine,
    allowances: AllowanceManager<C>,
}

impl<C: ChainClient> TransferDispatcher<C> {
    pub const fn new(chain: Arc<C>, gas: GasPolicyEngine, allowances: AllowanceManager<C>) -> Self {
        Self {
            chain,
            gas,
            allowances,
        }
    }

    /// Execute a transfer and wait for it to resolve.
    ///
    /// # Errors
    /// `InvalidRequest` for malformed input (nothing is sent),
    /// `TransactionFailed` when the transfer lands but fails, and any
    /// error kind raised by allowance, submission or confirmation.
    #[instrument(skip_all, fields(op = tracing::field::Empty, token = %request.token.name, amount = %request.amount))]
    pub async fn execute(
        &self,
        request: TransferRequest,
        cancel: &CancelSignal,
    ) -> Result<TransferReceipt, TransferError> {
        let operation_id = Uuid::new_v4();
        tracing::Span::current().record("op", tracing::field::display(operation_id));

        let validated = validate(&request)?;
        let plan = TransferPlan::from_kind(request.token.kind);

        let approval = match plan {
            TransferPlan::Native => None,
            TransferPlan::Erc20 { contract, spender } => self
                .allowances
                .ensure_allowance(
                    &request.sender,
                    validated.sender,
                    spender,
                    contract,
                    validated.raw_amount,
                    cancel,
                )
                .await?
                .approval_hash(),
        };

        let call = plan.build_call(&validated);
        let tx = self
            .gas
            .submit(self.chain.as_ref(), &request.sender, &call, self.gas.policy(), cancel)
            .await?;

        // Inclusion alone does not mean success; read the flag again.
        let succeeded = match self.chain.get_receipt(tx.hash).await {
            Ok(receipt) if receipt.is_included() => receipt.success,
            Ok(_) => tx.status == TxStatus::Succeeded,
            Err(e) => {
                warn!(tx_hash = %tx.hash, error = %e, "Final status re-read failed, using polled status");
                tx.status == TxStatus::Succeeded
            }
        };

        if !succeeded {
            warn!(tx_hash = %tx.hash, block = ?tx.block_number, "Transfer failed on-chain");
            return Err(TransferError::TransactionFailed {
                hash: tx.hash,
                block_number: tx.block_number.unwrap_or_default(),
            });
        }

        let fee = tx
            .receipt
            .as_ref()
            .and_then(|r| r.fee_wei())
            .and_then(|wei| units::from_smallest_units(wei, NATIVE_DECIMALS).ok());

        info!(
            tx_hash = %tx.hash,
            block = ?tx.block_number,
            attempts = tx.attempts,
            gas_limit = tx.gas_limit,
            approved = approval.is_some(),
            "Transfer succeeded"
        );

        Ok(TransferReceipt {
            operation_id,
            token: request.token.name.clone(),
            amount: request.amount,
            raw_amount: validated.raw_amount,
            transaction: tx,
            approval,
            succeeded,
            fee,
            completed_at: Utc::now(),
        })
    }
}

/// Local precondition checks. Never touches the network.
fn validate(request: &TransferRequest) -> Result<ValidatedTransfer, TransferError> {
    let sender = parse_address("sender address", &request.sender.address)?;
    let receiver = parse_address("receiver address", &request.receiver_address)?;

    if request.sender.signing_key.is_empty() {
        return Err(TransferError::invalid("sender signing key is empty"));
    }
    if request.amount <= Decimal::ZERO {
        return Err(TransferError::invalid(format!(
            "amount must be positive, got {}",
            request.amount
        )));
    }

    let raw_amount = units::to_smallest_units(request.amount, request.token.decimals)
        .map_err(|e| TransferError::invalid(e.to_string()))?;
    if raw_amount.is_zero() {
        return Err(TransferError::invalid(format!(
            "amount {} is below the smallest unit of {}",
            request.amount, request.token.name
        )));
    }

    Ok(ValidatedTransfer {
        sender,
        receiver,
        raw_amount,
    })
}

fn parse_address(what: &str, value: &str) -> Result<Address, TransferError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TransferError::invalid(format!("{what} is empty")));
    }
    value
        .parse()
        .map_err(|_| TransferError::invalid(format!("{what} is not a valid address: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::TokenDescriptor;
    use crate::domain::transfer::{Account, SigningKey};
    use alloy::primitives::address;
    use rust_decimal_macros::dec;

    const SENDER: &str = "0x1111111111111111111111111111111111111111";
    const RECEIVER: &str = "0x2222222222222222222222222222222222222222";

    fn request(sender: &str, receiver: &str, amount: Decimal) -> TransferRequest {
        TransferRequest {
            sender: Account::new(sender, SigningKey::new("0x01")),
            receiver_address: receiver.to_string(),
            amount,
            token: TokenDescriptor::native("FITFI"),
        }
    }

    #[test]
    fn test_validate_ok() {
        let v = validate(&request(SENDER, RECEIVER, dec!(1.5))).unwrap();
        assert_eq!(v.raw_amount, U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(v.receiver, RECEIVER.parse::<Address>().unwrap());
    }

    #[test]
    fn test_validate_empty_addresses() {
        assert!(matches!(
            validate(&request("", RECEIVER, dec!(1))),
            Err(TransferError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate(&request(SENDER, "  ", dec!(1))),
            Err(TransferError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_bad_amounts() {
        assert!(validate(&request(SENDER, RECEIVER, dec!(0))).is_err());
        assert!(validate(&request(SENDER, RECEIVER, dec!(-3))).is_err());

        let mut r = request(SENDER, RECEIVER, dec!(0.0000001));
        r.token.decimals = 6;
        assert!(validate(&r).is_err());
    }

    #[test]
    fn test_validate_garbage_address() {
        let err = validate(&request(SENDER, "not-an-address", dec!(1))).unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[test]
    fn test_plan_builds_kind_specific_call() {
        let v = validate(&request(SENDER, RECEIVER, dec!(2))).unwrap();

        let native = TransferPlan::Native.build_call(&v);
        assert_eq!(native.to, v.receiver);
        assert_eq!(native.value, v.raw_amount);
        assert!(native.data.is_empty());

        let kcal = address!("68b2DFC494362AAE300F2C401019205d8960226b");
        let token = TransferPlan::from_kind(TokenKind::Erc20 {
            contract: kcal,
            spender: kcal,
        })
        .build_call(&v);
        assert_eq!(token.to, kcal);
        assert_eq!(token.value, U256::ZERO);
        assert_eq!(token.data, erc20::transfer(v.receiver, v.raw_amount));
    }
}
