//! Transfer domain types.
//!
//! Exposes two API surfaces:
//! - Caller-facing request types (string addresses, decimal amounts)
//! - Chain-facing call and receipt types (typed addresses, base units)

use alloy::primitives::{Address, Bytes, TxHash, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::token::TokenDescriptor;

// ────────────────────────────────────────────
// Caller-facing types
// ────────────────────────────────────────────

/// Opaque signing secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(String);

impl SigningKey {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for the signer only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Caller-owned account. Passed into each operation, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
    pub signing_key: SigningKey,
}

impl Account {
    pub fn new(address: impl Into<String>, signing_key: SigningKey) -> Self {
        Self {
            address: address.into(),
            signing_key,
        }
    }
}

/// A request to move `amount` of `token` from `sender` to `receiver_address`.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub sender: Account,
    pub receiver_address: String,
    /// Human-readable amount, scaled by the token's decimals on dispatch.
    pub amount: Decimal,
    pub token: TokenDescriptor,
}

// ────────────────────────────────────────────
// Chain-facing types
// ────────────────────────────────────────────

/// A state-changing call ready for estimation and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    pub from: Address,
    /// Receiver for native transfers, contract for token calls.
    pub to: Address,
    /// Native value attached, zero for contract calls.
    pub value: U256,
    pub data: Bytes,
}

impl ContractCall {
    /// Plain value transfer, no calldata.
    pub fn native_transfer(from: Address, to: Address, value: U256) -> Self {
        Self {
            from,
            to,
            value,
            data: Bytes::new(),
        }
    }

    /// Contract invocation carrying no native value.
    pub const fn contract(from: Address, contract: Address, data: Bytes) -> Self {
        Self {
            from,
            to: contract,
            value: U256::ZERO,
            data,
        }
    }
}

/// Receipt as reported by the chain client.
///
/// `block_number == None` means the transaction is not yet included
/// (or the node does not know it yet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiptInfo {
    pub block_number: Option<u64>,
    /// On-chain execution outcome flag.
    pub success: bool,
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub gas_used: Option<u64>,
    pub cumulative_gas_used: Option<u64>,
    /// Wei per gas actually paid.
    pub effective_gas_price: Option<u128>,
}

impl ReceiptInfo {
    /// A receipt that has not been included yet.
    pub fn pending() -> Self {
        Self::default()
    }

    pub const fn is_included(&self) -> bool {
        self.block_number.is_some()
    }

    /// Total fee in wei, if the node reported gas usage and price.
    pub fn fee_wei(&self) -> Option<U256> {
        let used = self.gas_used?;
        let price = self.effective_gas_price?;
        U256::from(used).checked_mul(U256::from(price))
    }
}

/// Lifecycle state of a broadcast transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Succeeded,
    Failed,
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// A broadcast transaction and what is known about it.
///
/// Moves from `Pending` to a terminal status exactly once, via [`Self::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedTransaction {
    pub hash: TxHash,
    pub status: TxStatus,
    pub block_number: Option<u64>,
    /// Gas limit the transaction was sent with.
    pub gas_limit: u64,
    /// Sends made for this submission, including rejected ones.
    pub attempts: u32,
    /// Final receipt, present once resolved.
    pub receipt: Option<ReceiptInfo>,
}

impl SubmittedTransaction {
    pub const fn pending(hash: TxHash, gas_limit: u64) -> Self {
        Self {
            hash,
            status: TxStatus::Pending,
            block_number: None,
            gas_limit,
            attempts: 1,
            receipt: None,
        }
    }

    /// Resolve from an included receipt. A resolved transaction is returned
    /// unchanged; a receipt without a block number leaves it pending.
    #[must_use]
    pub fn resolve(self, receipt: ReceiptInfo) -> Self {
        if self.status != TxStatus::Pending || !receipt.is_included() {
            return self;
        }
        Self {
            status: if receipt.success {
                TxStatus::Succeeded
            } else {
                TxStatus::Failed
            },
            block_number: receipt.block_number,
            receipt: Some(receipt),
            ..self
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status != TxStatus::Pending
    }
}

/// Result of a completed transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferReceipt {
    /// Correlates logs for one transfer operation.
    pub operation_id: Uuid,
    pub token: String,
    pub amount: Decimal,
    /// Amount in token base units.
    pub raw_amount: U256,
    pub transaction: SubmittedTransaction,
    /// Approval sent ahead of a token transfer, if one was needed.
    pub approval: Option<TxHash>,
    /// Receipt success flag re-read after confirmation.
    pub succeeded: bool,
    /// Fee paid in native units.
    pub fee: Option<Decimal>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn included(success: bool) -> ReceiptInfo {
        ReceiptInfo {
            block_number: Some(10),
            success,
            ..ReceiptInfo::default()
        }
    }

    #[test]
    fn test_signing_key_redacted() {
        let key = SigningKey::new("0xdeadbeef");
        assert_eq!(format!("{key:?}"), "SigningKey(***)");
        let acct = Account::new("0xabc", key);
        assert!(!format!("{acct:?}").contains("deadbeef"));
    }

    #[test]
    fn test_resolve_success_and_failure() {
        let tx = SubmittedTransaction::pending(TxHash::ZERO, 21_000);
        let ok = tx.clone().resolve(included(true));
        assert_eq!(ok.status, TxStatus::Succeeded);
        assert_eq!(ok.block_number, Some(10));

        let failed = tx.resolve(included(false));
        assert_eq!(failed.status, TxStatus::Failed);
    }

    #[test]
    fn test_resolve_only_once() {
        let tx = SubmittedTransaction::pending(TxHash::ZERO, 21_000).resolve(included(false));
        let again = tx.clone().resolve(included(true));
        assert_eq!(again, tx);
    }

    #[test]
    fn test_pending_receipt_keeps_pending() {
        let tx = SubmittedTransaction::pending(TxHash::ZERO, 21_000).resolve(ReceiptInfo::pending());
        assert_eq!(tx.status, TxStatus::Pending);
        assert!(!tx.is_resolved());
    }

    #[test]
    fn test_fee_wei() {
        let r = ReceiptInfo {
            gas_used: Some(21_000),
            effective_gas_price: Some(1_000_000_000),
            ..ReceiptInfo::default()
        };
        assert_eq!(r.fee_wei(), Some(U256::from(21_000_000_000_000u64)));
        assert_eq!(ReceiptInfo::pending().fee_wei(), None);
    }
}
