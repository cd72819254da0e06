//! Gateway API Request/Response Types
//!
//! Serialization types for the JSON HTTP surface. Requests carry string
//! addresses and decimal amounts; validation happens in the dispatcher.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::token::TokenDescriptor;
use crate::domain::transfer::{Account, SigningKey, TransferReceipt, TransferRequest};

/// Sender credentials for one request. Never stored.
#[derive(Deserialize)]
pub struct SenderBody {
    pub address: String,
    pub private_key: String,
}

/// `POST /transfer` payload.
#[derive(Deserialize)]
pub struct TransferBody {
    pub sender: SenderBody,
    pub receiver_address: String,
    /// Decimal amount, as a JSON string or number.
    pub amount: Decimal,
    /// Configured token name (case-insensitive).
    pub token: String,
}

impl TransferBody {
    /// Bind the payload to a resolved token.
    pub fn into_request(self, token: TokenDescriptor) -> TransferRequest {
        TransferRequest {
            sender: Account::new(self.sender.address, SigningKey::new(self.sender.private_key)),
            receiver_address: self.receiver_address,
            amount: self.amount,
            token,
        }
    }
}

/// Transaction summary returned for a successful transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub operation_id: String,
    pub tx_hash: String,
    pub is_succeeded: bool,
    pub block_number: Option<u64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub token: String,
    pub amount: Decimal,
    pub raw_amount: String,
    pub gas_limit: u64,
    pub gas_used: Option<u64>,
    pub cumulative_gas_used: Option<u64>,
    pub effective_gas_price: Option<String>,
    /// Fee in native units.
    pub fee: Option<Decimal>,
    pub attempts: u32,
    pub approval_tx_hash: Option<String>,
    pub completed_at: String,
}

impl From<TransferReceipt> for TransferResponse {
    fn from(r: TransferReceipt) -> Self {
        let receipt = r.transaction.receipt.unwrap_or_default();
        Self {
            operation_id: r.operation_id.to_string(),
            tx_hash: r.transaction.hash.to_string(),
            is_succeeded: r.succeeded,
            block_number: r.transaction.block_number,
            from: receipt.from.map(|a| a.to_string()),
            to: receipt.to.map(|a| a.to_string()),
            token: r.token,
            amount: r.amount,
            raw_amount: r.raw_amount.to_string(),
            gas_limit: r.transaction.gas_limit,
            gas_used: receipt.gas_used,
            cumulative_gas_used: receipt.cumulative_gas_used,
            effective_gas_price: receipt.effective_gas_price.map(|p| p.to_string()),
            fee: r.fee,
            attempts: r.transaction.attempts,
            approval_tx_hash: r.approval.map(|h| h.to_string()),
            completed_at: r.completed_at.to_rfc3339(),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error kind label.
    pub error: &'static str,
    pub message: String,
    /// Hash of the transaction involved, when one was broadcast.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}
