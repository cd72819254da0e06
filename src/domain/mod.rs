//! Domain layer - Core transfer models and pure logic.
//!
//! No I/O here (hexagonal architecture inner ring). Amount scaling,
//! gas arithmetic and ABI encoding are all testable in isolation.

pub mod erc20;
pub mod error;
pub mod gas;
pub mod token;
pub mod transfer;
pub mod units;

// Re-export core types for convenience
pub use error::TransferError;
pub use gas::GasPolicy;
pub use token::{TokenDescriptor, TokenKind};
pub use transfer::{
    Account, ContractCall, ReceiptInfo, SigningKey, SubmittedTransaction, TransferReceipt,
    TransferRequest, TxStatus,
};
