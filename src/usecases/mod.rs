//! Use Cases Layer - Transaction Lifecycle Engine
//!
//! Orchestrates domain logic with the chain client port. Each use case
//! is generic over `C: ChainClient` and holds no shared mutable state
//! across operations.
//!
//! Use cases:
//! - `ConfirmationPoller`: Receipt polling with timeout and cancellation
//! - `GasPolicyEngine`: Estimate, submit, escalate on gas failures
//! - `AllowanceManager`: ERC-20 allowance check and approval
//! - `TransferDispatcher`: Native / ERC-20 transfer orchestration
//! - `BalanceAggregator`: Concurrent per-token balance snapshot
//! - `TokenRegistry`: On-chain verification of token metadata

pub mod allowance;
pub mod balances;
pub mod cancel;
pub mod confirmation;
pub mod dispatcher;
pub mod gas_policy;
pub mod token_registry;

pub use allowance::{AllowanceManager, AllowanceOutcome};
pub use balances::{BalanceAggregator, BalanceOutcome, BalanceSnapshot, TokenBalance};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use confirmation::ConfirmationPoller;
pub use dispatcher::TransferDispatcher;
pub use gas_policy::GasPolicyEngine;
pub use token_registry::{RegistryError, TokenRegistry};
