//! Chain Adapters - EVM Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management with chain-id validation
//! - Signed legacy transactions from caller-supplied keys
//! - Receipt mapping and node error classification

pub mod client;
pub mod provider;

pub use client::AlloyChainClient;
pub use provider::RpcProvider;
