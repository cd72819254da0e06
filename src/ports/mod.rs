//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the usecases layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ChainClient`: Signed submission, receipts and contract reads

pub mod chain_client;

pub use chain_client::{ChainClient, ChainError};
