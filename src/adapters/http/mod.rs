//! Gateway HTTP Adapter
//!
//! JSON API over the transfer and balance use cases, plus probes and
//! metrics, served with axum 0.7.
//!
//! Sub-modules:
//! - `error`: `TransferError` to status code mapping
//! - `server`: router, handlers and shared state
//! - `types`: request/response bodies

pub mod error;
pub mod server;
pub mod types;

pub use server::{router, serve, AppState};
