//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies and exposes the use cases to the outside.
//!
//! Adapter categories:
//! - `chain`: EVM interaction via alloy-rs
//! - `http`: JSON API, probes and metrics endpoint (axum)
//! - `metrics`: Prometheus metrics and health state

pub mod chain;
pub mod http;
pub mod metrics;
