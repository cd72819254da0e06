//! Metrics and Monitoring Adapters
//!
//! Prometheus registry for transfer observability and the health state
//! behind the /live and /ready probes. Both are served by the HTTP
//! adapter.

pub mod health;
pub mod prometheus;

pub use health::HealthState;
pub use prometheus::MetricsRegistry;
