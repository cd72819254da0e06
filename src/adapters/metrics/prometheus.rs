//! Prometheus Metrics Registry - Transfer Observability
//!
//! Registers the gateway's Prometheus metrics and renders them in the
//! text exposition format for the `/metrics` route. Covers transfer
//! outcomes, gas send attempts, end-to-end transfer latency and balance
//! query failures.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::usecases::balances::{BalanceOutcome, BalanceSnapshot};

/// Centralized Prometheus metrics for the gateway.
///
/// All metrics follow the naming convention `transfer_gateway_*` and
/// carry a token label for per-token filtering.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Transfers by token and outcome (`succeeded` or an error kind).
    pub transfers_total: IntCounterVec,
    /// Sends used per successful transfer (1 = no escalation).
    pub gas_attempts: HistogramVec,
    /// Wall time from request to final receipt (seconds).
    pub transfer_latency_secs: HistogramVec,
    /// Per-token balance query failures, by error kind.
    pub balance_query_failures: IntCounterVec,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let transfers_total = IntCounterVec::new(
            Opts::new("transfer_gateway_transfers_total", "Transfers by outcome"),
            &["token", "outcome"],
        )?;

        let gas_attempts = HistogramVec::new(
            HistogramOpts::new(
                "transfer_gateway_gas_attempts",
                "Send attempts per confirmed transfer",
            )
            .buckets(vec![1.0, 2.0, 3.0, 4.0, 6.0]),
            &["token"],
        )?;

        let transfer_latency_secs = HistogramVec::new(
            HistogramOpts::new(
                "transfer_gateway_transfer_latency_seconds",
                "Time from request to final receipt",
            )
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
            &["token"],
        )?;

        let balance_query_failures = IntCounterVec::new(
            Opts::new(
                "transfer_gateway_balance_query_failures_total",
                "Failed per-token balance queries",
            ),
            &["token", "kind"],
        )?;

        registry.register(Box::new(transfers_total.clone()))?;
        registry.register(Box::new(gas_attempts.clone()))?;
        registry.register(Box::new(transfer_latency_secs.clone()))?;
        registry.register(Box::new(balance_query_failures.clone()))?;

        Ok(Self {
            registry,
            transfers_total,
            gas_attempts,
            transfer_latency_secs,
            balance_query_failures,
        })
    }

    /// Count one finished transfer.
    pub fn record_transfer(&self, token: &str, outcome: &str, elapsed_secs: f64) {
        self.transfers_total.with_label_values(&[token, outcome]).inc();
        self.transfer_latency_secs
            .with_label_values(&[token])
            .observe(elapsed_secs);
    }

    pub fn record_gas_attempts(&self, token: &str, attempts: u32) {
        self.gas_attempts
            .with_label_values(&[token])
            .observe(f64::from(attempts));
    }

    /// Count the failed rows of a balance snapshot.
    pub fn record_snapshot(&self, snapshot: &BalanceSnapshot) {
        for row in &snapshot.balances {
            if let BalanceOutcome::Failed { kind, .. } = &row.outcome {
                self.balance_query_failures
                    .with_label_values(&[row.token.name.as_str(), *kind])
                    .inc();
            }
        }
    }

    /// Render every registered metric in the text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::Address;
    use chrono::Utc;

    use crate::domain::token::TokenDescriptor;
    use crate::usecases::balances::TokenBalance;

    #[test]
    fn test_render_contains_recorded_series() {
        let metrics = MetricsRegistry::new().unwrap();
        metrics.record_transfer("KCAL", "succeeded", 3.5);
        metrics.record_transfer("KCAL", "gas_allowance_exceeded", 9.0);
        metrics.record_gas_attempts("KCAL", 2);

        let text = metrics.render().unwrap();
        assert!(text.contains("transfer_gateway_transfers_total"));
        assert!(text.contains("outcome=\"gas_allowance_exceeded\""));
        assert!(text.contains("transfer_gateway_gas_attempts_bucket"));
    }

    #[test]
    fn test_snapshot_failures_counted() {
        let metrics = MetricsRegistry::new().unwrap();
        let snapshot = BalanceSnapshot {
            address: Address::ZERO,
            balances: vec![TokenBalance {
                token: TokenDescriptor::native("FITFI"),
                outcome: BalanceOutcome::Failed {
                    kind: "timeout",
                    error: "slow".into(),
                },
            }],
            taken_at: Utc::now(),
        };
        metrics.record_snapshot(&snapshot);

        assert_eq!(
            metrics
                .balance_query_failures
                .with_label_values(&["FITFI", "timeout"])
                .get(),
            1
        );
    }
}
