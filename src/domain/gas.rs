//! Per-submission gas policy state.
//!
//! One `GasPolicy` lives for exactly one transaction lifecycle and is owned
//! by the retry loop driving it. It is never shared between concurrent
//! submissions.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Boost applied to the estimate before the first send.
///
/// Sends at the bare estimate fail more often than not on the reference
/// network.
pub const DEFAULT_SAFETY_MARGIN: Decimal = dec!(1.2);

/// Multiplier applied before each retry.
pub const DEFAULT_ESCALATION_FACTOR: Decimal = dec!(1.2);

/// Retries allowed after the first send.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Mutable gas state threaded through one submission's retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPolicy {
    /// Gas limit for the next send; `None` until estimated.
    current_limit: Option<u64>,
    safety_margin: Decimal,
    escalation_factor: Decimal,
    max_retries: u32,
    /// Sends performed so far.
    attempts: u32,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SAFETY_MARGIN,
            DEFAULT_ESCALATION_FACTOR,
            DEFAULT_MAX_RETRIES,
        )
    }
}

impl GasPolicy {
    /// Fresh policy with no gas limit yet.
    pub const fn new(safety_margin: Decimal, escalation_factor: Decimal, max_retries: u32) -> Self {
        Self {
            current_limit: None,
            safety_margin,
            escalation_factor,
            max_retries,
            attempts: 0,
        }
    }

    /// Start from a caller-supplied limit; estimation is skipped.
    #[must_use]
    pub const fn with_limit(mut self, limit: u64) -> Self {
        self.current_limit = Some(limit);
        self
    }

    pub const fn current_limit(&self) -> Option<u64> {
        self.current_limit
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Seed the limit from an estimate (only if none is set).
    pub fn seed(&mut self, estimate: u64) {
        if self.current_limit.is_none() {
            self.current_limit = Some(estimate);
        }
    }

    /// Apply the safety margin once before the first send.
    pub fn apply_margin(&mut self) {
        self.current_limit = self.current_limit.map(|l| scale(l, self.safety_margin));
    }

    /// Apply the escalation factor ahead of a retry.
    pub fn escalate(&mut self) {
        self.current_limit = self.current_limit.map(|l| scale(l, self.escalation_factor));
    }

    /// Record a send and return the limit it used.
    pub fn record_attempt(&mut self) -> u64 {
        self.attempts += 1;
        self.current_limit.unwrap_or_default()
    }

    /// Whether another send is allowed after the ones recorded.
    pub const fn can_retry(&self) -> bool {
        self.attempts <= self.max_retries
    }
}

/// `floor(limit × factor)`, saturating at `u64::MAX`.
fn scale(limit: u64, factor: Decimal) -> u64 {
    Decimal::from(limit)
        .checked_mul(factor)
        .and_then(|v| v.floor().to_u64())
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_then_escalation() {
        let mut p = GasPolicy::default();
        p.seed(100_000);
        p.apply_margin();
        assert_eq!(p.current_limit(), Some(120_000));
        p.escalate();
        assert_eq!(p.current_limit(), Some(144_000));
        p.escalate();
        assert_eq!(p.current_limit(), Some(172_800));
    }

    #[test]
    fn test_floor_each_step() {
        let mut p = GasPolicy::default();
        p.seed(21_001);
        p.apply_margin();
        // 25201.2 -> 25201
        assert_eq!(p.current_limit(), Some(25_201));
    }

    #[test]
    fn test_seed_keeps_explicit_limit() {
        let mut p = GasPolicy::default().with_limit(50_000);
        p.seed(10);
        assert_eq!(p.current_limit(), Some(50_000));
    }

    #[test]
    fn test_retry_budget() {
        let mut p = GasPolicy::default().with_limit(1);
        assert!(p.can_retry());
        p.record_attempt();
        assert!(p.can_retry());
        p.record_attempt();
        assert!(p.can_retry());
        p.record_attempt();
        assert!(!p.can_retry());
        assert_eq!(p.attempts(), 3);
    }

    #[test]
    fn test_saturates() {
        let mut p = GasPolicy::default().with_limit(u64::MAX);
        p.escalate();
        assert_eq!(p.current_limit(), Some(u64::MAX));
    }
}
