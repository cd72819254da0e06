//! Property-Based Tests - Amount Conversion and Gas Escalation
//!
//! Uses `proptest` to verify that unit scaling is exact and that gas
//! escalation only ever moves the limit upwards.

use alloy::primitives::U256;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use transfer_gateway::domain::gas::GasPolicy;
use transfer_gateway::domain::units::{from_smallest_units, to_smallest_units, UnitsError};

// ── Amount Conversion Properties ────────────────────────────

proptest! {
    /// Amounts no finer than the token precision survive a round trip.
    #[test]
    fn round_trip_preserves_amount(
        mantissa in 0u64..u64::MAX,
        decimals in 0u8..=18,
        scale_seed in 0u32..=18,
    ) {
        let scale = scale_seed.min(u32::from(decimals));
        let amount = Decimal::from_i128_with_scale(i128::from(mantissa), scale);

        let raw = to_smallest_units(amount, decimals).unwrap();
        let back = from_smallest_units(raw, decimals).unwrap();
        prop_assert_eq!(back, amount);
    }

    /// Scaling is linear in the mantissa: m at scale s is m x 10^(d - s).
    #[test]
    fn scaling_is_exact_integer_arithmetic(
        mantissa in 0u64..1_000_000_000_000,
        scale in 0u32..=6,
    ) {
        let amount = Decimal::from_i128_with_scale(i128::from(mantissa), scale);
        let raw = to_smallest_units(amount, 18).unwrap();
        let expected = U256::from(mantissa) * U256::from(10u8).pow(U256::from(18 - scale));
        prop_assert_eq!(raw, expected);
    }

    /// Any balance whose whole part fits a 96-bit mantissa converts.
    #[test]
    fn raw_balances_convert(raw in 0u128..(1u128 << 96), decimals in 0u8..=24) {
        let amount = from_smallest_units(U256::from(raw), decimals).unwrap();
        prop_assert!(amount >= Decimal::ZERO);
    }

    /// Whole parts beyond the decimal range are reported, not truncated.
    #[test]
    fn oversized_balances_are_out_of_range(raw in (1u128 << 96)..u128::MAX) {
        prop_assert_eq!(
            from_smallest_units(U256::from(raw), 0),
            Err(UnitsError::OutOfRange(U256::from(raw)))
        );
    }
}

// ── Gas Escalation Properties ───────────────────────────────

proptest! {
    /// Each escalation raises the limit, and never by less than floor(l x f).
    #[test]
    fn escalation_is_monotonic(estimate in 21_000u64..30_000_000, retries in 1u32..6) {
        let mut policy = GasPolicy::new(dec!(1.2), dec!(1.2), retries);
        policy.seed(estimate);
        policy.apply_margin();

        let mut previous = policy.current_limit().unwrap();
        prop_assert!(previous > estimate);

        for _ in 0..retries {
            policy.escalate();
            let next = policy.current_limit().unwrap();
            prop_assert!(next > previous);
            prop_assert_eq!(next, previous * 6 / 5);
            previous = next;
        }
    }

    /// A policy allows exactly 1 + max_retries sends.
    #[test]
    fn attempts_are_bounded(retries in 0u32..10) {
        let mut policy = GasPolicy::new(dec!(1.2), dec!(1.5), retries);
        policy.seed(50_000);
        policy.apply_margin();

        let mut sends = 0;
        loop {
            policy.record_attempt();
            sends += 1;
            if !policy.can_retry() {
                break;
            }
            policy.escalate();
        }
        prop_assert_eq!(sends, retries + 1);
    }
}
