//! Amount conversion between human decimals and on-chain base units.
//!
//! Amounts are scaled as integers: the decimal's mantissa is rounded to the
//! token precision and multiplied by a power of ten in `U256`, so no
//! floating-point value ever touches a token amount.

use alloy::primitives::U256;
use rust_decimal::prelude::*;
use thiserror::Error;

/// Highest precision `Decimal` can represent after the point.
const MAX_DECIMAL_SCALE: u8 = 28;

/// Highest token precision for which `10^decimals` fits in `U256`.
const MAX_TOKEN_DECIMALS: u8 = 77;

/// Conversion failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount must not be negative, got {0}")]
    Negative(Decimal),

    #[error("amount {amount} overflows the 256-bit domain at {decimals} decimals")]
    Overflow { amount: Decimal, decimals: u8 },

    #[error("balance {0} exceeds decimal range")]
    OutOfRange(U256),

    #[error("unsupported token precision: {0} decimals")]
    UnsupportedDecimals(u8),
}

fn pow10(exp: u8) -> Result<U256, UnitsError> {
    if exp > MAX_TOKEN_DECIMALS {
        return Err(UnitsError::UnsupportedDecimals(exp));
    }
    U256::from(10u8)
        .checked_pow(U256::from(exp))
        .ok_or(UnitsError::UnsupportedDecimals(exp))
}

/// `round(amount × 10^decimals)` computed exactly, half away from zero.
pub fn to_smallest_units(amount: Decimal, decimals: u8) -> Result<U256, UnitsError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(UnitsError::Negative(amount));
    }

    let target_scale = u32::from(decimals.min(MAX_DECIMAL_SCALE));
    let rounded = if amount.scale() > target_scale {
        amount.round_dp_with_strategy(target_scale, RoundingStrategy::MidpointAwayFromZero)
    } else {
        amount
    };

    // scale <= decimals here, so the remaining exponent is non-negative
    let mantissa = rounded.mantissa().unsigned_abs();
    let exponent = u32::from(decimals) - rounded.scale();
    let factor = pow10(u8::try_from(exponent).map_err(|_| UnitsError::UnsupportedDecimals(decimals))?)?;

    U256::from(mantissa)
        .checked_mul(factor)
        .ok_or(UnitsError::Overflow { amount, decimals })
}

/// Inverse of [`to_smallest_units`].
///
/// Precision beyond 28 fractional digits is truncated, which only matters
/// for tokens with more than 28 decimals.
pub fn from_smallest_units(raw: U256, decimals: u8) -> Result<Decimal, UnitsError> {
    let base = pow10(decimals)?;
    let whole = raw / base;
    let remainder = raw % base;

    let whole = u128::try_from(whole)
        .ok()
        .and_then(|w| i128::try_from(w).ok())
        .and_then(|w| Decimal::try_from_i128_with_scale(w, 0).ok())
        .ok_or(UnitsError::OutOfRange(raw))?;

    let kept = decimals.min(MAX_DECIMAL_SCALE);
    let dropped = pow10(decimals - kept)?;
    // remainder / 10^(decimals - kept) < 10^28, fits i128
    let fraction = u128::try_from(remainder / dropped)
        .ok()
        .and_then(|f| i128::try_from(f).ok())
        .and_then(|f| Decimal::try_from_i128_with_scale(f, u32::from(kept)).ok())
        .ok_or(UnitsError::OutOfRange(raw))?;

    whole
        .checked_add(fraction)
        .map(|d| d.normalize())
        .ok_or(UnitsError::OutOfRange(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_one_wei() {
        let raw = to_smallest_units(dec!(0.000000000000000001), 18).unwrap();
        assert_eq!(raw, U256::from(1u8));
        assert_eq!(from_smallest_units(raw, 18).unwrap(), dec!(0.000000000000000001));
    }

    #[test]
    fn test_whole_and_fraction() {
        let raw = to_smallest_units(dec!(123.456789), 18).unwrap();
        assert_eq!(raw, U256::from(123_456_789_000_000_000_000u128));
        assert_eq!(from_smallest_units(raw, 18).unwrap(), dec!(123.456789));

        let raw = to_smallest_units(dec!(1), 18).unwrap();
        assert_eq!(raw, U256::from(10u8).pow(U256::from(18u8)));
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(to_smallest_units(dec!(1.2345), 3).unwrap(), U256::from(1235u32));
        assert_eq!(to_smallest_units(dec!(1.2344), 3).unwrap(), U256::from(1234u32));
        assert_eq!(to_smallest_units(dec!(0.0000001), 6).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(to_smallest_units(dec!(42), 0).unwrap(), U256::from(42u8));
        assert_eq!(from_smallest_units(U256::from(42u8), 0).unwrap(), dec!(42));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(
            to_smallest_units(dec!(-1), 18),
            Err(UnitsError::Negative(_))
        ));
    }

    #[test]
    fn test_overflow_detected() {
        // 7.9e28 * 10^60 > 2^256
        let err = to_smallest_units(Decimal::MAX, 60).unwrap_err();
        assert!(matches!(err, UnitsError::Overflow { decimals: 60, .. }));
    }

    #[test]
    fn test_unsupported_precision() {
        assert_eq!(
            from_smallest_units(U256::from(1u8), 80),
            Err(UnitsError::UnsupportedDecimals(80))
        );
    }

    #[test]
    fn test_max_balance_out_of_range() {
        assert!(matches!(
            from_smallest_units(U256::MAX, 0),
            Err(UnitsError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_six_decimal_token() {
        let raw = U256::from(42_000_000u64);
        assert_eq!(from_smallest_units(raw, 6).unwrap(), dec!(42));
    }
}
