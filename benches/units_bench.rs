//! Amount and Calldata Benchmarks - Transfer Hot Path
//!
//! Benchmarks the pure domain work done on every transfer request:
//! decimal scaling, balance conversion and ERC-20 calldata encoding.
//!
//! Run with: cargo bench --bench units_bench

use alloy::primitives::{address, U256};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal_macros::dec;

use transfer_gateway::domain::erc20;
use transfer_gateway::domain::gas::GasPolicy;
use transfer_gateway::domain::units::{from_smallest_units, to_smallest_units};

/// Benchmark scaling a human amount to 18-decimal base units.
fn bench_to_smallest_units(c: &mut Criterion) {
    c.bench_function("to_smallest_units_18", |b| {
        b.iter(|| {
            let _raw = to_smallest_units(black_box(dec!(123.456789)), black_box(18));
        });
    });
}

/// Benchmark converting a raw balance back to a decimal.
fn bench_from_smallest_units(c: &mut Criterion) {
    let raw = U256::from(123_456_789_000_000_000_000u128);

    c.bench_function("from_smallest_units_18", |b| {
        b.iter(|| {
            let _amount = from_smallest_units(black_box(raw), black_box(18));
        });
    });
}

/// Benchmark `transfer(to, amount)` calldata encoding.
fn bench_transfer_calldata(c: &mut Criterion) {
    let to = address!("2222222222222222222222222222222222222222");
    let amount = U256::from(42_000_000u64);

    c.bench_function("erc20_transfer_calldata", |b| {
        b.iter(|| {
            let _data = erc20::transfer(black_box(to), black_box(amount));
        });
    });
}

/// Benchmark a full margin plus two escalations.
fn bench_gas_escalation(c: &mut Criterion) {
    c.bench_function("gas_margin_and_two_escalations", |b| {
        b.iter(|| {
            let mut policy = GasPolicy::default();
            policy.seed(black_box(100_000));
            policy.apply_margin();
            policy.escalate();
            policy.escalate();
            policy.current_limit()
        });
    });
}

criterion_group!(
    benches,
    bench_to_smallest_units,
    bench_from_smallest_units,
    bench_transfer_calldata,
    bench_gas_escalation,
);
criterion_main!(benches);
