//! Criterion benchmarks for FortsRobot hot paths.
//!
//! Benchmarks:
//! 1. Streaming indicators (SMA ring buffer, EMA)
//! 2. Algorithm check loop (Basic, Guppi) over a full series
//! 3. Account execution (alternating reversals)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fortsrobot_core::data::synthetic::{candles_from_closes, random_walk_closes};
use fortsrobot_core::indicators::{Ema, Sma};
use fortsrobot_core::{AccountAggregator, Algorithm, BasicAlgorithm, Candle, GuppiAlgorithm};

const BASIC_WINDOWS: [usize; 18] = [13, 12, 11, 10, 9, 8, 7, 6, 5, 5, 6, 7, 8, 9, 10, 11, 12, 13];
const GUPPI_WINDOWS: [usize; 12] = [3, 5, 8, 10, 12, 15, 30, 35, 40, 45, 50, 60];

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    candles_from_closes(&random_walk_closes(n, 58_000.0, 40.0, 42))
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    let closes = random_walk_closes(10_000, 58_000.0, 40.0, 42);

    for &window in &[5usize, 60] {
        group.bench_with_input(BenchmarkId::new("sma", window), &window, |b, &w| {
            b.iter(|| {
                let mut sma = Sma::new(w);
                for &x in &closes {
                    black_box(sma.update(x));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("ema", window), &window, |b, &w| {
            b.iter(|| {
                let mut ema = Ema::new(w);
                for &x in &closes {
                    black_box(ema.update(x));
                }
            });
        });
    }

    group.finish();
}

// ── 2. Algorithm Loop ────────────────────────────────────────────────

fn run_series(alg: &mut dyn Algorithm, candles: &[Candle]) -> usize {
    candles
        .iter()
        .filter(|c| alg.check(c).is_actionable())
        .count()
}

fn bench_algorithms(c: &mut Criterion) {
    let mut group = c.benchmark_group("algorithm_check");

    for &count in &[1_000usize, 10_000] {
        let candles = make_candles(count);
        group.bench_with_input(BenchmarkId::new("basic_18", count), &candles, |b, candles| {
            b.iter(|| {
                let mut alg = BasicAlgorithm::new(&BASIC_WINDOWS);
                black_box(run_series(&mut alg, black_box(candles)))
            });
        });
        group.bench_with_input(BenchmarkId::new("guppi_12", count), &candles, |b, candles| {
            b.iter(|| {
                let mut alg = GuppiAlgorithm::new(&GUPPI_WINDOWS);
                black_box(run_series(&mut alg, black_box(candles)))
            });
        });
    }

    group.finish();
}

// ── 3. Account ───────────────────────────────────────────────────────

fn bench_account(c: &mut Criterion) {
    let candles = make_candles(10_000);

    c.bench_function("account_reversals_10000", |b| {
        b.iter(|| {
            let mut account = AccountAggregator::new();
            for (i, candle) in candles.iter().enumerate() {
                if i % 2 == 0 {
                    account.buy(1.0 - account.assets(), candle);
                } else {
                    account.sell(1.0 + account.assets(), candle);
                }
            }
            black_box(account.balance())
        });
    });
}

criterion_group!(benches, bench_indicators, bench_algorithms, bench_account);
criterion_main!(benches);
