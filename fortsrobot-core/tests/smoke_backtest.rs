//! End-to-end smoke: source -> algorithm -> account, on synthetic data.

use fortsrobot_core::data::{CandleSource, SyntheticSeries, VecCandleSource};
use fortsrobot_core::{AccountAggregator, Algorithm, BasicAlgorithm, GuppiAlgorithm, Signal};

fn drive(alg: &mut dyn Algorithm, source: &mut dyn CandleSource) -> AccountAggregator {
    let mut account = AccountAggregator::new();
    while source.advance().expect("in-memory source never fails") {
        let Some(candle) = source.current() else {
            break;
        };
        match alg.check(candle) {
            Signal::Buy => account.buy(1.0 - account.assets(), candle),
            Signal::Sell => account.sell(1.0 + account.assets(), candle),
            Signal::Exit => {}
        }
        assert!((-1.0..=1.0).contains(&account.assets()));
    }
    if let Some(last) = source.current() {
        account.close(last);
    }
    account
}

fn trending_series(len: usize) -> SyntheticSeries {
    SyntheticSeries::Sine {
        len,
        period: 80.0,
        amplitude: 100.0,
        base: 1000.0,
    }
}

#[test]
fn basic_five_five_profits_on_trending_series() {
    let mut alg = BasicAlgorithm::new(&[5, 5]);
    let mut source = VecCandleSource::new(trending_series(400).generate());
    let account = drive(&mut alg, &mut source);

    assert!(account.balance() >= 0.0, "balance {}", account.balance());
    assert_eq!(account.assets(), 0.0);
    assert!(!account.fills().is_empty());
}

#[test]
fn guppi_runs_to_completion_and_flattens() {
    let mut alg = GuppiAlgorithm::new(&[3, 5, 8, 10, 12, 15, 30, 35, 40, 45, 50, 60]);
    let mut source = VecCandleSource::new(
        SyntheticSeries::RandomWalk {
            len: 600,
            start: 58_000.0,
            volatility: 40.0,
            seed: 7,
        }
        .generate(),
    );
    let account = drive(&mut alg, &mut source);

    assert_eq!(account.assets(), 0.0);
    assert!(account.balance().is_finite());
    assert_eq!(alg.data().len(), 600);
}

#[test]
fn exhausted_source_keeps_last_candle() {
    let candles = trending_series(5).generate();
    let last = candles[4].clone();
    let mut source = VecCandleSource::new(candles);
    while source.advance().expect("in-memory") {}
    assert!(!source.advance().expect("in-memory"));
    assert_eq!(source.current(), Some(&last));
}
