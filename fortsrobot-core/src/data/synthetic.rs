//! Deterministic synthetic candle series for tests, benches and dry runs.
//!
//! Candles are hourly from 2017-06-01 10:00. Open is the previous close,
//! high/low pad the body by one price unit.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

fn base_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 6, 1)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap_or_default()
}

/// Build hourly candles from a close series.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = base_timestamp();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle::new(
                start + Duration::hours(i as i64),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
            )
            .with_volume(1000)
        })
        .collect()
}

/// Synthetic series description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntheticSeries {
    /// Noise-free sine wave: long swings that favour trend following.
    Sine {
        len: usize,
        period: f64,
        amplitude: f64,
        base: f64,
    },
    /// Seeded random walk with uniform steps in [-volatility, volatility].
    RandomWalk {
        len: usize,
        start: f64,
        volatility: f64,
        seed: u64,
    },
}

impl SyntheticSeries {
    pub fn len(&self) -> usize {
        match self {
            Self::Sine { len, .. } | Self::RandomWalk { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn generate(&self) -> Vec<Candle> {
        match *self {
            Self::Sine {
                len,
                period,
                amplitude,
                base,
            } => candles_from_closes(&sine_closes(len, period, amplitude, base)),
            Self::RandomWalk {
                len,
                start,
                volatility,
                seed,
            } => candles_from_closes(&random_walk_closes(len, start, volatility, seed)),
        }
    }
}

pub fn sine_closes(len: usize, period: f64, amplitude: f64, base: f64) -> Vec<f64> {
    (0..len)
        .map(|i| base + amplitude * (std::f64::consts::TAU * i as f64 / period).sin())
        .collect()
}

/// Seeded random walk, floored at one price unit.
pub fn random_walk_closes(len: usize, start: f64, volatility: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut price = start;
    (0..len)
        .map(|_| {
            price = (price + rng.gen_range(-volatility..=volatility)).max(1.0);
            price
        })
        .collect()
}
