//! Guppy Multiple Moving Average (GMMA) algorithm.
//!
//! Two groups of EMAs over the close: a short group tracking trader sentiment
//! and a long group tracking investor sentiment. A Buy fires when the short
//! group separates above the long group in bullish order with a widening
//! spread; Sell is symmetric.
//!
//! # Feature row layout (n = parameter count, width 3n - 1)
//! - `[0, n)`: averages, short group then long group, in parameter order
//! - `[n, 2n)`: direction flags per average (1 rose, -1 fell, 0 unchanged)
//! - short group block, `short_count - 1` slots
//! - long group block, `long_count - 1` slots
//! - trend code (1 bullish, 2 bearish, 0 neutral), present when the long group is
//!   not empty
//!
//! A group of k windows gets a block of `k - 1` slots: one local ordering code
//! for each interior average, then the divergence code as the last slot. A
//! local code compares an average with its neighbours: 1 when the three fall in
//! window order, 2 when they rise, 0 otherwise. The divergence code is shared
//! by both blocks: 1 when the short group is bullish while the long group is
//! bearish, 0 for the mirror case, -1 otherwise. With twelve windows split six
//! and six the divergence slots are `2n + 4` and `2n + 9`.
//!
//! Rows stay empty until every EMA is seeded and one more candle has been seen,
//! i.e. for the first `max(windows)` candles.

use crate::domain::{Candle, Signal};
use crate::indicators::Ema;

use super::{Algorithm, FeatureMatrix, InitOutcome, Parameters};

/// Divergence code when the groups are not ordered against each other.
pub const NO_DIVERGENCE: f64 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupOrder {
    Bullish,
    Bearish,
    Mixed,
}

impl GroupOrder {
    fn of(values: &[f64]) -> Self {
        if values.len() < 2 {
            return Self::Mixed;
        }
        if values.windows(2).all(|w| w[0] > w[1]) {
            Self::Bullish
        } else if values.windows(2).all(|w| w[0] < w[1]) {
            Self::Bearish
        } else {
            Self::Mixed
        }
    }

    fn code(self) -> f64 {
        match self {
            Self::Bullish => 1.0,
            Self::Bearish => 2.0,
            Self::Mixed => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    fn code(self) -> f64 {
        match self {
            Self::Bullish => 1.0,
            Self::Bearish => 2.0,
            Self::Neutral => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GroupStats {
    mean: f64,
    min: f64,
    max: f64,
}

impl GroupStats {
    fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        Self {
            mean: sum / values.len() as f64,
            min,
            max,
        }
    }
}

/// Values carried from one candle to the next.
#[derive(Debug, Clone)]
struct Snapshot {
    averages: Vec<f64>,
    spread: f64,
}

#[derive(Debug, Clone, Default)]
pub struct GuppiAlgorithm {
    parameters: Parameters,
    requested_split: Option<usize>,
    short_count: usize,
    averages: Vec<Ema>,
    warmup: usize,
    seen: usize,
    previous: Option<Snapshot>,
    trend: Option<Trend>,
    data: FeatureMatrix,
}

impl GuppiAlgorithm {
    /// First half of `windows` is the short group.
    pub fn new(windows: &[usize]) -> Self {
        let mut alg = Self::default();
        alg.initialize(windows);
        alg
    }

    /// The first `short_count` windows form the short group.
    pub fn with_split(windows: &[usize], short_count: usize) -> Self {
        let mut alg = Self {
            requested_split: Some(short_count),
            ..Self::default()
        };
        alg.initialize(windows);
        alg
    }

    pub fn short_count(&self) -> usize {
        self.short_count
    }

    pub fn long_count(&self) -> usize {
        self.averages.len() - self.short_count
    }

    /// Candles consumed before the first non-empty row.
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Steady-state feature row width.
    pub fn row_width(&self) -> usize {
        let n = self.parameters.len();
        let trend_slot = usize::from(self.long_count() > 0);
        2 * n
            + self.short_count.saturating_sub(1)
            + self.long_count().saturating_sub(1)
            + trend_slot
    }

    /// Row indices of the short and long divergence slots. A group of fewer
    /// than two windows has no slot.
    pub fn divergence_slots(&self) -> (Option<usize>, Option<usize>) {
        let n = self.parameters.len();
        let short_end = 2 * n + self.short_count.saturating_sub(1);
        let long_end = short_end + self.long_count().saturating_sub(1);
        let short = (self.short_count >= 2).then(|| short_end - 1);
        let long = (self.long_count() >= 2).then(|| long_end - 1);
        (short, long)
    }

    fn build_state(&mut self) {
        let windows = self.parameters.as_slice();
        let n = windows.len();
        let requested = self.requested_split.unwrap_or(n / 2);
        self.short_count = if n >= 2 {
            requested.clamp(1, n - 1)
        } else {
            n
        };
        self.averages = windows.iter().map(|&w| Ema::new(w.max(1))).collect();
        self.warmup = windows.iter().map(|&w| w.max(1)).max().unwrap_or(0);
        self.seen = 0;
        self.previous = None;
        self.trend = None;
    }

    fn snapshot(&self, averages: Vec<f64>) -> Snapshot {
        let (short, long) = averages.split_at(self.short_count);
        let spread = GroupStats::of(short).mean - GroupStats::of(long).mean;
        Snapshot { averages, spread }
    }

    fn trend_of(short: &[f64], long: &[f64], spread_change: f64) -> Trend {
        if long.is_empty() {
            return Trend::Neutral;
        }
        let short_stats = GroupStats::of(short);
        let long_stats = GroupStats::of(long);
        // A one-window short group has no internal order to check.
        let short_order = GroupOrder::of(short);
        let ordered = |order: GroupOrder| short.len() < 2 || short_order == order;

        if short_stats.min > long_stats.max && ordered(GroupOrder::Bullish) && spread_change > 0.0 {
            Trend::Bullish
        } else if short_stats.max < long_stats.min
            && ordered(GroupOrder::Bearish)
            && spread_change < 0.0
        {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }

    fn feature_row(&self, current: &Snapshot, previous: &Snapshot, trend: Trend) -> Vec<f64> {
        let (short, long) = current.averages.split_at(self.short_count);
        let divergence = match (GroupOrder::of(short), GroupOrder::of(long)) {
            (GroupOrder::Bullish, GroupOrder::Bearish) => 1.0,
            (GroupOrder::Bearish, GroupOrder::Bullish) => 0.0,
            _ => NO_DIVERGENCE,
        };

        let mut row = Vec::with_capacity(self.row_width());
        row.extend_from_slice(&current.averages);
        row.extend(
            current
                .averages
                .iter()
                .zip(&previous.averages)
                .map(|(now, before)| direction(*now, *before)),
        );
        push_group_block(&mut row, short, divergence);
        push_group_block(&mut row, long, divergence);
        if !long.is_empty() {
            row.push(trend.code());
        }
        row
    }
}

/// Local ordering code of every interior average, then the divergence code.
fn push_group_block(row: &mut Vec<f64>, group: &[f64], divergence: f64) {
    if group.len() < 2 {
        return;
    }
    row.extend(group.windows(3).map(|w| GroupOrder::of(w).code()));
    row.push(divergence);
}

fn direction(now: f64, before: f64) -> f64 {
    if now > before {
        1.0
    } else if now < before {
        -1.0
    } else {
        0.0
    }
}

impl Algorithm for GuppiAlgorithm {
    fn name(&self) -> &str {
        "guppi"
    }

    fn initialize(&mut self, parameters: &[usize]) -> InitOutcome {
        let outcome = self.parameters.initialize(parameters);
        if outcome == InitOutcome::Initialized {
            self.build_state();
        }
        outcome
    }

    fn reset(&mut self) {
        self.parameters.reset();
        self.short_count = 0;
        self.averages.clear();
        self.warmup = 0;
        self.seen = 0;
        self.previous = None;
        self.trend = None;
        self.data.clear();
    }

    fn check(&mut self, candle: &Candle) -> Signal {
        if self.averages.is_empty() {
            self.data.push(Vec::new());
            return Signal::Exit;
        }

        self.seen += 1;
        // Update every EMA before checking whether all of them are seeded.
        let updated: Vec<Option<f64>> = self
            .averages
            .iter_mut()
            .map(|ema| ema.update(candle.close))
            .collect();

        let Some(averages) = updated.into_iter().collect::<Option<Vec<f64>>>() else {
            self.data.push(Vec::new());
            return Signal::Exit;
        };
        let current = self.snapshot(averages);

        let previous = match self.previous.take() {
            Some(previous) if self.seen > self.warmup => previous,
            _ => {
                self.previous = Some(current);
                self.data.push(Vec::new());
                return Signal::Exit;
            }
        };

        let (short, long) = current.averages.split_at(self.short_count);
        let trend = Self::trend_of(short, long, current.spread - previous.spread);
        let row = self.feature_row(&current, &previous, trend);
        self.data.push(row);
        self.previous = Some(current);

        match (self.trend.replace(trend), trend) {
            (Some(prev), Trend::Bullish) if prev != Trend::Bullish => Signal::Buy,
            (Some(prev), Trend::Bearish) if prev != Trend::Bearish => Signal::Sell,
            _ => Signal::Exit,
        }
    }

    fn parameters(&self) -> &[usize] {
        self.parameters.as_slice()
    }

    fn data(&self) -> &FeatureMatrix {
        &self.data
    }
}
