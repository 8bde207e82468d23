//! Basic moving-average crossover algorithm.
//!
//! Windows come in fast/slow pairs: the first half of the parameters are fast
//! close SMAs, the second half are convergence lines, each an SMA of its paired
//! fast average. Buy fires when every fast line moves above its convergence
//! line, Sell when every fast line moves below it.
//!
//! Averages are reported from the first candle using the partial history
//! available; signals wait until every window is full.

use crate::domain::{Candle, Signal};
use crate::indicators::Sma;

use super::{Algorithm, FeatureMatrix, InitOutcome, Parameters};

/// Relation of all fast lines to their convergence lines on one candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Bullish,
    Bearish,
    Mixed,
}

#[derive(Debug, Clone, Default)]
pub struct BasicAlgorithm {
    parameters: Parameters,
    fast: Vec<Sma>,
    slow: Vec<Sma>,
    /// Trailing window of an odd-length parameter set: reported, never crossed.
    unpaired: Option<Sma>,
    relation: Option<Relation>,
    data: FeatureMatrix,
}

impl BasicAlgorithm {
    pub fn new(windows: &[usize]) -> Self {
        let mut alg = Self::default();
        alg.initialize(windows);
        alg
    }

    /// Number of fast/slow pairs taking part in the crossover.
    pub fn pair_count(&self) -> usize {
        self.fast.len()
    }

    /// Feature row width: close plus one value per window.
    pub fn row_width(&self) -> usize {
        1 + self.parameters.len()
    }

    fn build_state(&mut self) {
        let windows = self.parameters.as_slice();
        let pairs = windows.len() / 2;
        self.fast = windows[..pairs].iter().map(|&w| Sma::new(w.max(1))).collect();
        self.slow = windows[pairs..2 * pairs]
            .iter()
            .map(|&w| Sma::new(w.max(1)))
            .collect();
        self.unpaired = windows.get(2 * pairs).map(|&w| Sma::new(w.max(1)));
        self.relation = None;
    }

    fn is_warm(&self) -> bool {
        self.fast.iter().chain(&self.slow).all(Sma::is_full)
            && self.unpaired.as_ref().map_or(true, Sma::is_full)
    }

    fn classify(fast: &[f64], slow: &[f64]) -> Relation {
        let mut pairs = fast.iter().zip(slow);
        if pairs.clone().all(|(f, s)| f > s) {
            Relation::Bullish
        } else if pairs.all(|(f, s)| f < s) {
            Relation::Bearish
        } else {
            Relation::Mixed
        }
    }
}

impl Algorithm for BasicAlgorithm {
    fn name(&self) -> &str {
        "basic"
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
        self.fast.clear();
        self.slow.clear();
        self.unpaired = None;
        self.relation = None;
        self.data.clear();
    }

    fn check(&mut self, candle: &Candle) -> Signal {
        let close = candle.close;
        let fast: Vec<f64> = self.fast.iter_mut().map(|sma| sma.update(close)).collect();
        let slow: Vec<f64> = self
            .slow
            .iter_mut()
            .zip(&fast)
            .map(|(sma, &f)| sma.update(f))
            .collect();
        let unpaired = self.unpaired.as_mut().map(|sma| sma.update(close));

        let mut row = Vec::with_capacity(self.row_width());
        row.push(close);
        row.extend_from_slice(&fast);
        row.extend_from_slice(&slow);
        row.extend(unpaired);
        self.data.push(row);

        if fast.is_empty() || !self.is_warm() {
            return Signal::Exit;
        }

        let current = Self::classify(&fast, &slow);
        match (self.relation.replace(current), current) {
            (Some(prev), Relation::Bullish) if prev != Relation::Bullish => Signal::Buy,
            (Some(prev), Relation::Bearish) if prev != Relation::Bearish => Signal::Sell,
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
