//! Signal algorithms: stateful, one candle at a time.
//!
//! An algorithm owns its rolling state and an append-only diagnostic matrix
//! (one feature row per processed candle). It never sees account state: the
//! driver decides what to do with the returned [`Signal`].

pub mod basic;
pub mod guppi;

pub use basic::BasicAlgorithm;
pub use guppi::GuppiAlgorithm;

use crate::domain::{Candle, Signal};
use tracing::debug;

/// Result of an `initialize` call.
///
/// Never an error: a mismatched re-initialisation leaves everything as it was,
/// so driver code can call `initialize` unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// No prior parameters; the sequence is stored and its length is now fixed.
    Initialized,
    /// Parameters already stored with the same length; nothing changed.
    Unchanged,
    /// Parameters already stored with a different length; the call was ignored.
    LengthMismatch,
}

/// Ordered window lengths with a length fixed at first initialisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: Option<Vec<usize>>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `parameters` on first use. Later calls never replace them.
    pub fn initialize(&mut self, parameters: &[usize]) -> InitOutcome {
        match &self.values {
            None => {
                self.values = Some(parameters.to_vec());
                InitOutcome::Initialized
            }
            Some(existing) if existing.len() == parameters.len() => InitOutcome::Unchanged,
            Some(existing) => {
                debug!(
                    fixed = existing.len(),
                    requested = parameters.len(),
                    "ignoring re-initialisation with a different parameter count"
                );
                InitOutcome::LengthMismatch
            }
        }
    }

    /// Forget the stored parameters so the next `initialize` may pick a new length.
    pub fn reset(&mut self) {
        self.values = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.values.is_some()
    }

    /// Stored window lengths, empty before initialisation.
    pub fn as_slice(&self) -> &[usize] {
        self.values.as_deref().unwrap_or(&[])
    }

    /// Number of stored windows.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// Append-only sequence of feature rows, one per processed candle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the row for the latest candle. Rows may be empty during warm-up.
    pub fn push(&mut self, row: Vec<f64>) {
        self.rows.push(row);
    }

    /// All rows, oldest first; index `i` belongs to the `i`-th checked candle.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Row of the most recent candle.
    pub fn last(&self) -> Option<&[f64]> {
        self.rows.last().map(|r| r.as_slice())
    }

    /// Number of candles checked so far.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True before the first candle.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as slices, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub(crate) fn clear(&mut self) {
        self.rows.clear();
    }
}

/// Trait for signal algorithms.
///
/// Each instance is driven by a single thread of control: `check` is called
/// exactly once per candle, in timestamp order.
pub trait Algorithm: Send {
    /// Human-readable name (e.g., "basic", "guppi").
    fn name(&self) -> &str;

    /// Fix the window lengths. See [`InitOutcome`] for re-initialisation rules.
    fn initialize(&mut self, parameters: &[usize]) -> InitOutcome;

    /// Clear parameters, rolling state and the feature matrix.
    fn reset(&mut self);

    /// Advance the rolling state by one candle, append a feature row and
    /// return the signal for this candle.
    fn check(&mut self, candle: &Candle) -> Signal;

    fn parameters(&self) -> &[usize];

    /// Diagnostic feature rows produced so far.
    fn data(&self) -> &FeatureMatrix;
}
