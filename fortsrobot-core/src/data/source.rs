//! Candle source trait and structured error types.
//!
//! The `CandleSource` trait abstracts over where candles come from (a
//! delimited text export, an in-memory series, a generator) so the driver
//! loop and the algorithms never depend on a concrete provider.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::domain::Candle;

/// Errors a candle source can report while advancing.
///
/// Line numbers are 1-based positions in the underlying file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("delimited read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: missing column '{column}'")]
    MissingColumn { line: u64, column: &'static str },

    #[error("line {line}: invalid number '{value}' in column '{column}'")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: invalid timestamp '{value}'")]
    InvalidTimestamp { line: u64, value: String },

    #[error("line {line}: timestamp {current} does not follow {previous}")]
    OutOfOrder {
        line: u64,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },
}

/// Lazy, finite, forward-only sequence of candles in strictly increasing
/// timestamp order.
///
/// A source is restarted by constructing a new one.
pub trait CandleSource {
    /// Move to the next candle. `Ok(false)` at end of stream.
    fn advance(&mut self) -> Result<bool, SourceError>;

    /// The last produced candle. Stays readable after end of stream.
    fn current(&self) -> Option<&Candle>;
}

/// In-memory candle source over an owned series.
#[derive(Debug, Clone)]
pub struct VecCandleSource {
    candles: Vec<Candle>,
    /// Index of the next candle to produce.
    next: usize,
}

impl VecCandleSource {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

impl From<Vec<Candle>> for VecCandleSource {
    fn from(candles: Vec<Candle>) -> Self {
        Self::new(candles)
    }
}

impl CandleSource for VecCandleSource {
    fn advance(&mut self) -> Result<bool, SourceError> {
        if self.next < self.candles.len() {
            self.next += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn current(&self) -> Option<&Candle> {
        self.next.checked_sub(1).and_then(|i| self.candles.get(i))
    }
}
