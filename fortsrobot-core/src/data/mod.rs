//! Candle sources: the trait the core consumes and its providers.

pub mod delimited;
pub mod source;
pub mod synthetic;

pub use delimited::{DelimitedCandleSource, DelimitedFormat};
pub use source::{CandleSource, SourceError, VecCandleSource};
pub use synthetic::{candles_from_closes, SyntheticSeries};
