//! Account simulation: signed exposure, realised balance, fill log.

pub mod aggregator;
pub mod position;

pub use aggregator::{AccountAggregator, Fill, Side};
pub use position::{apply_delta, FillOutcome, Position, EXPOSURE_EPSILON};
