//! Streaming moving averages.
//!
//! Each indicator holds its own rolling state and is advanced one value at a
//! time, exactly once per candle, by the algorithm that owns it.

pub mod ema;
pub mod sma;

pub use ema::{ema_of_series, Ema};
pub use sma::{sma_of_series, Sma};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
