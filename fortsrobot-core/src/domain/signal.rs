//! Discrete trading decision emitted once per candle.

use serde::{Deserialize, Serialize};

/// Answer of a signal algorithm for one candle.
///
/// `Exit` means "no actionable position change this candle". It does not by
/// itself mean "flatten"; what a driver does with it is an execution policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Exit,
}

impl Signal {
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Buy | Self::Sell)
    }
}
