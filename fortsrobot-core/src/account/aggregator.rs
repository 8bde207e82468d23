//! Account bookkeeping driven by algorithm signals.
//!
//! Exposure changes go through [`apply_delta`] and are logged as [`Fill`]s.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::Candle;

use super::position::{apply_delta, Position};

/// Direction of an account operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// One executed exposure change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub timestamp: NaiveDateTime,
    pub side: Side,
    /// Signed exposure change actually applied.
    pub exposure_delta: f64,
    pub price: f64,
    pub realized: f64,
    pub exposure_after: f64,
}

/// Single-instrument account: signed exposure plus realised balance.
///
/// Every operation executes at the candle's close. The balance moves only
/// when exposure shrinks or flips sign.
#[derive(Debug, Clone, Default)]
pub struct AccountAggregator {
    position: Position,
    balance: f64,
    fills: Vec<Fill>,
}

impl AccountAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase exposure by `amount`. `1.0 - assets()` targets fully long.
    pub fn buy(&mut self, amount: f64, candle: &Candle) {
        if amount > 0.0 {
            self.execute(Side::Buy, amount, candle);
        }
    }

    /// Decrease exposure by `amount`. `1.0 + assets()` targets fully short.
    pub fn sell(&mut self, amount: f64, candle: &Candle) {
        if amount > 0.0 {
            self.execute(Side::Sell, -amount, candle);
        }
    }

    /// Flatten at the candle's close, realising everything outstanding.
    /// A candle without a usable close leaves the position open.
    pub fn close(&mut self, candle: &Candle) {
        let exposure = self.position.exposure;
        if exposure > 0.0 {
            self.execute(Side::Sell, -exposure, candle);
        } else if exposure < 0.0 {
            self.execute(Side::Buy, -exposure, candle);
        }
    }

    fn execute(&mut self, side: Side, delta: f64, candle: &Candle) {
        let outcome = apply_delta(self.position, delta, candle.close);
        if outcome.applied == 0.0 {
            return;
        }
        self.position = outcome.position;
        self.balance += outcome.realized;

        debug!(
            timestamp = %candle.timestamp,
            ?side,
            delta = outcome.applied,
            price = candle.close,
            realized = outcome.realized,
            exposure = self.position.exposure,
            "fill"
        );

        self.fills.push(Fill {
            timestamp: candle.timestamp,
            side,
            exposure_delta: outcome.applied,
            price: candle.close,
            realized: outcome.realized,
            exposure_after: self.position.exposure,
        });
    }

    /// Current signed exposure in [-1, 1].
    pub fn assets(&self) -> f64 {
        self.position.exposure
    }

    /// Cumulative realised profit/loss.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Open exposure and its average entry price.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Every applied exposure change, oldest first.
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Profit or loss of the open position if it were closed at `price`.
    pub fn unrealized(&self, price: f64) -> f64 {
        self.position.unrealized_pnl(price)
    }

    /// Realised balance plus the open position marked at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.balance + self.unrealized(price)
    }
}
