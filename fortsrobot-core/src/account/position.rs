//! Signed exposure and the pure realisation rule.

use serde::{Deserialize, Serialize};

/// Exposures closer to zero than this are treated as flat.
pub const EXPOSURE_EPSILON: f64 = 1e-12;

/// Open exposure in [-1, 1] and its weighted-average entry price.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub exposure: f64,
    pub entry_price: f64,
}

impl Position {
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.exposure == 0.0
    }

    pub fn is_long(&self) -> bool {
        self.exposure > 0.0
    }

    pub fn is_short(&self) -> bool {
        self.exposure < 0.0
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.exposure * (current_price - self.entry_price)
    }
}

/// Result of applying an exposure change at one price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillOutcome {
    pub position: Position,
    /// Exposure change actually applied after clamping to [-1, 1].
    pub applied: f64,
    /// PnL realised by the closed portion.
    pub realized: f64,
}

/// Apply `delta` exposure at `price`.
///
/// Increasing magnitude re-weights the entry price. Reducing magnitude
/// realises the closed part against the entry price and keeps it. Crossing
/// zero realises the whole old exposure and opens the remainder at `price`.
pub fn apply_delta(position: Position, delta: f64, price: f64) -> FillOutcome {
    let unchanged = FillOutcome {
        position,
        applied: 0.0,
        realized: 0.0,
    };
    if !delta.is_finite() || !price.is_finite() {
        return unchanged;
    }

    let old = position.exposure;
    let mut target = (old + delta).clamp(-1.0, 1.0);
    if target.abs() < EXPOSURE_EPSILON {
        target = 0.0;
    }
    let applied = target - old;
    if applied == 0.0 {
        return unchanged;
    }

    if old == 0.0 || old.signum() == applied.signum() {
        let entry_price = (old.abs() * position.entry_price + applied.abs() * price) / target.abs();
        return FillOutcome {
            position: Position {
                exposure: target,
                entry_price,
            },
            applied,
            realized: 0.0,
        };
    }

    let closed = applied.abs().min(old.abs());
    let realized = closed * (price - position.entry_price) * old.signum();
    let position = if target == 0.0 {
        Position::flat()
    } else if target.signum() == old.signum() {
        Position {
            exposure: target,
            entry_price: position.entry_price,
        }
    } else {
        Position {
            exposure: target,
            entry_price: price,
        }
    };

    FillOutcome {
        position,
        applied,
        realized,
    }
}
