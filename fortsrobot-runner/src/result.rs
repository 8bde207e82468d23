//! Backtest result and its JSON artifact.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use fortsrobot_core::account::Fill;
use fortsrobot_core::Signal;

use crate::config::RunId;
use crate::runner::RunError;

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of candles answered with each signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub exit: usize,
}

impl SignalCounts {
    pub fn record(&mut self, signal: Signal) {
        match signal {
            Signal::Buy => self.buy += 1,
            Signal::Sell => self.sell += 1,
            Signal::Exit => self.exit += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.buy + self.sell + self.exit
    }
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub algorithm: String,
    pub parameters: Vec<usize>,
    pub candle_count: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub signals: SignalCounts,
    pub fill_count: usize,
    /// Realised balance, in price units per unit of exposure.
    pub final_balance: f64,
    pub final_exposure: f64,
    /// Balance plus the open position marked at the last close.
    pub final_equity: f64,
    pub fills: Vec<Fill>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Write `<run_id>.json` into `dir`, creating it if needed.
pub fn save_result(dir: impl AsRef<Path>, result: &BacktestResult) -> Result<PathBuf, RunError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|source| RunError::Artifact {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(format!("{}.json", result.run_id));
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&path, json).map_err(|source| RunError::Artifact {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

pub fn load_result(path: impl AsRef<Path>) -> Result<BacktestResult, RunError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| RunError::Artifact {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
