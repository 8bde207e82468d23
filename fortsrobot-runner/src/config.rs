//! Serializable backtest configuration.
//!
//! ```toml
//! [algorithm]
//! kind = "guppi"
//! windows = [3, 5, 8, 10, 12, 15, 30, 35, 40, 45, 50, 60]
//! short_count = 6
//!
//! [data]
//! source = "delimited"
//! path = "data/si-9-17.dat"
//! has_header = true
//! skip_columns = 2
//!
//! [execution]
//! on_exit = "hold"
//! close_at_end = true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fortsrobot_core::data::{DelimitedFormat, SyntheticSeries};

/// Content hash of a configuration.
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacktestConfig {
    pub algorithm: AlgorithmConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Basic,
    Guppi,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlgorithmConfig {
    pub kind: AlgorithmKind,
    pub windows: Vec<usize>,
    /// Size of the Guppi short group. Defaults to half the windows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_count: Option<usize>,
}

/// Where candles come from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DataConfig {
    Delimited {
        path: PathBuf,
        #[serde(default = "default_delimiter")]
        delimiter: String,
        #[serde(default)]
        has_header: bool,
        #[serde(default)]
        skip_columns: usize,
        #[serde(default = "default_date_format")]
        date_format: String,
        /// Empty string for files without a time column.
        #[serde(default = "default_time_format")]
        time_format: Option<String>,
    },
    Synthetic(SyntheticSeries),
}

fn default_delimiter() -> String {
    ";".to_string()
}

fn default_date_format() -> String {
    DelimitedFormat::default().date_format
}

fn default_time_format() -> Option<String> {
    DelimitedFormat::default().time_format
}

impl DataConfig {
    /// Parsing options for a delimited source; `None` for synthetic data.
    pub fn delimited_format(&self) -> Result<Option<DelimitedFormat>, ConfigError> {
        match self {
            Self::Delimited {
                delimiter,
                has_header,
                skip_columns,
                date_format,
                time_format,
                ..
            } => {
                let delimiter = match delimiter.as_bytes() {
                    [byte] => *byte,
                    _ => {
                        return Err(ConfigError::Invalid(format!(
                            "delimiter must be a single ASCII character, got {delimiter:?}"
                        )))
                    }
                };
                Ok(Some(DelimitedFormat {
                    delimiter,
                    has_header: *has_header,
                    skip_columns: *skip_columns,
                    date_format: date_format.clone(),
                    time_format: time_format.clone().filter(|f| !f.is_empty()),
                }))
            }
            Self::Synthetic(_) => Ok(None),
        }
    }
}

/// What to do with an Exit answer.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExitPolicy {
    /// Keep the current exposure.
    #[default]
    Hold,
    /// Close the account at the candle's close.
    Flatten,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    #[serde(default)]
    pub on_exit: ExitPolicy,
    /// Close any open exposure on the last candle.
    #[serde(default = "default_close_at_end")]
    pub close_at_end: bool,
}

fn default_close_at_end() -> bool {
    true
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            on_exit: ExitPolicy::Hold,
            close_at_end: true,
        }
    }
}

impl BacktestConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = &self.algorithm.windows;
        if windows.is_empty() {
            return Err(ConfigError::Invalid("algorithm.windows is empty".into()));
        }
        if let Some(pos) = windows.iter().position(|&w| w == 0) {
            return Err(ConfigError::Invalid(format!(
                "algorithm.windows[{pos}] is zero"
            )));
        }
        if let DataConfig::Synthetic(series) = &self.data {
            if series.is_empty() {
                return Err(ConfigError::Invalid("synthetic series is empty".into()));
            }
        }
        self.data.delimited_format()?;
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two runs with identical configs have the same id, so artifacts of a
    /// repeated run overwrite each other.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(blake3::hash(&json).to_hex().to_string())
    }

    /// Copy of this config with a different window set.
    pub fn with_windows(&self, windows: Vec<usize>) -> Self {
        let mut config = self.clone();
        config.algorithm.windows = windows;
        config
    }
}
