//! FortsRobot Runner: backtest orchestration on top of `fortsrobot-core`.
//!
//! This crate provides:
//! - TOML backtest configuration with content-hashed run ids
//! - The driver loop: candle source -> algorithm -> account
//! - JSON result artifacts
//! - Parallel parameter sweeps over window sets
//! - `tracing` subscriber setup

pub mod config;
pub mod logging;
pub mod result;
pub mod runner;
pub mod sweep;

pub use config::{
    AlgorithmConfig, AlgorithmKind, BacktestConfig, ConfigError, DataConfig, ExecutionConfig,
    ExitPolicy, RunId,
};
pub use result::{load_result, save_result, BacktestResult, SignalCounts, SCHEMA_VERSION};
pub use runner::{build_algorithm, open_source, run_backtest, run_with_source, RunError};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};
