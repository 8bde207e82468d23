//! Backtest driver: wires a candle source, an algorithm and the account.
//!
//! Two entry points:
//! - `run_backtest()`: builds everything from a `BacktestConfig`.
//! - `run_with_source()`: takes a ready algorithm and source. Used by tests
//!   and by callers that already hold candles in memory.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{info, warn};

use fortsrobot_core::data::{CandleSource, DelimitedCandleSource, SourceError, VecCandleSource};
use fortsrobot_core::{AccountAggregator, Algorithm, BasicAlgorithm, GuppiAlgorithm, Signal};

use crate::config::{
    AlgorithmConfig, AlgorithmKind, BacktestConfig, ConfigError, DataConfig, ExecutionConfig,
    ExitPolicy, RunId,
};
use crate::result::{BacktestResult, SignalCounts, SCHEMA_VERSION};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Source(#[from] SourceError),
    #[error("artifact I/O error at {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Build the configured algorithm, already initialised.
pub fn build_algorithm(config: &AlgorithmConfig) -> Box<dyn Algorithm> {
    match config.kind {
        AlgorithmKind::Basic => {
            if config.short_count.is_some() {
                warn!("short_count is ignored by the basic algorithm");
            }
            Box::new(BasicAlgorithm::new(&config.windows))
        }
        AlgorithmKind::Guppi => match config.short_count {
            Some(split) => Box::new(GuppiAlgorithm::with_split(&config.windows, split)),
            None => Box::new(GuppiAlgorithm::new(&config.windows)),
        },
    }
}

/// Open the configured candle source.
pub fn open_source(config: &DataConfig) -> Result<Box<dyn CandleSource>, RunError> {
    match config {
        DataConfig::Delimited { path, .. } => {
            let format = config.delimited_format()?.ok_or_else(|| {
                ConfigError::Invalid("delimited source without a format".into())
            })?;
            Ok(Box::new(DelimitedCandleSource::open(path, format)?))
        }
        DataConfig::Synthetic(series) => Ok(Box::new(VecCandleSource::new(series.generate()))),
    }
}

/// Run a single backtest from a validated config.
pub fn run_backtest(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let run_id = config.run_id()?;
    let mut algorithm = build_algorithm(&config.algorithm);
    let mut source = open_source(&config.data)?;
    run_with_source(run_id, algorithm.as_mut(), source.as_mut(), &config.execution)
}

/// Drive `source` through `algorithm` and execute each answer on a fresh
/// account at the candle's close.
///
/// Buy targets fully long (`buy(1 - exposure)`), Sell targets fully short
/// (`sell(1 + exposure)`).
pub fn run_with_source(
    run_id: RunId,
    algorithm: &mut dyn Algorithm,
    source: &mut dyn CandleSource,
    execution: &ExecutionConfig,
) -> Result<BacktestResult, RunError> {
    info!(
        %run_id,
        algorithm = algorithm.name(),
        parameters = ?algorithm.parameters(),
        "backtest started"
    );

    let mut account = AccountAggregator::new();
    let mut signals = SignalCounts::default();
    let mut candle_count = 0usize;
    let mut first_timestamp = None;

    while source.advance()? {
        let Some(candle) = source.current() else {
            break;
        };
        candle_count += 1;
        first_timestamp.get_or_insert(candle.timestamp);

        let signal = algorithm.check(candle);
        signals.record(signal);
        match signal {
            Signal::Buy => account.buy(1.0 - account.assets(), candle),
            Signal::Sell => account.sell(1.0 + account.assets(), candle),
            Signal::Exit => {
                if execution.on_exit == ExitPolicy::Flatten {
                    account.close(candle);
                }
            }
        }
    }

    let last = source.current();
    if execution.close_at_end {
        if let Some(candle) = last {
            account.close(candle);
        }
    }
    let final_equity = last.map_or(account.balance(), |c| account.equity(c.close));

    let result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        algorithm: algorithm.name().to_string(),
        parameters: algorithm.parameters().to_vec(),
        candle_count,
        first_timestamp,
        last_timestamp: last.map(|c| c.timestamp),
        signals,
        fill_count: account.fills().len(),
        final_balance: account.balance(),
        final_exposure: account.assets(),
        final_equity,
        fills: account.fills().to_vec(),
    };

    info!(
        run_id = %result.run_id,
        candles = result.candle_count,
        fills = result.fill_count,
        balance = result.final_balance,
        "backtest finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortsrobot_core::data::synthetic::candles_from_closes;
    use fortsrobot_core::data::SyntheticSeries;

    fn sine_config(kind: AlgorithmKind, windows: Vec<usize>) -> BacktestConfig {
        BacktestConfig {
            algorithm: AlgorithmConfig {
                kind,
                windows,
                short_count: None,
            },
            data: DataConfig::Synthetic(SyntheticSeries::Sine {
                len: 400,
                period: 80.0,
                amplitude: 100.0,
                base: 1000.0,
            }),
            execution: ExecutionConfig::default(),
        }
    }

    #[test]
    fn basic_run_counts_every_candle() {
        let result = run_backtest(&sine_config(AlgorithmKind::Basic, vec![5, 5])).unwrap();
        assert_eq!(result.candle_count, 400);
        assert_eq!(result.signals.total(), 400);
        assert_eq!(result.algorithm, "basic");
        assert_eq!(result.parameters, vec![5, 5]);
        assert_eq!(result.final_exposure, 0.0);
        assert!(result.final_balance >= 0.0);
        assert_eq!(result.fill_count, result.fills.len());
    }

    #[test]
    fn guppi_run_respects_short_count() {
        let mut config = sine_config(AlgorithmKind::Guppi, vec![3, 5, 8, 30, 35, 40]);
        config.algorithm.short_count = Some(2);
        let result = run_backtest(&config).unwrap();
        assert_eq!(result.algorithm, "guppi");
        assert_eq!(result.candle_count, 400);
    }

    #[test]
    fn hold_keeps_exposure_when_not_closing_at_end() {
        let mut config = sine_config(AlgorithmKind::Basic, vec![5, 5]);
        config.execution.close_at_end = false;
        let result = run_backtest(&config).unwrap();
        assert!(result.final_exposure.abs() == 1.0);
    }

    #[test]
    fn flatten_closes_on_every_exit() {
        let mut config = sine_config(AlgorithmKind::Basic, vec![5, 5]);
        config.execution.on_exit = ExitPolicy::Flatten;
        config.execution.close_at_end = false;
        let result = run_backtest(&config).unwrap();
        // Every position opened by a Buy/Sell is closed by the next Exit.
        let opens = result.signals.buy + result.signals.sell;
        assert!(result.fill_count >= opens);
    }

    #[test]
    fn empty_source_yields_empty_result() {
        let mut alg = BasicAlgorithm::new(&[5, 5]);
        let mut source = VecCandleSource::new(Vec::new());
        let result =
            run_with_source("empty".into(), &mut alg, &mut source, &ExecutionConfig::default())
                .unwrap();
        assert_eq!(result.candle_count, 0);
        assert!(result.first_timestamp.is_none());
        assert_eq!(result.final_balance, 0.0);
    }

    #[test]
    fn buy_then_sell_reverses_through_flat() {
        // [2, 2] crosses down at 4, up at 7, down at 10.
        let mut closes = vec![100.0; 4];
        closes.extend([90.0, 80.0, 70.0, 90.0, 110.0, 130.0, 100.0, 70.0]);
        let mut alg = BasicAlgorithm::new(&[2, 2]);
        let mut source = VecCandleSource::new(candles_from_closes(&closes));
        let result =
            run_with_source("x".into(), &mut alg, &mut source, &ExecutionConfig::default())
                .unwrap();

        assert_eq!(result.signals.sell, 2);
        assert_eq!(result.signals.buy, 1);
        // short 1 at 90, reverse to long at 90 (delta 2), reverse to short at 100, close at 70
        assert_eq!(result.fills[0].exposure_after, -1.0);
        assert_eq!(result.fills[1].exposure_delta, 2.0);
        assert_eq!(result.fills[2].exposure_delta, -2.0);
        assert_eq!(result.fills.last().map(|f| f.exposure_after), Some(0.0));
    }

    #[test]
    fn missing_file_surfaces_source_error() {
        let config = BacktestConfig {
            data: DataConfig::Delimited {
                path: "does/not/exist.dat".into(),
                delimiter: ";".into(),
                has_header: false,
                skip_columns: 0,
                date_format: "%Y%m%d".into(),
                time_format: Some("%H%M%S".into()),
            },
            ..sine_config(AlgorithmKind::Basic, vec![5, 5])
        };
        assert!(matches!(
            run_backtest(&config),
            Err(RunError::Source(SourceError::Io(_)))
        ));
    }
}
