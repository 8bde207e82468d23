//! Parameter sweep over window sets.

use std::collections::HashMap;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::info;

use crate::config::BacktestConfig;
use crate::result::BacktestResult;
use crate::runner::run_backtest;

/// Window sets to try against a shared base config.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    pub window_sets: Vec<Vec<usize>>,
}

impl ParamGrid {
    pub fn new(window_sets: Vec<Vec<usize>>) -> Self {
        Self { window_sets }
    }

    /// Every `[fast, slow]` pair, for the basic crossover.
    pub fn fast_slow(fast: &[usize], slow: &[usize]) -> Self {
        let window_sets = fast
            .iter()
            .flat_map(|&f| slow.iter().map(move |&s| vec![f, s]))
            .collect();
        Self { window_sets }
    }

    pub fn size(&self) -> usize {
        self.window_sets.len()
    }

    /// One config per window set. Empty sets and sets containing a zero
    /// window are skipped.
    pub fn generate_configs(&self, base_config: &BacktestConfig) -> Vec<BacktestConfig> {
        self.window_sets
            .iter()
            .filter(|set| !set.is_empty() && !set.contains(&0))
            .map(|set| base_config.with_windows(set.clone()))
            .collect()
    }
}

/// Runs every configuration in a grid, in parallel by default.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    /// Parallel sweep over every config in the grid.
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// `false` runs the configs one after another on the calling thread.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every config from `grid`, stopping at the first failed run.
    pub fn sweep(&self, grid: &ParamGrid, base_config: &BacktestConfig) -> Result<SweepResults> {
        self.sweep_with_progress(grid, base_config, |_, _, _| {})
    }

    /// The callback receives the config index, the total and the result.
    pub fn sweep_with_progress<F>(
        &self,
        grid: &ParamGrid,
        base_config: &BacktestConfig,
        progress_callback: F,
    ) -> Result<SweepResults>
    where
        F: Fn(usize, usize, &BacktestResult) + Send + Sync,
    {
        let configs = grid.generate_configs(base_config);
        let total = configs.len();
        info!(total, parallel = self.parallel, "sweep started");

        let run_one = |(idx, config): (usize, &BacktestConfig)| -> Result<BacktestResult> {
            let result = run_backtest(config)
                .with_context(|| format!("windows {:?}", config.algorithm.windows))?;
            progress_callback(idx, total, &result);
            Ok(result)
        };

        let results: Vec<BacktestResult> = if self.parallel {
            configs
                .par_iter()
                .enumerate()
                .map(run_one)
                .collect::<Result<Vec<_>>>()?
        } else {
            configs
                .iter()
                .enumerate()
                .map(run_one)
                .collect::<Result<Vec<_>>>()?
        };

        Ok(SweepResults::new(results))
    }
}

/// Results from a parameter sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    results: Vec<BacktestResult>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(results: Vec<BacktestResult>) -> Self {
        let by_run_id = results
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { results, by_run_id }
    }

    pub fn all(&self) -> &[BacktestResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&BacktestResult> {
        self.by_run_id.get(run_id).map(|&i| &self.results[i])
    }

    /// Results sorted by final balance, best first.
    pub fn sorted_by_balance(&self) -> Vec<&BacktestResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| b.final_balance.total_cmp(&a.final_balance));
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&BacktestResult> {
        self.sorted_by_balance().into_iter().take(n).collect()
    }

    pub fn best_by_balance(&self) -> Option<&BacktestResult> {
        self.sorted_by_balance().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AlgorithmConfig, AlgorithmKind, DataConfig, ExecutionConfig};
    use fortsrobot_core::data::SyntheticSeries;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_base_config() -> BacktestConfig {
        BacktestConfig {
            algorithm: AlgorithmConfig {
                kind: AlgorithmKind::Basic,
                windows: vec![5, 5],
                short_count: None,
            },
            data: DataConfig::Synthetic(SyntheticSeries::Sine {
                len: 300,
                period: 80.0,
                amplitude: 100.0,
                base: 1000.0,
            }),
            execution: ExecutionConfig::default(),
        }
    }

    #[test]
    fn fast_slow_grid_size() {
        let grid = ParamGrid::fast_slow(&[3, 5], &[5, 8, 13]);
        // 2 fast × 3 slow
        assert_eq!(grid.size(), 6);
        assert_eq!(grid.window_sets[1], vec![3, 8]);
    }

    #[test]
    fn grid_skips_invalid_sets() {
        let grid = ParamGrid::new(vec![vec![5, 5], vec![], vec![0, 5], vec![8, 3]]);
        let configs = grid.generate_configs(&make_base_config());
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1].algorithm.windows, vec![8, 3]);
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let grid = ParamGrid::fast_slow(&[3, 5, 8], &[3, 5]);
        let base = make_base_config();

        let seq = ParamSweep::new()
            .with_parallelism(false)
            .sweep(&grid, &base)
            .unwrap();
        let par = ParamSweep::new().sweep(&grid, &base).unwrap();

        assert_eq!(seq.len(), 6);
        assert_eq!(seq.all(), par.all());
    }

    #[test]
    fn results_sorted_by_balance() {
        let grid = ParamGrid::fast_slow(&[2, 5, 9], &[2, 5, 9]);
        let results = ParamSweep::new().sweep(&grid, &make_base_config()).unwrap();

        let sorted = results.sorted_by_balance();
        assert_eq!(sorted.len(), 9);
        for pair in sorted.windows(2) {
            assert!(pair[0].final_balance >= pair[1].final_balance);
        }
        let best = results.best_by_balance().unwrap();
        assert_eq!(best.final_balance, sorted[0].final_balance);
        assert_eq!(results.top_n(2).len(), 2);
        assert!(results.get(&best.run_id).is_some());
    }

    #[test]
    fn progress_callback_sees_every_config() {
        let grid = ParamGrid::fast_slow(&[3, 5], &[5, 8]);
        let seen = AtomicUsize::new(0);
        let results = ParamSweep::new()
            .sweep_with_progress(&grid, &make_base_config(), |_, total, _| {
                assert_eq!(total, 4);
                seen.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn failing_config_aborts_with_context() {
        let mut base = make_base_config();
        base.data = DataConfig::Delimited {
            path: "missing.dat".into(),
            delimiter: ";".into(),
            has_header: false,
            skip_columns: 0,
            date_format: "%Y%m%d".into(),
            time_format: None,
        };
        let err = ParamSweep::new()
            .with_parallelism(false)
            .sweep(&ParamGrid::new(vec![vec![4, 4]]), &base)
            .unwrap_err();
        assert!(format!("{err:#}").contains("windows [4, 4]"));
    }
}
