//! Streaming Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (w + 1).
//! Seed: EMA[w-1] = mean of the first `w` values. No value before the seed.

#[derive(Debug, Clone)]
pub struct Ema {
    window: usize,
    alpha: f64,
    seed_sum: f64,
    count: usize,
    value: Option<f64>,
}

impl Ema {
    /// Unseeded EMA with alpha = 2 / (window + 1).
    ///
    /// # Panics
    /// If `window` is zero.
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "EMA window must be >= 1");
        Self {
            window,
            alpha: 2.0 / (window as f64 + 1.0),
            seed_sum: 0.0,
            count: 0,
            value: None,
        }
    }

    /// Push a value; returns the EMA once seeded.
    pub fn update(&mut self, x: f64) -> Option<f64> {
        self.count += 1;
        match self.value {
            Some(prev) => {
                self.value = Some(self.alpha * x + (1.0 - self.alpha) * prev);
            }
            None => {
                self.seed_sum += x;
                if self.count == self.window {
                    self.value = Some(self.seed_sum / self.window as f64);
                }
            }
        }
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn is_ready(&self) -> bool {
        self.value.is_some()
    }

    pub fn reset(&mut self) {
        self.seed_sum = 0.0;
        self.count = 0;
        self.value = None;
    }
}

/// Batch EMA over a slice: `NAN` before the seed index.
///
/// Reference implementation used by tests to check the streaming [`Ema`].
pub fn ema_of_series(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < window || window == 0 {
        return result;
    }

    let alpha = 2.0 / (window as f64 + 1.0);
    let seed = values[..window].iter().sum::<f64>() / window as f64;
    result[window - 1] = seed;

    let mut prev = seed;
    for i in window..n {
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}
