//! Streaming Simple Moving Average (SMA).
//!
//! Fixed-capacity ring buffer with a write cursor and a running sum, so each
//! update is O(1). Until the buffer is full the mean is taken over the values
//! seen so far.

/// Rolling mean over the most recent `window` values.
#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    buffer: Vec<f64>,
    cursor: usize,
    len: usize,
    sum: f64,
}

impl Sma {
    /// Empty average over the last `window` values.
    ///
    /// # Panics
    /// If `window` is zero.
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "SMA window must be >= 1");
        Self {
            window,
            buffer: vec![0.0; window],
            cursor: 0,
            len: 0,
            sum: 0.0,
        }
    }

    /// Push a value and return the current (possibly partial) mean.
    pub fn update(&mut self, value: f64) -> f64 {
        if self.len == self.window {
            self.sum -= self.buffer[self.cursor];
        } else {
            self.len += 1;
        }
        self.buffer[self.cursor] = value;
        self.sum += value;
        self.cursor = (self.cursor + 1) % self.window;
        self.sum / self.len as f64
    }

    /// Current mean, `None` before the first update.
    pub fn value(&self) -> Option<f64> {
        (self.len > 0).then(|| self.sum / self.len as f64)
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of values currently held (at most `window`).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.window
    }

    pub fn reset(&mut self) {
        self.buffer.iter_mut().for_each(|v| *v = 0.0);
        self.cursor = 0;
        self.len = 0;
        self.sum = 0.0;
    }
}

/// Batch SMA with partial-window warm-up, recomputed from scratch per index.
///
/// Reference implementation for tests and fixture generation; the algorithms
/// use the streaming [`Sma`].
pub fn sma_of_series(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let mut sma = Sma::new(5);
        let out: Vec<f64> = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]
            .iter()
            .map(|&v| sma.update(v))
            .collect();

        // Partial windows during warm-up
        assert_approx(out[0], 10.0, DEFAULT_EPSILON);
        assert_approx(out[1], 10.5, DEFAULT_EPSILON);
        assert_approx(out[3], 11.5, DEFAULT_EPSILON);
        // SMA[4] = mean(10..=14) = 12.0
        assert_approx(out[4], 12.0, DEFAULT_EPSILON);
        assert_approx(out[5], 13.0, DEFAULT_EPSILON);
        assert_approx(out[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let mut sma = Sma::new(1);
        assert_approx(sma.update(100.0), 100.0, DEFAULT_EPSILON);
        assert_approx(sma.update(200.0), 200.0, DEFAULT_EPSILON);
        assert!(sma.is_full());
    }

    #[test]
    fn sma_fills_exactly_at_window() {
        let mut sma = Sma::new(3);
        assert!(sma.value().is_none());
        sma.update(1.0);
        sma.update(2.0);
        assert!(!sma.is_full());
        sma.update(3.0);
        assert!(sma.is_full());
        sma.update(4.0);
        assert_eq!(sma.len(), 3);
    }

    #[test]
    fn sma_matches_batch_reference() {
        let values: Vec<f64> = (0..200).map(|i| 100.0 + (i as f64 * 0.37).sin() * 25.0).collect();
        let expected = sma_of_series(&values, 13);
        let mut sma = Sma::new(13);
        for (v, e) in values.iter().zip(&expected) {
            assert_approx(sma.update(*v), *e, 1e-9);
        }
    }

    #[test]
    fn sma_reset_clears_history() {
        let mut sma = Sma::new(2);
        sma.update(50.0);
        sma.update(70.0);
        sma.reset();
        assert!(sma.is_empty());
        assert_approx(sma.update(10.0), 10.0, DEFAULT_EPSILON);
    }

    #[test]
    #[should_panic(expected = "SMA window must be >= 1")]
    fn sma_rejects_zero_window() {
        Sma::new(0);
    }
}
