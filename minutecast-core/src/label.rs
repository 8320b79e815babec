//! Forward-return label.
//!
//! target[t] = close[t+h] / close[t] - 1, NaN for the last `h` positions.
//!
//! This is the only computation in the crate that reads future bars, which is
//! why it is not a [`crate::features::Feature`] and never enters the
//! look-ahead checks.

use crate::domain::Bar;
use crate::features::scan::safe_ratio;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardReturn {
    horizon: usize,
}

impl ForwardReturn {
    pub fn new(horizon: usize) -> Self {
        assert!(horizon >= 1, "label horizon must be >= 1");
        Self { horizon }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn name(&self) -> &'static str {
        "target"
    }

    pub fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        for i in 0..n.saturating_sub(self.horizon) {
            result[i] = safe_ratio(bars[i + self.horizon].close, bars[i].close) - 1.0;
        }
        result
    }
}

impl Default for ForwardReturn {
    fn default() -> Self {
        Self::new(15)
    }
}
