//! Rolling mean of one-minute close returns (`MA{w}`).
//!
//! MA[t] = mean(close_returns[t-w+1 ..= t]).
//! The close return is NaN at position 0, so the first defined value is at
//! position `w`. Lookback: w.

use super::scan::{pct_change, rolling_mean};
use super::{BarField, Feature};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct MeanReturn {
    window: usize,
    name: String,
}

impl MeanReturn {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "MA window must be >= 1");
        Self {
            window,
            name: format!("MA{window}"),
        }
    }
}

impl Feature for MeanReturn {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let returns = pct_change(&BarField::Close.series(bars));
        rolling_mean(&returns, self.window)
    }
}
