//! Percent-change and multi-bar return columns.
//!
//! PctChange[t] = (x[t] - x[t-1]) / x[t-1], lookback 1.
//! LagReturn[t] = close[t] / close[t-lag] - 1, lookback lag.

use super::scan::{lag_return, pct_change};
use super::{BarField, Feature};
use crate::domain::Bar;

/// One-step percent change of a bar field.
#[derive(Debug, Clone)]
pub struct PctChange {
    field: BarField,
    name: String,
}

impl PctChange {
    /// Column named `{field}_returns`.
    pub fn new(field: BarField) -> Self {
        Self::named(field, format!("{}_returns", field.as_str()))
    }

    /// Percent change of `field` published under an explicit column name.
    pub fn named(field: BarField, name: impl Into<String>) -> Self {
        Self {
            field,
            name: name.into(),
        }
    }
}

impl Feature for PctChange {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        pct_change(&self.field.series(bars))
    }
}

/// Close-to-close return over `lag` bars.
#[derive(Debug, Clone)]
pub struct LagReturn {
    lag: usize,
    name: String,
}

impl LagReturn {
    pub fn new(lag: usize) -> Self {
        assert!(lag >= 1, "return lag must be >= 1");
        Self {
            lag,
            name: format!("returns_{lag}"),
        }
    }
}

impl Feature for LagReturn {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.lag
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        lag_return(&BarField::Close.series(bars), self.lag)
    }
}
