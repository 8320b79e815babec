//! Same-bar columns: raw pass-through, price spreads and volume per trade.
//!
//! None of these look at any other bar, so lookback is always 0.

use super::scan::safe_ratio;
use super::{BarField, Feature};
use crate::config::ZeroCountPolicy;
use crate::domain::Bar;

/// A raw bar field emitted unchanged (`vwap`, `volume`, `usd_volume`, `count`).
#[derive(Debug, Clone)]
pub struct Raw {
    field: BarField,
}

impl Raw {
    pub fn new(field: BarField) -> Self {
        Self { field }
    }
}

impl Feature for Raw {
    fn name(&self) -> &str {
        self.field.as_str()
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.field.series(bars)
    }
}

/// Difference of two fields of the same bar.
#[derive(Debug, Clone)]
pub struct Spread {
    minuend: BarField,
    subtrahend: BarField,
    name: &'static str,
}

impl Spread {
    /// `c_minus_o = close - open`
    pub fn close_minus_open() -> Self {
        Self {
            minuend: BarField::Close,
            subtrahend: BarField::Open,
            name: "c_minus_o",
        }
    }

    /// `h_minus_l = high - low`
    pub fn high_minus_low() -> Self {
        Self {
            minuend: BarField::High,
            subtrahend: BarField::Low,
            name: "h_minus_l",
        }
    }
}

impl Feature for Spread {
    fn name(&self) -> &str {
        self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| self.minuend.value(b) - self.subtrahend.value(b))
            .collect()
    }
}

/// `VolCount = volume / count`.
///
/// A bar with no trades is undefined under [`ZeroCountPolicy::Nan`] and 0.0
/// under [`ZeroCountPolicy::Zero`].
#[derive(Debug, Clone)]
pub struct VolumePerTrade {
    zero_count: ZeroCountPolicy,
}

impl VolumePerTrade {
    pub fn new(zero_count: ZeroCountPolicy) -> Self {
        Self { zero_count }
    }
}

impl Feature for VolumePerTrade {
    fn name(&self) -> &str {
        "VolCount"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| match (b.count, self.zero_count) {
                (0, ZeroCountPolicy::Zero) => 0.0,
                (count, _) => safe_ratio(b.volume, count as f64),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn spreads() {
        let bars = make_bars(&[100.0, 104.0]);
        let co = Spread::close_minus_open().compute(&bars);
        let hl = Spread::high_minus_low().compute(&bars);

        assert_approx(co[0], 0.0, DEFAULT_EPSILON);
        assert_approx(co[1], 4.0, DEFAULT_EPSILON);
        // high = 105, low = 99
        assert_approx(hl[1], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn raw_passes_through() {
        let bars = make_bars(&[100.0, 104.0]);
        let raw = Raw::new(BarField::UsdVolume);
        assert_eq!(raw.name(), "usd_volume");
        assert_eq!(raw.compute(&bars), vec![1000.0, 1040.0]);
    }

    #[test]
    fn volume_per_trade() {
        let bars = make_bars(&[100.0, 101.0]);
        let result = VolumePerTrade::new(ZeroCountPolicy::Nan).compute(&bars);
        // volume 10, count 5
        assert_approx(result[0], 2.0, DEFAULT_EPSILON);
        assert_approx(result[1], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_count_policies() {
        let mut bars = make_bars(&[100.0, 101.0]);
        bars[1].count = 0;

        let nan = VolumePerTrade::new(ZeroCountPolicy::Nan).compute(&bars);
        assert!(nan[1].is_nan());

        let zero = VolumePerTrade::new(ZeroCountPolicy::Zero).compute(&bars);
        assert_eq!(zero[1], 0.0);
        assert_approx(zero[0], 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn same_bar_features_have_no_lookback() {
        assert_eq!(Raw::new(BarField::Vwap).lookback(), 0);
        assert_eq!(Spread::high_minus_low().lookback(), 0);
        assert_eq!(VolumePerTrade::new(ZeroCountPolicy::Nan).lookback(), 0);
    }
}
