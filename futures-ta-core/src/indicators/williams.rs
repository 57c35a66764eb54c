//! Williams %R.
//!
//! %R = -100 * (HHV_n(high) - close) / (HHV_n(high) - LLV_n(low)), in [-100, 0].
//! Lookback: period - 1.

use super::rolling::{guard, rolling_max, rolling_min};
use super::{column, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct WilliamsR {
    period: usize,
    name: String,
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Williams %R period must be >= 1");
        Self {
            period,
            name: format!("williams_r_{period}"),
        }
    }
}

impl Indicator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let hhv = rolling_max(&column(bars, |b| b.high), self.period);
        let llv = rolling_min(&column(bars, |b| b.low), self.period);
        bars.iter()
            .zip(hhv.iter().zip(&llv))
            .map(|(bar, (&h, &l))| {
                if h.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    -100.0 * (h - bar.close) / guard(h - l)
                }
            })
            .collect()
    }
}
