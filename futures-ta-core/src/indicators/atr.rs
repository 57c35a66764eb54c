//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is the simple rolling mean of True Range over `period` bars.
//! TR[0] has no previous close and falls back to high-low, so the first
//! ATR value lands at index period-1.

use super::rolling::{rolling_mean, MinPeriods};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    tr[0] = (bars[0].high - bars[0].low).abs();

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if h.is_nan() || l.is_nan() {
            tr[i] = f64::NAN;
        } else if pc.is_nan() {
            tr[i] = (h - l).abs();
        } else {
            tr[i] = (h - l).abs().max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rolling_mean(&true_range(bars), self.period, MinPeriods::Strict)
    }
}
