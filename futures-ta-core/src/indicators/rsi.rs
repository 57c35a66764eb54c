//! Relative Strength Index (RSI) and Stochastic RSI.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), where the averages are
//! simple `period`-bar means of gains and losses.
//! Lookback: period (the first change exists at index 1).
//! A zero average loss is replaced by epsilon, so a flat window reads 0 and
//! an all-gain window reads just under 100. Values always lie in [0, 100].

use super::rolling::{diff, guard, rolling_max, rolling_mean, rolling_min, MinPeriods};
use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rsi_of_series(&closes(bars), self.period)
    }
}

/// RSI of any series (close, open interest).
pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let changes = diff(values, 1);
    let gains: Vec<f64> = changes.iter().map(|&c| if c.is_nan() { c } else { c.max(0.0) }).collect();
    let losses: Vec<f64> = changes.iter().map(|&c| if c.is_nan() { c } else { (-c).max(0.0) }).collect();

    let avg_gain = rolling_mean(&gains, period, MinPeriods::Strict);
    let avg_loss = rolling_mean(&losses, period, MinPeriods::Strict);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if g.is_nan() || l.is_nan() {
                f64::NAN
            } else {
                100.0 - 100.0 / (1.0 + g / guard(l))
            }
        })
        .collect()
}

/// Stochastic RSI series. All three are on a 0-100 scale.
#[derive(Debug, Clone)]
pub struct StochRsiSeries {
    /// (RSI - min) / (max - min) over the RSI's own window, x100.
    pub raw: Vec<f64>,
    /// `k_period` mean of the raw value.
    pub k: Vec<f64>,
    /// `d_period` mean of K.
    pub d: Vec<f64>,
}

pub fn stoch_rsi(rsi: &[f64], period: usize, k_period: usize, d_period: usize) -> StochRsiSeries {
    let lo = rolling_min(rsi, period);
    let hi = rolling_max(rsi, period);
    let raw: Vec<f64> = rsi
        .iter()
        .zip(lo.iter().zip(&hi))
        .map(|(&r, (&l, &h))| {
            if r.is_nan() || l.is_nan() || h.is_nan() {
                f64::NAN
            } else {
                (r - l) / guard(h - l)
            }
        })
        .collect();

    let k: Vec<f64> = rolling_mean(&raw, k_period, MinPeriods::Strict)
        .into_iter()
        .map(|v| v * 100.0)
        .collect();
    let d = rolling_mean(&k, d_period, MinPeriods::Strict);

    StochRsiSeries {
        raw: raw.into_iter().map(|v| v * 100.0).collect(),
        k,
        d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48 → avg_gain = 0.34/3, avg_loss = 0.73/3
        // RSI[3] = 100 - 100/(1 + 0.34/0.73) ≈ 31.776
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_flat_series_is_defined() {
        let result = rsi_of_series(&[50.0; 6], 3);
        assert_approx(result[5], 0.0, 1e-9);
    }

    #[test]
    fn stoch_rsi_range() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0)
            .collect();
        let rsi = rsi_of_series(&closes, 14);
        let s = stoch_rsi(&rsi, 14, 3, 3);
        let valid: Vec<f64> = s.k.iter().copied().filter(|v| !v.is_nan()).collect();
        assert!(!valid.is_empty());
        for v in valid {
            assert!((-1e-6..=100.0 + 1e-6).contains(&v), "stoch K out of range: {v}");
        }
        // raw first at 14 + 13 = 27, K two rows later, D two more
        assert!(s.raw[26].is_nan());
        assert!(!s.raw[27].is_nan());
        assert!(!s.k[29].is_nan());
        assert!(!s.d[31].is_nan());
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
