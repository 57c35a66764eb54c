//! Open-interest indicators.
//!
//! Only computed when the series carries open interest at all; the feature
//! pipeline decides that. Missing OI cells are NaN here.

use super::rolling::{
    diff, guard, pct_change, rolling_max, rolling_mean, rolling_min, rolling_zscore, MinPeriods,
};
use super::rsi::rsi_of_series;

/// Look-back for the price/OI divergence comparison.
pub const DIVERGENCE_WINDOW: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenInterestSeries {
    pub delta: Vec<f64>,
    /// Percent change from the previous bar (x100).
    pub change_pct: Vec<f64>,
    pub ma5: Vec<f64>,
    pub ma20: Vec<f64>,
    pub z20: Vec<f64>,
    /// Position within the 20-bar OI range, 0-100.
    pub position: Vec<f64>,
    /// Price fell while OI rose over the divergence window.
    pub bull_divergence: Vec<bool>,
    /// Price rose while OI fell over the divergence window.
    pub bear_divergence: Vec<bool>,
    pub rsi14: Vec<f64>,
}

pub fn open_interest_indicators(closes: &[f64], oi: &[f64]) -> OpenInterestSeries {
    let (bull_divergence, bear_divergence) = price_oi_divergence(closes, oi, DIVERGENCE_WINDOW);
    OpenInterestSeries {
        delta: diff(oi, 1),
        change_pct: pct_change(oi, 1).into_iter().map(|v| v * 100.0).collect(),
        ma5: rolling_mean(oi, 5, MinPeriods::Strict),
        ma20: rolling_mean(oi, 20, MinPeriods::Strict),
        z20: rolling_zscore(oi, 20),
        position: range_position(oi, 20),
        bull_divergence,
        bear_divergence,
        rsi14: rsi_of_series(oi, 14),
    }
}

/// (x - min) / (max - min) * 100 over a strict window.
pub fn range_position(values: &[f64], window: usize) -> Vec<f64> {
    let hi = rolling_max(values, window);
    let lo = rolling_min(values, window);
    values
        .iter()
        .zip(hi.iter().zip(&lo))
        .map(|(&v, (&h, &l))| {
            if h.is_nan() || l.is_nan() || v.is_nan() {
                f64::NAN
            } else {
                (v - l) / guard(h - l) * 100.0
            }
        })
        .collect()
}

/// Bullish: price down and OI up over `window` bars. Bearish: price up and
/// OI down. Undefined deltas raise neither flag.
pub fn price_oi_divergence(closes: &[f64], oi: &[f64], window: usize) -> (Vec<bool>, Vec<bool>) {
    let price = diff(closes, window);
    let interest = diff(oi, window);
    price
        .iter()
        .zip(&interest)
        .map(|(&p, &o)| (p < 0.0 && o > 0.0, p > 0.0 && o < 0.0))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn change_pct_is_scaled() {
        let s = open_interest_indicators(&[1.0, 1.0], &[200.0, 210.0]);
        assert_eq!(s.delta[1], 10.0);
        assert_approx(s.change_pct[1], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn position_spans_the_range() {
        let oi: Vec<f64> = (0..20).map(|i| 1000.0 + i as f64 * 10.0).collect();
        let p = range_position(&oi, 20);
        assert!(p[18].is_nan());
        assert_approx(p[19], 100.0, DEFAULT_EPSILON);

        let mut falling = oi.clone();
        falling.reverse();
        assert_approx(range_position(&falling, 20)[19], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn divergence_flags() {
        let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 11.0];
        let oi = [100.0, 100.0, 100.0, 100.0, 100.0, 120.0, 80.0];
        let (bull, bear) = price_oi_divergence(&closes, &oi, 5);
        assert!(!bull[4] && !bear[4]);
        assert!(bull[5] && !bear[5]);
        assert!(bear[6] && !bull[6]);
    }

    #[test]
    fn missing_oi_never_flags() {
        let (bull, bear) = price_oi_divergence(&[1.0, 0.0], &[f64::NAN, 5.0], 1);
        assert!(!bull[1] && !bear[1]);
    }
}
