//! KDJ stochastic oscillator (n, 3, 3).
//!
//! RSV = 100 * (close - LLV_n(low)) / (HHV_n(high) - LLV_n(low))
//! K = exponential mean of RSV with alpha 1/3, D = same of K, J = 3K - 2D.
//!
//! K and D stay within [0, 100]; J is deliberately unbounded and overshoots
//! on sharp moves. Extreme J readings are what flag overbought/oversold.

use super::ema::ewm;
use super::rolling::{guard, rolling_max, rolling_min};
use crate::domain::Bar;

const SMOOTHING: f64 = 1.0 / 3.0;

#[derive(Debug, Clone)]
pub struct KdjSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
    pub j: Vec<f64>,
}

pub fn kdj(bars: &[Bar], n: usize) -> KdjSeries {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let hhv = rolling_max(&highs, n);
    let llv = rolling_min(&lows, n);

    let rsv: Vec<f64> = bars
        .iter()
        .zip(hhv.iter().zip(&llv))
        .map(|(bar, (&h, &l))| {
            if h.is_nan() || l.is_nan() {
                f64::NAN
            } else {
                100.0 * (bar.close - l) / guard(h - l)
            }
        })
        .collect();

    let k = ewm(&rsv, SMOOTHING, 0);
    let d = ewm(&k, SMOOTHING, 0);
    let j = k.iter().zip(&d).map(|(k, d)| 3.0 * k - 2.0 * d).collect();

    KdjSeries { k, d, j }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn first_value_at_window_end() {
        let bars = make_bars(&(0..12).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let s = kdj(&bars, 9);
        assert!(s.k[7].is_nan());
        assert!(!s.k[8].is_nan());
        // Seed: K = D = RSV, so J = RSV as well.
        assert_approx(s.j[8], s.k[8], DEFAULT_EPSILON);
    }

    #[test]
    fn j_overshoots_above_100_after_rally() {
        // Flat range, then closes pinned at the high of an expanding range.
        let mut data: Vec<(f64, f64, f64, f64)> = (0..10).map(|_| (100.0, 101.0, 99.0, 99.0)).collect();
        for i in 0..4 {
            let top = 102.0 + i as f64 * 3.0;
            data.push((top - 2.0, top, top - 3.0, top));
        }
        let bars = make_ohlc_bars(&data);
        let s = kdj(&bars, 9);
        let last = bars.len() - 1;
        assert!(s.j[last] > 100.0, "J should overshoot, got {}", s.j[last]);
        assert!(s.k[last] <= 100.0);
    }
}
