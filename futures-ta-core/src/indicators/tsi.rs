//! True Strength Index.
//!
//! TSI = 100 * E_short(E_long(Δclose)) / E_short(E_long(|Δclose|)), where E is
//! the bias-corrected exponential mean with alpha = 2 / (span + 1). Defined
//! from the first price change onward; always within [-100, 100].

use super::ema::ewm_adjusted;
use super::rolling::{diff, guard};

fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

fn double_smooth(values: &[f64], long: usize, short: usize) -> Vec<f64> {
    ewm_adjusted(&ewm_adjusted(values, alpha(long)), alpha(short))
}

pub fn tsi(closes: &[f64], long: usize, short: usize) -> Vec<f64> {
    let change = diff(closes, 1);
    let magnitude: Vec<f64> = change.iter().map(|c| c.abs()).collect();
    let num = double_smooth(&change, long, short);
    let den = double_smooth(&magnitude, long, short);
    num.iter()
        .zip(&den)
        .map(|(&n, &d)| {
            if n.is_nan() || d.is_nan() {
                f64::NAN
            } else {
                100.0 * n / guard(d)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn monotonic_rise_reads_plus_100() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + i as f64).collect();
        let r = tsi(&closes, 25, 13);
        assert!(r[0].is_nan());
        assert_approx(r[1], 100.0, 1e-9);
        assert_approx(r[39], 100.0, 1e-9);
    }

    #[test]
    fn bounded_on_choppy_series() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.9).sin() * 3.0).collect();
        for v in tsi(&closes, 25, 13).into_iter().filter(|v| !v.is_nan()) {
            assert!((-100.0 - 1e-9..=100.0 + 1e-9).contains(&v));
        }
    }

    #[test]
    fn flat_series_is_zero() {
        let r = tsi(&[10.0; 5], 25, 13);
        assert_approx(r[4], 0.0, 1e-9);
    }
}
