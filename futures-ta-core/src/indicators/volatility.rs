//! Volatility-regime inputs: ATR ratio and its percentile rank, return
//! volatility, and the volume/return relationship.

use super::rolling::{pct_change, rolling_mean, rolling_std, safe_div, MinPeriods, EPSILON};

pub const PERCENTILE_WINDOW: usize = 180;
pub const PERCENTILE_MIN_VALID: usize = 60;

/// ATR as a fraction of close.
pub fn atr_ratio(atr: &[f64], closes: &[f64]) -> Vec<f64> {
    atr.iter().zip(closes).map(|(&a, &c)| safe_div(a, c)).collect()
}

/// Fraction of valid values in the trailing window that are <= the current
/// value. Undefined when the current value is missing or the window holds
/// fewer than `min_valid` values.
pub fn percentile_rank(values: &[f64], window: usize, min_valid: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let current = values[i];
            if current.is_nan() {
                return f64::NAN;
            }
            let start = (i + 1).saturating_sub(window);
            let (count, below) = values[start..=i]
                .iter()
                .filter(|v| !v.is_nan())
                .fold((0usize, 0usize), |(n, b), &v| (n + 1, b + usize::from(v <= current)));
            if count < min_valid.max(1) {
                f64::NAN
            } else {
                below as f64 / count as f64
            }
        })
        .collect()
}

/// 20-bar sample std of simple returns, in percent.
pub fn return_volatility(closes: &[f64], window: usize) -> Vec<f64> {
    rolling_std(&pct_change(closes, 1), window)
        .into_iter()
        .map(|v| v * 100.0)
        .collect()
}

/// Volume divided by its own strict moving average.
pub fn volume_normalized(volume: &[f64], window: usize) -> Vec<f64> {
    let ma = rolling_mean(volume, window, MinPeriods::Strict);
    volume.iter().zip(&ma).map(|(&v, &m)| safe_div(v, m)).collect()
}

/// Rolling Pearson correlation over rows where both inputs are defined.
/// Needs `window` such pairs; a constant leg reads 0.
pub fn rolling_correlation(a: &[f64], b: &[f64], window: usize) -> Vec<f64> {
    let n = a.len().min(b.len());
    let mut out = vec![f64::NAN; a.len()];
    if window < 2 {
        return out;
    }
    for i in 0..n {
        let start = (i + 1).saturating_sub(window);
        let pairs: Vec<(f64, f64)> = (start..=i)
            .map(|j| (a[j], b[j]))
            .filter(|(x, y)| !x.is_nan() && !y.is_nan())
            .collect();
        if pairs.len() < window {
            continue;
        }
        let len = pairs.len() as f64;
        let mx = pairs.iter().map(|p| p.0).sum::<f64>() / len;
        let my = pairs.iter().map(|p| p.1).sum::<f64>() / len;
        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for &(x, y) in &pairs {
            sxy += (x - mx) * (y - my);
            sxx += (x - mx) * (x - mx);
            syy += (y - my) * (y - my);
        }
        let den = (sxx * syy).sqrt();
        out[i] = if den < EPSILON { 0.0 } else { sxy / den };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn percentile_rank_needs_min_valid() {
        let v: Vec<f64> = (0..70).map(|i| i as f64).collect();
        let r = percentile_rank(&v, PERCENTILE_WINDOW, PERCENTILE_MIN_VALID);
        assert!(r[58].is_nan());
        // Rising series: the latest value is always the maximum.
        assert_approx(r[59], 1.0, DEFAULT_EPSILON);
        assert_approx(r[69], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn percentile_rank_of_minimum() {
        let mut v = vec![5.0; 9];
        v.push(1.0);
        let r = percentile_rank(&v, 10, 5);
        assert_approx(r[9], 0.1, DEFAULT_EPSILON);
    }

    #[test]
    fn percentile_window_rolls() {
        let v: Vec<f64> = (0..200).map(|i| -(i as f64)).collect();
        let r = percentile_rank(&v, 180, 60);
        // Falling series: only the current value is <= itself.
        assert_approx(r[199], 1.0 / 180.0, DEFAULT_EPSILON);
    }

    #[test]
    fn perfect_correlation() {
        let a: Vec<f64> = (0..25).map(|i| i as f64).collect();
        let b: Vec<f64> = a.iter().map(|x| 2.0 * x + 1.0).collect();
        let r = rolling_correlation(&a, &b, 20);
        assert!(r[18].is_nan());
        assert_approx(r[19], 1.0, 1e-9);
        let neg: Vec<f64> = a.iter().map(|x| -x).collect();
        assert_approx(rolling_correlation(&a, &neg, 20)[24], -1.0, 1e-9);
    }

    #[test]
    fn constant_volume_normalizes_to_one() {
        let r = volume_normalized(&[300.0; 25], 20);
        assert!(r[18].is_nan());
        assert_approx(r[24], 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn return_volatility_of_constant_growth_is_zero() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let r = return_volatility(&closes, 20);
        assert!(r[19].is_nan());
        assert!(r[20] < 1e-9);
    }
}
