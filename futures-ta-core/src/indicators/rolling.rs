//! Rolling-window primitives over raw `f64` series.
//!
//! Every function returns a series the same length as its input. Missing
//! values are `f64::NAN`, both on input and output. A window yields a value
//! only when it holds at least `MinPeriods::required` valid points.

/// Substitute for a zero denominator. Indicators never divide by zero.
pub const EPSILON: f64 = 1e-9;

/// Minimum-periods policy for a rolling window.
///
/// Both policies are kept distinct on purpose: `Strict` feeds comparisons
/// (EMA20 vs MA60, breakouts), `Relaxed` gives always-available averages for
/// the snapshot readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinPeriods {
    /// Fewer than `window` valid points yields no value.
    Strict,
    /// One valid point is enough; early windows average what exists.
    Relaxed,
}

impl MinPeriods {
    pub fn required(self, window: usize) -> usize {
        match self {
            Self::Strict => window,
            Self::Relaxed => 1,
        }
    }
}

/// Replace a (near-)zero denominator with [`EPSILON`].
#[inline]
pub fn guard(den: f64) -> f64 {
    if den.abs() < EPSILON {
        EPSILON
    } else {
        den
    }
}

/// `num / den` with a guarded denominator; NaN in either operand stays NaN.
#[inline]
pub fn safe_div(num: f64, den: f64) -> f64 {
    if num.is_nan() || den.is_nan() {
        f64::NAN
    } else {
        num / guard(den)
    }
}

/// Apply `f` to the valid values of each trailing window of `window` points.
pub fn rolling_apply<F>(values: &[f64], window: usize, min_valid: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 {
        return result;
    }

    let min_valid = min_valid.max(1);
    let mut buf = Vec::with_capacity(window);
    for i in 0..n {
        let start = (i + 1).saturating_sub(window);
        buf.clear();
        buf.extend(values[start..=i].iter().copied().filter(|v| !v.is_nan()));
        if buf.len() >= min_valid {
            result[i] = f(&buf);
        }
    }
    result
}

pub fn rolling_mean(values: &[f64], window: usize, min: MinPeriods) -> Vec<f64> {
    rolling_apply(values, window, min.required(window), mean)
}

pub fn rolling_sum(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, window, |w| w.iter().sum())
}

/// Sample standard deviation (n - 1) over a strict window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, window.max(2), sample_std)
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, window, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Mean absolute deviation from the window mean.
pub fn rolling_mad(values: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(values, window, window, |w| {
        let m = mean(w);
        w.iter().map(|v| (v - m).abs()).sum::<f64>() / w.len() as f64
    })
}

/// Rolling z-score: (x - mean) / std over a strict window, epsilon-guarded.
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    let means = rolling_mean(values, window, MinPeriods::Strict);
    let stds = rolling_std(values, window);
    values
        .iter()
        .zip(means.iter().zip(&stds))
        .map(|(&v, (&m, &s))| safe_div(v - m, s))
        .collect()
}

/// `x[t] - x[t - lag]`.
pub fn diff(values: &[f64], lag: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i < lag {
                f64::NAN
            } else {
                values[i] - values[i - lag]
            }
        })
        .collect()
}

/// `x[t] / x[t - lag] - 1`, epsilon-guarded.
pub fn pct_change(values: &[f64], lag: usize) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            if i < lag {
                f64::NAN
            } else {
                safe_div(values[i] - values[i - lag], values[i - lag])
            }
        })
        .collect()
}

/// Shift a series by `periods` rows. Positive periods move values later in
/// time (row t sees t - periods); negative periods pull future values back.
pub fn shift(values: &[f64], periods: isize) -> Vec<f64> {
    let n = values.len() as isize;
    (0..n)
        .map(|i| {
            let src = i - periods;
            if src >= 0 && src < n {
                values[src as usize]
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Running sum that skips missing points; a missing input leaves NaN at its
/// own row without breaking the accumulation.
pub fn cumsum(values: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                acc += v;
                acc
            }
        })
        .collect()
}

fn mean(w: &[f64]) -> f64 {
    w.iter().sum::<f64>() / w.len() as f64
}

fn sample_std(w: &[f64]) -> f64 {
    let m = mean(w);
    let ss: f64 = w.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (w.len() - 1) as f64).sqrt()
}
