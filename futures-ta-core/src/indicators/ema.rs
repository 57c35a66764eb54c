//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: the first valid observation. Values are emitted once `span`
//! observations have been folded in (strict), so lookback = span - 1.
//!
//! Missing inputs are skipped: the row stays NaN and the recursion resumes
//! at the next valid point.

use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.span.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&closes(bars), self.span)
    }
}

/// Strict span-based EMA of an arbitrary series (MACD legs, signal line).
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }
    ewm(values, 2.0 / (span as f64 + 1.0), span)
}

/// Recursive exponential mean with an explicit smoothing factor.
///
/// `min_periods` counts valid observations folded in before a value is
/// emitted; `0` and `1` both emit from the first valid point.
pub fn ewm(values: &[f64], alpha: f64, min_periods: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let mut prev: Option<f64> = None;
    let mut count = 0usize;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let next = match prev {
            None => v,
            Some(p) => alpha * v + (1.0 - alpha) * p,
        };
        prev = Some(next);
        count += 1;
        if count >= min_periods {
            result[i] = next;
        }
    }

    result
}

/// Bias-corrected exponential mean: weighted average of all observations so
/// far with weights (1 - alpha)^age, normalized by the weight sum.
pub fn ewm_adjusted(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    let decay = 1.0 - alpha;
    let mut num = 0.0;
    let mut den = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        num = v + decay * num;
        den = 1.0 + decay * den;
        result[i] = num / den;
    }

    result
}
