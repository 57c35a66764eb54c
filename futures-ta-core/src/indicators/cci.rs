//! Commodity Channel Index and a simple CCI divergence detector.
//!
//! CCI = (TP - SMA_n(TP)) / (0.015 * MAD_n(TP)), TP = (high + low + close) / 3.
//! Lookback: period - 1.

use super::rolling::{guard, rolling_mad, rolling_mean, MinPeriods};
use super::{typical_price, Indicator};
use crate::domain::Bar;

const LAMBERT: f64 = 0.015;

pub fn cci(bars: &[Bar], period: usize) -> Vec<f64> {
    let tp = typical_price(bars);
    let sma = rolling_mean(&tp, period, MinPeriods::Strict);
    let mad = rolling_mad(&tp, period);
    tp.iter()
        .zip(sma.iter().zip(&mad))
        .map(|(&p, (&m, &d))| {
            if m.is_nan() || d.is_nan() {
                f64::NAN
            } else {
                (p - m) / guard(LAMBERT * d)
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    name: String,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "CCI period must be >= 1");
        Self {
            period,
            name: format!("cci_{period}"),
        }
    }
}

impl Indicator for Cci {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        cci(bars, self.period)
    }
}

/// Divergence flags between close and CCI.
#[derive(Debug, Clone)]
pub struct CciDivergence {
    pub bullish: Vec<bool>,
    pub bearish: Vec<bool>,
}

/// A local extreme at t-1 is only known once bar t has closed, so the flag
/// for a pivot at t-1 is raised on bar t. Bullish: close made a trough that
/// CCI did not make. Bearish: close made a peak that CCI did not make.
/// Rows where CCI is undefined around the pivot never flag.
pub fn cci_divergence(closes: &[f64], cci: &[f64]) -> CciDivergence {
    let n = closes.len().min(cci.len());
    let mut bullish = vec![false; closes.len()];
    let mut bearish = vec![false; closes.len()];

    for t in 2..n {
        let c = [closes[t - 2], closes[t - 1], closes[t]];
        let x = [cci[t - 2], cci[t - 1], cci[t]];
        if c.iter().chain(&x).any(|v| v.is_nan()) {
            continue;
        }
        bullish[t] = is_trough(c) && !is_trough(x);
        bearish[t] = is_peak(c) && !is_peak(x);
    }

    CciDivergence { bullish, bearish }
}

fn is_trough([a, b, c]: [f64; 3]) -> bool {
    b < a && b < c
}

fn is_peak([a, b, c]: [f64; 3]) -> bool {
    b > a && b > c
}
