//! Volume and money-flow indicators.
//!
//! Inputs take the volume column with missing cells as NaN (see
//! [`Bar::volume_or_nan`]). A missing volume leaves its own row undefined
//! and, for windowed measures, every window that contains it.

use super::rolling::{cumsum, diff, guard, pct_change, rolling_sum, safe_div};
use super::typical_price;
use crate::domain::Bar;

pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(Bar::volume_or_nan).collect()
}

/// On-balance volume: running sum of volume signed by the close-to-close move.
/// The first bar (no previous close) counts as unchanged.
pub fn obv(closes: &[f64], volume: &[f64]) -> Vec<f64> {
    let signed: Vec<f64> = diff(closes, 1)
        .iter()
        .zip(volume)
        .map(|(&d, &v)| {
            let sign = if d > 0.0 {
                1.0
            } else if d < 0.0 {
                -1.0
            } else {
                0.0
            };
            sign * v
        })
        .collect();
    cumsum(&signed)
}

/// Volume-weighted typical price over `window` bars.
pub fn vwap(bars: &[Bar], volume: &[f64], window: usize) -> Vec<f64> {
    let weighted: Vec<f64> = typical_price(bars).iter().zip(volume).map(|(p, v)| p * v).collect();
    let num = rolling_sum(&weighted, window);
    let den = rolling_sum(volume, window);
    num.iter().zip(&den).map(|(&n, &d)| safe_div(n, d)).collect()
}

/// Chaikin money flow over `window` bars.
pub fn chaikin_money_flow(bars: &[Bar], volume: &[f64], window: usize) -> Vec<f64> {
    let flow: Vec<f64> = bars
        .iter()
        .zip(volume)
        .map(|(b, &v)| {
            let multiplier = ((b.close - b.low) - (b.high - b.close)) / guard(b.high - b.low);
            multiplier * v
        })
        .collect();
    let num = rolling_sum(&flow, window);
    let den = rolling_sum(volume, window);
    num.iter().zip(&den).map(|(&n, &d)| safe_div(n, d)).collect()
}

/// Volume-price trend: running sum of percent change times volume.
pub fn volume_price_trend(closes: &[f64], volume: &[f64]) -> Vec<f64> {
    let flow: Vec<f64> = pct_change(closes, 1)
        .iter()
        .zip(volume)
        .map(|(r, v)| r * v)
        .collect();
    cumsum(&flow)
}
