//! Indicator library.
//!
//! Indicators are pure functions: column history in, numeric series out.
//! Every series has the same length as its input bars, with `f64::NAN`
//! marking rows where the indicator has no value yet. Conversion to
//! `Option<f64>` happens once, when the feature pipeline builds rows.
//!
//! Single-series price indicators implement [`Indicator`]; multi-series and
//! volume/open-interest indicators are exposed as functions returning a small
//! struct of series.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod candles;
pub mod cci;
pub mod composite;
pub mod ema;
pub mod ichimoku;
pub mod kdj;
pub mod macd;
pub mod open_interest;
pub mod parabolic_sar;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod tsi;
pub mod volatility;
pub mod volume;
pub mod williams;

pub use adx::{directional_movement, dmi, Adx, DmiSeries};
pub use atr::{true_range, Atr};
pub use bollinger::{bollinger_bands, Bollinger, BollingerBand, BollingerSeries};
pub use candles::{candle_shape, floor_pivots, range_breakout, CandleShape, PivotLevels, RangeSeries};
pub use cci::{cci, cci_divergence, Cci, CciDivergence};
pub use composite::{futures_composite, momentum, oi_flow, CompositeSeries, OiFlowSeries};
pub use ema::{ema_of_series, ewm, ewm_adjusted, Ema};
pub use ichimoku::{ichimoku, IchimokuSeries};
pub use kdj::{kdj, KdjSeries};
pub use macd::{macd, MacdSeries};
pub use open_interest::{open_interest_indicators, OpenInterestSeries};
pub use parabolic_sar::{parabolic_sar, ParabolicSar, PsarParams, PsarSeries, PsarState};
pub use rolling::{MinPeriods, EPSILON};
pub use rsi::{rsi_of_series, stoch_rsi, Rsi, StochRsiSeries};
pub use sma::Sma;
pub use tsi::tsi;
pub use williams::WilliamsR;

use crate::domain::Bar;

/// Trait for single-series indicators computed from bars.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on bar t+1 or later. Every implementation
/// must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading bars that are `f64::NAN` before the first value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Extract one price column.
pub fn column(bars: &[Bar], field: impl Fn(&Bar) -> f64) -> Vec<f64> {
    bars.iter().map(field).collect()
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    column(bars, |b| b.close)
}

/// Typical price (high + low + close) / 3.
pub fn typical_price(bars: &[Bar]) -> Vec<f64> {
    column(bars, |b| (b.high + b.low + b.close) / 3.0)
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLC: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// no open interest.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: Some(1000.0),
                open_interest: None,
            }
        })
        .collect()
}

/// Create bars from explicit (open, high, low, close) tuples for testing.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: Some(1000.0),
            open_interest: None,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
