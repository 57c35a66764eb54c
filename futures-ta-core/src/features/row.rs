//! The augmented bar.
//!
//! Every indicator the pipeline knows about is a named field. `None` means
//! the indicator has no value at this row: not enough history yet, or the
//! source column (volume, open interest) is absent from the series. Flags
//! are plain booleans and read `false` when undefined.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(flatten)]
    pub bar: Bar,

    // Moving averages. The relaxed variants average whatever history exists.
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20_relaxed: Option<f64>,
    pub ma60_relaxed: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub ema20: Option<f64>,

    // Volatility
    pub atr14: Option<f64>,
    pub atr_ratio: Option<f64>,
    /// Percentile rank (0-1) of `atr_ratio` over the trailing 180 rows.
    pub atr_ratio_pctl180: Option<f64>,
    pub boll_upper: Option<f64>,
    pub boll_middle: Option<f64>,
    pub boll_lower: Option<f64>,
    pub boll_bandwidth: Option<f64>,
    /// Std of daily returns over 20 rows, in percent.
    pub volatility_20d: Option<f64>,

    // Momentum
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub rsi14: Option<f64>,
    pub stoch_rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub williams_r14: Option<f64>,
    pub cci20: Option<f64>,
    pub cci_bull_div: bool,
    pub cci_bear_div: bool,
    pub tsi: Option<f64>,
    pub price_momentum_5d: Option<f64>,

    // Trend strength
    pub plus_di14: Option<f64>,
    pub minus_di14: Option<f64>,
    pub adx14: Option<f64>,
    pub adxr14: Option<f64>,

    pub kdj_k: Option<f64>,
    pub kdj_d: Option<f64>,
    /// Not clamped to [0, 100].
    pub kdj_j: Option<f64>,

    // Range, candles, pivots
    pub hhv20: Option<f64>,
    pub llv20: Option<f64>,
    pub breakout_long20: bool,
    pub breakout_short20: bool,
    pub pullback20_pct: Option<f64>,
    pub box20: bool,
    pub gap_pct: Option<f64>,
    pub upper_shadow_ratio: Option<f64>,
    pub lower_shadow_ratio: Option<f64>,
    pub pivot: Option<f64>,
    pub pivot_r1: Option<f64>,
    pub pivot_s1: Option<f64>,

    pub psar: Option<f64>,
    pub psar_trend: Option<i8>,

    // Ichimoku. Senkou spans are shifted forward (causal); chikou is shifted
    // backward and reads a future close.
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub senkou_a: Option<f64>,
    pub senkou_b: Option<f64>,
    pub chikou: Option<f64>,
    pub cloud_thickness: Option<f64>,

    // Volume (absent when the series has no volume)
    pub obv: Option<f64>,
    pub vol_ma20: Option<f64>,
    pub vol_z20: Option<f64>,
    pub vwap20: Option<f64>,
    pub cmf20: Option<f64>,
    pub vpt: Option<f64>,
    pub volume_momentum_5d: Option<f64>,
    pub volume_normalized: Option<f64>,
    pub vol_price_corr: Option<f64>,

    // Open interest (absent when the series has no open interest)
    pub oi_delta: Option<f64>,
    pub oi_change_pct: Option<f64>,
    pub oi_ma5: Option<f64>,
    pub oi_ma20: Option<f64>,
    pub oi_z20: Option<f64>,
    pub oi_position: Option<f64>,
    pub oi_bull_div: bool,
    pub oi_bear_div: bool,
    pub oi_rsi14: Option<f64>,
    pub oi_momentum_5d: Option<f64>,
    pub composite_score: Option<f64>,
    pub vol_oi_ratio: Option<f64>,
    pub vol_oi_ratio_ma20: Option<f64>,
    pub money_flow: Option<f64>,
    pub money_flow_ma5: Option<f64>,
}

impl FeatureRow {
    /// A row carrying only the bar; every indicator field is empty.
    pub fn from_bar(bar: Bar) -> Self {
        Self {
            bar,
            ..Self::default()
        }
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }
}
