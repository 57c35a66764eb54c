//! Signal inference: reduce a bar series to a [`Summary`].
//!
//! The engine is stateless. Each call runs the feature pipeline over the
//! whole series, reads the last (and second-to-last) row and classifies.
//! It never fails: short or degenerate input produces a well-formed summary
//! with `quality.ok == false` and an explanatory note.

use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::scores::{compute_scores, Direction, ScoreSet};
use super::triggers::{detect_triggers, Trigger};
use crate::domain::Bar;
use crate::features::{FeaturePipeline, FeatureRow};
use crate::indicators::rolling::diff;
use crate::indicators::EPSILON;

/// Below this many rows the engine returns the fixed insufficient summary.
pub const MIN_SUMMARY_ROWS: usize = 5;
/// Valid closes needed before the volatility regime is evaluated.
pub const REGIME_MIN_CLOSES: usize = 100;
/// ATR / close above this is a high-volatility regime.
pub const HIGH_VOLATILITY_RATIO: f64 = 0.02;
const OI_DIVERGENCE_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityRegime {
    High,
    #[default]
    Low,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    pub atr: Option<f64>,
    pub regime: VolatilityRegime,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OiDivergence {
    /// Price and open interest moved the same way over the last 5 bars.
    Confirm,
    /// They moved in opposite directions.
    Conflict,
    #[default]
    Neutral,
}

/// Current indicator readout. Moving averages here use the relaxed window
/// policy so they are available on short histories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub close: Option<f64>,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub ema20: Option<f64>,
    pub atr14: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub boll_upper: Option<f64>,
    pub boll_middle: Option<f64>,
    pub boll_lower: Option<f64>,
    pub boll_bandwidth: Option<f64>,
    pub plus_di14: Option<f64>,
    pub minus_di14: Option<f64>,
    pub adx14: Option<f64>,
    pub adxr14: Option<f64>,
    pub kdj_k: Option<f64>,
    pub kdj_d: Option<f64>,
    pub kdj_j: Option<f64>,
    pub vol_z20: Option<f64>,
    pub oi_z20: Option<f64>,
    pub vwap20: Option<f64>,
    pub atr_ratio_pctl180: Option<f64>,
    pub box20: bool,
    pub psar: Option<f64>,
    pub psar_trend: Option<i8>,
    pub williams_r14: Option<f64>,
    pub cci20: Option<f64>,
    pub stoch_rsi: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub senkou_a: Option<f64>,
    pub senkou_b: Option<f64>,
    /// Display only: reads the close 26 bars ahead.
    pub chikou: Option<f64>,
    pub cmf20: Option<f64>,
    pub vpt: Option<f64>,
    pub tsi: Option<f64>,
}

impl Snapshot {
    fn from_row(row: &FeatureRow) -> Self {
        Self {
            close: Some(row.close()).filter(|c| c.is_finite()),
            ma5: row.ma5,
            ma10: row.ma10,
            ma20: row.ma20_relaxed,
            ma60: row.ma60_relaxed,
            ema20: row.ema20,
            atr14: row.atr14,
            rsi14: row.rsi14,
            macd: row.macd,
            macd_signal: row.macd_signal,
            macd_hist: row.macd_hist,
            boll_upper: row.boll_upper,
            boll_middle: row.boll_middle,
            boll_lower: row.boll_lower,
            boll_bandwidth: row.boll_bandwidth,
            plus_di14: row.plus_di14,
            minus_di14: row.minus_di14,
            adx14: row.adx14,
            adxr14: row.adxr14,
            kdj_k: row.kdj_k,
            kdj_d: row.kdj_d,
            kdj_j: row.kdj_j,
            vol_z20: row.vol_z20,
            oi_z20: row.oi_z20,
            vwap20: row.vwap20,
            atr_ratio_pctl180: row.atr_ratio_pctl180,
            box20: row.box20,
            psar: row.psar,
            psar_trend: row.psar_trend,
            williams_r14: row.williams_r14,
            cci20: row.cci20,
            stoch_rsi: row.stoch_rsi,
            stoch_k: row.stoch_k,
            stoch_d: row.stoch_d,
            tenkan: row.tenkan,
            kijun: row.kijun,
            senkou_a: row.senkou_a,
            senkou_b: row.senkou_b,
            chikou: row.chikou,
            cmf20: row.cmf20,
            vpt: row.vpt,
            tsi: row.tsi,
        }
    }
}

/// Reference price levels. Moving averages here are the strict ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub close: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub vwap20: Option<f64>,
    pub hhv20: Option<f64>,
    pub llv20: Option<f64>,
    pub pivot_r1: Option<f64>,
    pub pivot_s1: Option<f64>,
    pub atr14: Option<f64>,
    /// `atr_stop_multiplier * ATR14`, rounded to 4 decimals.
    pub atr_stop: Option<f64>,
}

impl Levels {
    fn from_row(row: &FeatureRow, config: &EngineConfig) -> Self {
        let close = Some(row.close()).filter(|c| c.is_finite());
        Self {
            close,
            ma20: row.ma20,
            ma60: row.ma60,
            vwap20: row.vwap20,
            hhv20: row.hhv20,
            llv20: row.llv20,
            pivot_r1: row.pivot_r1,
            pivot_s1: row.pivot_s1,
            atr14: row.atr14,
            atr_stop: row
                .atr14
                .filter(|_| close.is_some())
                .map(|atr| round_to(config.atr_stop_multiplier * atr, 4)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub row_count: usize,
    /// `row_count >= min_rows_required`.
    pub ok: bool,
    pub has_open_interest: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub direction: Direction,
    /// |raw score| clamped to [0, 1], rounded to 3 decimals.
    pub strength: f64,
    pub triggers: Vec<Trigger>,
    pub volatility: Volatility,
    pub oi_divergence: OiDivergence,
    pub notes: Vec<String>,
    pub snapshot: Snapshot,
    pub levels: Levels,
    pub scores: ScoreSet,
    pub quality: Quality,
}

impl Summary {
    /// The fixed answer for a series too short to read.
    pub fn insufficient(rows: usize, has_open_interest: bool) -> Self {
        Self {
            notes: vec![format!("insufficient sample: {rows} rows, need at least {MIN_SUMMARY_ROWS}")],
            quality: Quality {
                row_count: rows,
                ok: false,
                has_open_interest,
            },
            ..Self::default()
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn volatility(rows: &[FeatureRow], last: &FeatureRow) -> Volatility {
    let atr = last.atr14;
    let valid_closes = rows.iter().filter(|r| r.close().is_finite()).count();
    let regime = match atr {
        Some(atr) if valid_closes >= REGIME_MIN_CLOSES && last.close().is_finite() => {
            if atr / last.close().max(EPSILON) > HIGH_VOLATILITY_RATIO {
                VolatilityRegime::High
            } else {
                VolatilityRegime::Low
            }
        }
        _ => VolatilityRegime::Low,
    };
    Volatility { atr, regime }
}

/// Sign agreement of the 5-bar price change and 5-bar OI change.
pub fn oi_divergence(bars: &[Bar]) -> OiDivergence {
    if bars.len() <= OI_DIVERGENCE_WINDOW || !bars.iter().any(|b| b.open_interest.is_some()) {
        return OiDivergence::Neutral;
    }
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let oi: Vec<f64> = bars.iter().map(Bar::open_interest_or_nan).collect();
    let last = bars.len() - 1;
    let price = diff(&closes, OI_DIVERGENCE_WINDOW)[last];
    let interest = diff(&oi, OI_DIVERGENCE_WINDOW)[last];

    if (price > 0.0 && interest > 0.0) || (price < 0.0 && interest < 0.0) {
        OiDivergence::Confirm
    } else if (price > 0.0 && interest < 0.0) || (price < 0.0 && interest > 0.0) {
        OiDivergence::Conflict
    } else {
        OiDivergence::Neutral
    }
}

/// Run the feature pipeline and classify the latest bar.
pub fn summarize(bars: &[Bar], config: &EngineConfig) -> Summary {
    let has_open_interest = bars.iter().any(|b| b.open_interest.is_some());
    if bars.len() < MIN_SUMMARY_ROWS {
        return Summary::insufficient(bars.len(), has_open_interest);
    }

    let rows = FeaturePipeline::new(config.psar).run(bars);
    let n = rows.len();
    let last = &rows[n - 1];
    let prev = rows.get(n - 2);

    let scores = compute_scores(last);
    let triggers = detect_triggers(last, prev, config);

    let mut notes = Vec::new();
    if n < config.min_rows_required {
        notes.push(format!(
            "sample below {} rows ({n}): long-window indicators are incomplete",
            config.min_rows_required
        ));
    }
    if !bars.iter().any(|b| b.volume.is_some()) {
        notes.push("volume absent: volume-based indicators omitted".to_string());
    }
    if !has_open_interest {
        notes.push("open interest absent: open-interest indicators omitted".to_string());
    }

    Summary {
        direction: scores.direction(),
        strength: round_to(scores.strength, 3),
        triggers,
        volatility: volatility(&rows, last),
        oi_divergence: oi_divergence(bars),
        notes,
        snapshot: Snapshot::from_row(last),
        levels: Levels::from_row(last, config),
        scores,
        quality: Quality {
            row_count: n,
            ok: n >= config.min_rows_required,
            has_open_interest,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn round_to_decimals() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(2.5 * 1.23456789, 4), 3.0864);
    }

    #[test]
    fn four_rows_is_insufficient() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let s = summarize(&bars, &EngineConfig::default());
        assert_eq!(s.direction, Direction::Neutral);
        assert_eq!(s.strength, 0.0);
        assert!(s.triggers.is_empty());
        assert!(!s.quality.ok);
        assert_eq!(s.quality.row_count, 4);
        assert_eq!(s.notes.len(), 1);
    }

    #[test]
    fn short_history_is_flagged_but_read() {
        let bars = make_bars(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let s = summarize(&bars, &EngineConfig::default());
        assert!(!s.quality.ok);
        assert_eq!(s.quality.row_count, 30);
        assert!(s.notes.iter().any(|n| n.starts_with("sample below 60 rows")));
        assert!(s.notes.iter().any(|n| n.starts_with("open interest absent")));
        assert!(s.snapshot.ma60.is_some());
        assert!(s.levels.ma60.is_none());
    }

    #[test]
    fn regime_needs_100_closes() {
        // Wide bars: ATR / close is well above 2%.
        let closes: Vec<f64> = (0..120).map(|i| 50.0 + if i % 2 == 0 { 0.0 } else { 3.0 }).collect();
        let bars = make_bars(&closes);
        let config = EngineConfig::default();
        assert_eq!(summarize(&bars[..99], &config).volatility.regime, VolatilityRegime::Low);
        let full = summarize(&bars, &config);
        assert_eq!(full.volatility.regime, VolatilityRegime::High);
        assert!(full.volatility.atr.is_some());
    }

    #[test]
    fn oi_divergence_labels() {
        let mut bars = make_bars(&[10.0, 10.0, 10.0, 10.0, 10.0, 11.0]);
        assert_eq!(oi_divergence(&bars), OiDivergence::Neutral);

        for (i, b) in bars.iter_mut().enumerate() {
            b.open_interest = Some(100.0 + i as f64);
        }
        assert_eq!(oi_divergence(&bars), OiDivergence::Confirm);

        bars[5].open_interest = Some(50.0);
        assert_eq!(oi_divergence(&bars), OiDivergence::Conflict);

        bars[5].close = 10.0;
        assert_eq!(oi_divergence(&bars), OiDivergence::Neutral);
    }

    #[test]
    fn falling_price_and_falling_oi_confirm() {
        let mut bars = make_bars(&[12.0, 11.8, 11.5, 11.2, 11.0, 10.5]);
        for (i, b) in bars.iter_mut().enumerate() {
            b.open_interest = Some(500.0 - i as f64 * 10.0);
        }
        assert_eq!(oi_divergence(&bars), OiDivergence::Confirm);
    }

    #[test]
    fn atr_stop_is_multiplied_and_rounded() {
        let bars = make_bars(&(0..40).map(|i| 100.0 + (i as f64 * 0.37).sin() * 2.0).collect::<Vec<_>>());
        let s = summarize(&bars, &EngineConfig::default());
        let atr = s.levels.atr14.unwrap();
        assert_eq!(s.levels.atr_stop, Some(round_to(2.5 * atr, 4)));
    }
}
