//! Fixed-order orchestration of the indicator library.
//!
//! Stages run in dependency order:
//!
//! 1. Moving averages, ATR, OI delta
//! 2. MACD, RSI, Bollinger, DMI/ADX, KDJ, range/candles, OBV, VWAP
//! 3. PSAR, Williams %R, CCI, Stoch RSI, Ichimoku, CMF, VPT, TSI, ADXR,
//!    CCI divergence
//! 4. Open-interest family
//! 5. Futures composite and volatility/volume relationship
//!
//! Every stage reads raw columns or earlier stages, never a later one, and
//! the whole run is a pure function of the bars and the PSAR parameters.

use crate::domain::Bar;
use crate::indicators::candles::{candle_shape, floor_pivots, range_breakout};
use crate::indicators::composite::{futures_composite, momentum, oi_flow};
use crate::indicators::open_interest::open_interest_indicators;
use crate::indicators::rolling::{pct_change, rolling_mean, rolling_zscore};
use crate::indicators::volatility::{
    atr_ratio, percentile_rank, return_volatility, rolling_correlation, volume_normalized,
    PERCENTILE_MIN_VALID, PERCENTILE_WINDOW,
};
use crate::indicators::volume::{chaikin_money_flow, obv, volume_price_trend, volumes, vwap};
use crate::indicators::{
    bollinger_bands, cci, cci_divergence, closes, dmi, ema_of_series, ichimoku, kdj, macd,
    parabolic_sar, rsi_of_series, stoch_rsi, tsi, Atr, Indicator, MinPeriods, PsarParams, WilliamsR,
};

use super::row::FeatureRow;

/// Series shorter than this come back unaugmented.
pub const MIN_FEATURE_ROWS: usize = 2;

/// Configured feature pipeline. The PSAR schedule is the only tunable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeaturePipeline {
    pub psar: PsarParams,
}

/// Run the pipeline with default parameters.
pub fn compute_features(bars: &[Bar]) -> Vec<FeatureRow> {
    FeaturePipeline::default().run(bars)
}

fn at(series: &[f64], i: usize) -> Option<f64> {
    series.get(i).copied().filter(|v| v.is_finite())
}

fn at_opt(series: Option<&Vec<f64>>, i: usize) -> Option<f64> {
    series.and_then(|s| at(s, i))
}

impl FeaturePipeline {
    pub fn new(psar: PsarParams) -> Self {
        Self { psar }
    }

    pub fn run(&self, bars: &[Bar]) -> Vec<FeatureRow> {
        let mut rows: Vec<FeatureRow> = bars.iter().cloned().map(FeatureRow::from_bar).collect();
        if bars.len() < MIN_FEATURE_ROWS {
            return rows;
        }

        let close = closes(bars);
        let volume = bars.iter().any(|b| b.volume.is_some()).then(|| volumes(bars));
        let oi = bars
            .iter()
            .any(|b| b.open_interest.is_some())
            .then(|| bars.iter().map(Bar::open_interest_or_nan).collect::<Vec<f64>>());

        // Stage 1
        let ma5 = rolling_mean(&close, 5, MinPeriods::Relaxed);
        let ma10 = rolling_mean(&close, 10, MinPeriods::Relaxed);
        let ma20_relaxed = rolling_mean(&close, 20, MinPeriods::Relaxed);
        let ma60_relaxed = rolling_mean(&close, 60, MinPeriods::Relaxed);
        let ma20 = rolling_mean(&close, 20, MinPeriods::Strict);
        let ma60 = rolling_mean(&close, 60, MinPeriods::Strict);
        let ema20 = ema_of_series(&close, 20);
        let atr14 = Atr::new(14).compute(bars);

        // Stage 2
        let macd_s = macd(&close, 12, 26, 9);
        let rsi14 = rsi_of_series(&close, 14);
        let boll = bollinger_bands(&close, 20, 2.0);
        let range = range_breakout(&close, 20);
        let candles = candle_shape(bars);
        let pivots = floor_pivots(bars);
        let dmi_s = dmi(bars, 14);
        let kdj_s = kdj(bars, 9);
        let ratio = atr_ratio(&atr14, &close);
        let ratio_pctl = percentile_rank(&ratio, PERCENTILE_WINDOW, PERCENTILE_MIN_VALID);
        let obv_s = volume.as_ref().map(|v| obv(&close, v));
        let vol_ma20 = volume.as_ref().map(|v| rolling_mean(v, 20, MinPeriods::Strict));
        let vol_z20 = volume.as_ref().map(|v| rolling_zscore(v, 20));
        let vwap20 = volume.as_ref().map(|v| vwap(bars, v, 20));

        // Stage 3
        let psar = parabolic_sar(bars, &self.psar);
        let williams = WilliamsR::new(14).compute(bars);
        let cci20 = cci(bars, 20);
        let stoch = stoch_rsi(&rsi14, 14, 3, 3);
        let ichi = ichimoku(bars);
        let cmf20 = volume.as_ref().map(|v| chaikin_money_flow(bars, v, 20));
        let vpt = volume.as_ref().map(|v| volume_price_trend(&close, v));
        let tsi_s = tsi(&close, 25, 13);
        let cci_div = cci_divergence(&close, &cci20);

        // Stage 4
        let oi_s = oi.as_ref().map(|o| open_interest_indicators(&close, o));

        // Stage 5
        let price_momentum = momentum(&close);
        let volume_momentum = volume.as_ref().map(|v| momentum(v));
        let flow = oi.as_ref().map(|o| oi_flow(&close, o));
        let composite = match (&volume, &oi, &volume_momentum, &flow) {
            (Some(v), Some(o), Some(vm), Some(f)) => {
                Some(futures_composite(v, o, &price_momentum, vm, &f.oi_momentum))
            }
            _ => None,
        };
        let volatility_20d = return_volatility(&close, 20);
        let vol_norm = volume.as_ref().map(|v| volume_normalized(v, 20));
        let returns = pct_change(&close, 1);
        let vol_corr = vol_norm.as_ref().map(|vn| rolling_correlation(&returns, vn, 20));

        for (i, row) in rows.iter_mut().enumerate() {
            row.ma5 = at(&ma5, i);
            row.ma10 = at(&ma10, i);
            row.ma20_relaxed = at(&ma20_relaxed, i);
            row.ma60_relaxed = at(&ma60_relaxed, i);
            row.ma20 = at(&ma20, i);
            row.ma60 = at(&ma60, i);
            row.ema20 = at(&ema20, i);

            row.atr14 = at(&atr14, i);
            row.atr_ratio = at(&ratio, i);
            row.atr_ratio_pctl180 = at(&ratio_pctl, i);
            row.boll_upper = at(&boll.upper, i);
            row.boll_middle = at(&boll.middle, i);
            row.boll_lower = at(&boll.lower, i);
            row.boll_bandwidth = at(&boll.bandwidth, i);
            row.volatility_20d = at(&volatility_20d, i);

            row.macd = at(&macd_s.macd, i);
            row.macd_signal = at(&macd_s.signal, i);
            row.macd_hist = at(&macd_s.histogram, i);
            row.rsi14 = at(&rsi14, i);
            row.stoch_rsi = at(&stoch.raw, i);
            row.stoch_k = at(&stoch.k, i);
            row.stoch_d = at(&stoch.d, i);
            row.williams_r14 = at(&williams, i);
            row.cci20 = at(&cci20, i);
            row.cci_bull_div = cci_div.bullish[i];
            row.cci_bear_div = cci_div.bearish[i];
            row.tsi = at(&tsi_s, i);
            row.price_momentum_5d = at(&price_momentum, i);

            row.plus_di14 = at(&dmi_s.plus_di, i);
            row.minus_di14 = at(&dmi_s.minus_di, i);
            row.adx14 = at(&dmi_s.adx, i);
            row.adxr14 = at(&dmi_s.adxr, i);
            row.kdj_k = at(&kdj_s.k, i);
            row.kdj_d = at(&kdj_s.d, i);
            row.kdj_j = at(&kdj_s.j, i);

            row.hhv20 = at(&range.hhv, i);
            row.llv20 = at(&range.llv, i);
            row.breakout_long20 = range.breakout_long[i];
            row.breakout_short20 = range.breakout_short[i];
            row.pullback20_pct = at(&range.pullback_pct, i);
            row.box20 = range.box_flag[i];
            row.gap_pct = at(&candles.gap_pct, i);
            row.upper_shadow_ratio = at(&candles.upper_shadow_ratio, i);
            row.lower_shadow_ratio = at(&candles.lower_shadow_ratio, i);
            row.pivot = at(&pivots.pivot, i);
            row.pivot_r1 = at(&pivots.r1, i);
            row.pivot_s1 = at(&pivots.s1, i);

            row.psar = at(&psar.sar, i);
            row.psar_trend = at(&psar.trend, i).map(|t| if t > 0.0 { 1 } else { -1 });

            row.tenkan = at(&ichi.tenkan, i);
            row.kijun = at(&ichi.kijun, i);
            row.senkou_a = at(&ichi.senkou_a, i);
            row.senkou_b = at(&ichi.senkou_b, i);
            row.chikou = at(&ichi.chikou, i);
            row.cloud_thickness = at(&ichi.cloud_thickness, i);

            row.obv = at_opt(obv_s.as_ref(), i);
            row.vol_ma20 = at_opt(vol_ma20.as_ref(), i);
            row.vol_z20 = at_opt(vol_z20.as_ref(), i);
            row.vwap20 = at_opt(vwap20.as_ref(), i);
            row.cmf20 = at_opt(cmf20.as_ref(), i);
            row.vpt = at_opt(vpt.as_ref(), i);
            row.volume_momentum_5d = at_opt(volume_momentum.as_ref(), i);
            row.volume_normalized = at_opt(vol_norm.as_ref(), i);
            row.vol_price_corr = at_opt(vol_corr.as_ref(), i);

            if let Some(s) = &oi_s {
                row.oi_delta = at(&s.delta, i);
                row.oi_change_pct = at(&s.change_pct, i);
                row.oi_ma5 = at(&s.ma5, i);
                row.oi_ma20 = at(&s.ma20, i);
                row.oi_z20 = at(&s.z20, i);
                row.oi_position = at(&s.position, i);
                row.oi_bull_div = s.bull_divergence[i];
                row.oi_bear_div = s.bear_divergence[i];
                row.oi_rsi14 = at(&s.rsi14, i);
            }
            if let Some(f) = &flow {
                row.oi_momentum_5d = at(&f.oi_momentum, i);
                row.money_flow = at(&f.money_flow, i);
                row.money_flow_ma5 = at(&f.money_flow_ma5, i);
            }
            if let Some(c) = &composite {
                row.composite_score = at(&c.score, i);
                row.vol_oi_ratio = at(&c.vol_oi_ratio, i);
                row.vol_oi_ratio_ma20 = at(&c.vol_oi_ratio_ma20, i);
            }
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn trending(n: usize) -> Vec<Bar> {
        make_bars(&(0..n).map(|i| 100.0 + i as f64 * 0.5 + (i as f64 * 0.7).sin()).collect::<Vec<_>>())
    }

    #[test]
    fn short_series_is_unaugmented() {
        let bars = make_bars(&[100.0]);
        let rows = compute_features(&bars);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], FeatureRow::from_bar(bars[0].clone()));
    }

    #[test]
    fn one_row_per_bar() {
        let bars = trending(120);
        assert_eq!(compute_features(&bars).len(), 120);
    }

    #[test]
    fn relaxed_and_strict_averages_differ_during_warmup() {
        let rows = compute_features(&trending(30));
        assert!(rows[10].ma20_relaxed.is_some());
        assert!(rows[10].ma20.is_none());
        assert!(rows[25].ma60.is_none());
        assert!(rows[25].ma60_relaxed.is_some());
        assert_eq!(rows[25].ma20, rows[25].ma20_relaxed);
    }

    #[test]
    fn no_open_interest_means_no_oi_features() {
        let rows = compute_features(&trending(80));
        let last = &rows[79];
        assert!(last.vwap20.is_some());
        assert!(last.oi_delta.is_none());
        assert!(last.oi_z20.is_none());
        assert!(last.composite_score.is_none());
        assert!(last.money_flow.is_none());
    }

    #[test]
    fn no_volume_means_no_volume_features() {
        let mut bars = trending(80);
        for b in &mut bars {
            b.volume = None;
        }
        let last = compute_features(&bars).pop().unwrap();
        assert!(last.obv.is_none());
        assert!(last.vwap20.is_none());
        assert!(last.cmf20.is_none());
        assert!(last.vol_z20.is_none());
        assert!(last.rsi14.is_some());
    }

    #[test]
    fn open_interest_family_populates() {
        let mut bars = trending(80);
        for (i, b) in bars.iter_mut().enumerate() {
            b.open_interest = Some(10_000.0 + (i as f64 * 1.3).cos() * 500.0 + i as f64 * 10.0);
            b.volume = Some(2_000.0 + (i as f64 * 0.4).sin() * 300.0);
        }
        let last = compute_features(&bars).pop().unwrap();
        assert!(last.oi_delta.is_some());
        assert!(last.oi_position.is_some());
        assert!(last.oi_rsi14.is_some());
        assert!(last.composite_score.is_some());
        assert!(last.money_flow_ma5.is_some());
        assert!(last.vol_oi_ratio_ma20.is_some());
    }

    #[test]
    fn money_flow_without_volume() {
        let mut bars = make_bars(&(0..40).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        for (i, b) in bars.iter_mut().enumerate() {
            b.volume = None;
            b.open_interest = Some(5_000.0 + i as f64 * 10.0);
        }
        let last = compute_features(&bars).pop().unwrap();
        assert_eq!(last.oi_delta, Some(10.0));
        assert_eq!(last.money_flow, Some(1.0));
        assert_eq!(last.money_flow_ma5, Some(1.0));
        assert!(last.oi_momentum_5d.is_some());
        assert!(last.composite_score.is_none());
        assert!(last.vol_oi_ratio.is_none());
    }

    #[test]
    fn psar_trend_is_signed() {
        let rows = compute_features(&trending(40));
        for r in &rows {
            assert!(matches!(r.psar_trend, Some(1) | Some(-1)));
        }
    }
}
