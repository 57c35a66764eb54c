//! Discrete trigger events read off the latest feature row.
//!
//! Rules are independent and evaluated in a fixed order; every rule that
//! fires appends its trigger. A few rules compare against the previous row.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::config::EngineConfig;
use crate::features::FeatureRow;

const KDJ_J_OVERBOUGHT: f64 = 100.0;
const KDJ_J_OVERSOLD: f64 = 0.0;
const VOLUME_Z_EXTREME: f64 = 2.0;
const SHADOW_BODY_RATIO: f64 = 2.0;
const GAP_THRESHOLD: f64 = 0.01;
const WILLIAMS_OVERBOUGHT: f64 = -20.0;
const WILLIAMS_OVERSOLD: f64 = -80.0;
const CCI_EXTREME: f64 = 100.0;
const STOCH_OVERBOUGHT: f64 = 80.0;
const STOCH_OVERSOLD: f64 = 20.0;
const CMF_PRESSURE: f64 = 0.1;
const TSI_STRONG: f64 = 25.0;
const OI_CHANGE_PCT_EXTREME: f64 = 5.0;
const OI_POSITION_HIGH: f64 = 80.0;
const OI_POSITION_LOW: f64 = 20.0;
const MONEY_FLOW_DOMINANCE: f64 = 0.5;
const COMPOSITE_EXTREME: f64 = 1.5;
const TURNOVER_HIGH: f64 = 1.5;
const TURNOVER_LOW: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    PriceAboveMaStack,
    PriceBelowMaStack,
    CloseAboveUpperBand,
    CloseBelowLowerBand,
    Breakout20,
    Breakdown20,
    MacdBullish,
    MacdBearish,
    MacdHistExpanding,
    MacdHistContracting,
    RsiOverbought,
    RsiOversold,
    BandwidthExpanding,
    BandwidthContracting,
    TrendStrong,
    TrendWeak,
    PlusDiDominant,
    MinusDiDominant,
    KdjBullishCross,
    KdjBearishCross,
    KdjOverbought,
    KdjOversold,
    VolumeSurge,
    VolumeDryUp,
    LongUpperShadow,
    LongLowerShadow,
    GapUp,
    GapDown,
    Box20,
    PsarUptrend,
    PsarDowntrend,
    PsarReversal,
    WilliamsOverbought,
    WilliamsOversold,
    CciOverbought,
    CciOversold,
    CciNeutral,
    StochRsiBullishCross,
    StochRsiBearishCross,
    StochRsiOverbought,
    StochRsiOversold,
    TenkanAboveKijun,
    TenkanBelowKijun,
    PriceAboveCloud,
    PriceBelowCloud,
    PriceInCloud,
    CmfBuyingPressure,
    CmfSellingPressure,
    TsiStrongUp,
    TsiStrongDown,
    CciBullishDivergence,
    CciBearishDivergence,
    OiSurge,
    OiDrop,
    OiNearHigh,
    OiNearLow,
    PriceOiBullishDivergence,
    PriceOiBearishDivergence,
    MoneyInflow,
    MoneyOutflow,
    CompositeStrong,
    CompositeWeak,
    TurnoverSpike,
    TurnoverDrop,
}

impl Trigger {
    pub const ALL: [Trigger; 64] = [
        Self::PriceAboveMaStack,
        Self::PriceBelowMaStack,
        Self::CloseAboveUpperBand,
        Self::CloseBelowLowerBand,
        Self::Breakout20,
        Self::Breakdown20,
        Self::MacdBullish,
        Self::MacdBearish,
        Self::MacdHistExpanding,
        Self::MacdHistContracting,
        Self::RsiOverbought,
        Self::RsiOversold,
        Self::BandwidthExpanding,
        Self::BandwidthContracting,
        Self::TrendStrong,
        Self::TrendWeak,
        Self::PlusDiDominant,
        Self::MinusDiDominant,
        Self::KdjBullishCross,
        Self::KdjBearishCross,
        Self::KdjOverbought,
        Self::KdjOversold,
        Self::VolumeSurge,
        Self::VolumeDryUp,
        Self::LongUpperShadow,
        Self::LongLowerShadow,
        Self::GapUp,
        Self::GapDown,
        Self::Box20,
        Self::PsarUptrend,
        Self::PsarDowntrend,
        Self::PsarReversal,
        Self::WilliamsOverbought,
        Self::WilliamsOversold,
        Self::CciOverbought,
        Self::CciOversold,
        Self::CciNeutral,
        Self::StochRsiBullishCross,
        Self::StochRsiBearishCross,
        Self::StochRsiOverbought,
        Self::StochRsiOversold,
        Self::TenkanAboveKijun,
        Self::TenkanBelowKijun,
        Self::PriceAboveCloud,
        Self::PriceBelowCloud,
        Self::PriceInCloud,
        Self::CmfBuyingPressure,
        Self::CmfSellingPressure,
        Self::TsiStrongUp,
        Self::TsiStrongDown,
        Self::CciBullishDivergence,
        Self::CciBearishDivergence,
        Self::OiSurge,
        Self::OiDrop,
        Self::OiNearHigh,
        Self::OiNearLow,
        Self::PriceOiBullishDivergence,
        Self::PriceOiBearishDivergence,
        Self::MoneyInflow,
        Self::MoneyOutflow,
        Self::CompositeStrong,
        Self::CompositeWeak,
        Self::TurnoverSpike,
        Self::TurnoverDrop,
    ];

    /// Stable human-readable label. This is the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::PriceAboveMaStack => "price above MA20 above MA60: uptrend continuation",
            Self::PriceBelowMaStack => "price below MA20 below MA60: downtrend continuation",
            Self::CloseAboveUpperBand => "close above upper Bollinger band",
            Self::CloseBelowLowerBand => "close below lower Bollinger band",
            Self::Breakout20 => "breakout above 20-bar high",
            Self::Breakdown20 => "breakdown below 20-bar low",
            Self::MacdBullish => "MACD above signal (golden cross)",
            Self::MacdBearish => "MACD below signal (death cross)",
            Self::MacdHistExpanding => "MACD histogram expanding",
            Self::MacdHistContracting => "MACD histogram contracting",
            Self::RsiOverbought => "RSI overbought",
            Self::RsiOversold => "RSI oversold",
            Self::BandwidthExpanding => "Bollinger bandwidth expanding",
            Self::BandwidthContracting => "Bollinger bandwidth contracting",
            Self::TrendStrong => "strong trend (ADX at or above threshold)",
            Self::TrendWeak => "weak trend (ADX below threshold)",
            Self::PlusDiDominant => "bulls dominant (+DI > -DI)",
            Self::MinusDiDominant => "bears dominant (+DI < -DI)",
            Self::KdjBullishCross => "KDJ golden cross",
            Self::KdjBearishCross => "KDJ death cross",
            Self::KdjOverbought => "KDJ overbought (J >= 100)",
            Self::KdjOversold => "KDJ oversold (J <= 0)",
            Self::VolumeSurge => "volume surge (volume z >= 2)",
            Self::VolumeDryUp => "volume dry-up (volume z <= -2)",
            Self::LongUpperShadow => "long upper shadow (possible resistance)",
            Self::LongLowerShadow => "long lower shadow (possible support)",
            Self::GapUp => "gap up (>= 1%)",
            Self::GapDown => "gap down (<= -1%)",
            Self::Box20 => "20-bar consolidation box",
            Self::PsarUptrend => "PSAR uptrend confirmed",
            Self::PsarDowntrend => "PSAR downtrend confirmed",
            Self::PsarReversal => "PSAR reversal signal",
            Self::WilliamsOverbought => "Williams %R overbought (>= -20)",
            Self::WilliamsOversold => "Williams %R oversold (<= -80)",
            Self::CciOverbought => "CCI overbought (>= 100)",
            Self::CciOversold => "CCI oversold (<= -100)",
            Self::CciNeutral => "CCI in normal range",
            Self::StochRsiBullishCross => "Stoch RSI golden cross",
            Self::StochRsiBearishCross => "Stoch RSI death cross",
            Self::StochRsiOverbought => "Stoch RSI overbought (>= 80)",
            Self::StochRsiOversold => "Stoch RSI oversold (<= 20)",
            Self::TenkanAboveKijun => "Ichimoku: Tenkan above Kijun",
            Self::TenkanBelowKijun => "Ichimoku: Tenkan below Kijun",
            Self::PriceAboveCloud => "price above the cloud",
            Self::PriceBelowCloud => "price below the cloud",
            Self::PriceInCloud => "price inside the cloud",
            Self::CmfBuyingPressure => "CMF strong buying pressure (> 0.1)",
            Self::CmfSellingPressure => "CMF strong selling pressure (< -0.1)",
            Self::TsiStrongUp => "TSI strong uptrend (> 25)",
            Self::TsiStrongDown => "TSI strong downtrend (< -25)",
            Self::CciBullishDivergence => "CCI bullish divergence",
            Self::CciBearishDivergence => "CCI bearish divergence",
            Self::OiSurge => "open interest up sharply (> 5%)",
            Self::OiDrop => "open interest down sharply (< -5%)",
            Self::OiNearHigh => "open interest near 20-bar high (>= 80%)",
            Self::OiNearLow => "open interest near 20-bar low (<= 20%)",
            Self::PriceOiBullishDivergence => "price/open interest bullish divergence",
            Self::PriceOiBearishDivergence => "price/open interest bearish divergence",
            Self::MoneyInflow => "net money inflow (longs in control)",
            Self::MoneyOutflow => "net money outflow (shorts in control)",
            Self::CompositeStrong => "futures composite score strong (> 1.5)",
            Self::CompositeWeak => "futures composite score weak (< -1.5)",
            Self::TurnoverSpike => "turnover abnormally high",
            Self::TurnoverDrop => "turnover abnormally low",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Trigger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Self::from_label(&label).ok_or_else(|| de::Error::custom(format!("unknown trigger: {label}")))
    }
}

/// Both values present and `f` holds.
fn both(a: Option<f64>, b: Option<f64>, f: impl Fn(f64, f64) -> bool) -> bool {
    matches!((a, b), (Some(x), Some(y)) if f(x, y))
}

/// Evaluate every rule against `last` (and `prev` where a rule needs the
/// previous bar), in order.
pub fn detect_triggers(last: &FeatureRow, prev: Option<&FeatureRow>, config: &EngineConfig) -> Vec<Trigger> {
    let mut out = Vec::new();
    let mut push = |cond: bool, trigger: Trigger| {
        if cond {
            out.push(trigger);
        }
    };
    let close = last.close();

    // Moving-average stack
    if let (Some(ma20), Some(ma60)) = (last.ma20, last.ma60) {
        push(close > ma20 && ma20 > ma60, Trigger::PriceAboveMaStack);
        push(close < ma20 && ma20 < ma60, Trigger::PriceBelowMaStack);
    }

    // Bollinger breach
    if let (Some(up), Some(low)) = (last.boll_upper, last.boll_lower) {
        push(close > up, Trigger::CloseAboveUpperBand);
        push(close < low, Trigger::CloseBelowLowerBand);
    }

    push(last.breakout_long20, Trigger::Breakout20);
    push(last.breakout_short20, Trigger::Breakdown20);

    // MACD
    push(both(last.macd, last.macd_signal, |m, s| m > s), Trigger::MacdBullish);
    push(both(last.macd, last.macd_signal, |m, s| m < s), Trigger::MacdBearish);
    if let Some(prev) = prev {
        push(both(last.macd_hist, prev.macd_hist, |h, p| h > p), Trigger::MacdHistExpanding);
        push(both(last.macd_hist, prev.macd_hist, |h, p| h < p), Trigger::MacdHistContracting);
    }

    if let Some(rsi) = last.rsi14 {
        push(rsi >= config.rsi_overbought, Trigger::RsiOverbought);
        push(rsi <= config.rsi_oversold, Trigger::RsiOversold);
    }

    if let Some(prev) = prev {
        let now = last.boll_bandwidth;
        let before = prev.boll_bandwidth;
        let expanding = both(now, before, |n, b| n > b * config.bw_expand_ratio);
        push(expanding, Trigger::BandwidthExpanding);
        push(
            !expanding && both(now, before, |n, b| n < b * config.bw_contract_ratio),
            Trigger::BandwidthContracting,
        );
    }

    // ADX / DMI
    if let Some(adx) = last.adx14 {
        push(adx >= config.adx_trend_threshold, Trigger::TrendStrong);
        push(adx < config.adx_trend_threshold, Trigger::TrendWeak);
    }
    push(both(last.plus_di14, last.minus_di14, |p, m| p > m), Trigger::PlusDiDominant);
    push(both(last.plus_di14, last.minus_di14, |p, m| p < m), Trigger::MinusDiDominant);

    // KDJ
    push(both(last.kdj_k, last.kdj_d, |k, d| k > d), Trigger::KdjBullishCross);
    push(both(last.kdj_k, last.kdj_d, |k, d| k < d), Trigger::KdjBearishCross);
    if let Some(j) = last.kdj_j {
        push(j >= KDJ_J_OVERBOUGHT, Trigger::KdjOverbought);
        push(j <= KDJ_J_OVERSOLD, Trigger::KdjOversold);
    }

    if let Some(z) = last.vol_z20 {
        push(z >= VOLUME_Z_EXTREME, Trigger::VolumeSurge);
        push(z <= -VOLUME_Z_EXTREME, Trigger::VolumeDryUp);
    }

    // Candles
    push(last.upper_shadow_ratio.is_some_and(|r| r >= SHADOW_BODY_RATIO), Trigger::LongUpperShadow);
    push(last.lower_shadow_ratio.is_some_and(|r| r >= SHADOW_BODY_RATIO), Trigger::LongLowerShadow);
    if let Some(gap) = last.gap_pct {
        push(gap >= GAP_THRESHOLD, Trigger::GapUp);
        push(gap <= -GAP_THRESHOLD, Trigger::GapDown);
    }
    push(last.box20, Trigger::Box20);

    // PSAR
    if let (Some(sar), Some(trend)) = (last.psar, last.psar_trend) {
        let trigger = match trend {
            1 if close > sar => Trigger::PsarUptrend,
            -1 if close < sar => Trigger::PsarDowntrend,
            _ => Trigger::PsarReversal,
        };
        push(true, trigger);
    }

    if let Some(w) = last.williams_r14 {
        push(w >= WILLIAMS_OVERBOUGHT, Trigger::WilliamsOverbought);
        push(w <= WILLIAMS_OVERSOLD, Trigger::WilliamsOversold);
    }

    if let Some(cci) = last.cci20 {
        push(cci >= CCI_EXTREME, Trigger::CciOverbought);
        push(cci <= -CCI_EXTREME, Trigger::CciOversold);
        push(cci > -CCI_EXTREME && cci < CCI_EXTREME, Trigger::CciNeutral);
    }

    if let (Some(k), Some(d)) = (last.stoch_k, last.stoch_d) {
        push(k > d, Trigger::StochRsiBullishCross);
        push(k < d, Trigger::StochRsiBearishCross);
        push(k >= STOCH_OVERBOUGHT, Trigger::StochRsiOverbought);
        push(k <= STOCH_OVERSOLD, Trigger::StochRsiOversold);
    }

    // Ichimoku (causal lines only)
    push(both(last.tenkan, last.kijun, |t, k| t > k), Trigger::TenkanAboveKijun);
    push(both(last.tenkan, last.kijun, |t, k| t < k), Trigger::TenkanBelowKijun);
    if let (Some(a), Some(b)) = (last.senkou_a, last.senkou_b) {
        let trigger = if close > a.max(b) {
            Trigger::PriceAboveCloud
        } else if close < a.min(b) {
            Trigger::PriceBelowCloud
        } else {
            Trigger::PriceInCloud
        };
        push(true, trigger);
    }

    if let Some(cmf) = last.cmf20 {
        push(cmf > CMF_PRESSURE, Trigger::CmfBuyingPressure);
        push(cmf < -CMF_PRESSURE, Trigger::CmfSellingPressure);
    }

    if let Some(tsi) = last.tsi {
        push(tsi > TSI_STRONG, Trigger::TsiStrongUp);
        push(tsi < -TSI_STRONG, Trigger::TsiStrongDown);
    }

    push(last.cci_bull_div, Trigger::CciBullishDivergence);
    push(last.cci_bear_div, Trigger::CciBearishDivergence);

    // Open interest
    if let Some(pct) = last.oi_change_pct {
        push(pct > OI_CHANGE_PCT_EXTREME, Trigger::OiSurge);
        push(pct < -OI_CHANGE_PCT_EXTREME, Trigger::OiDrop);
    }
    if let Some(pos) = last.oi_position {
        push(pos >= OI_POSITION_HIGH, Trigger::OiNearHigh);
        push(pos <= OI_POSITION_LOW, Trigger::OiNearLow);
    }
    push(last.oi_bull_div, Trigger::PriceOiBullishDivergence);
    push(last.oi_bear_div, Trigger::PriceOiBearishDivergence);

    if let Some(flow) = last.money_flow_ma5 {
        push(flow > MONEY_FLOW_DOMINANCE, Trigger::MoneyInflow);
        push(flow < -MONEY_FLOW_DOMINANCE, Trigger::MoneyOutflow);
    }

    if let Some(score) = last.composite_score {
        push(score > COMPOSITE_EXTREME, Trigger::CompositeStrong);
        push(score < -COMPOSITE_EXTREME, Trigger::CompositeWeak);
    }

    if let (Some(ratio), Some(avg)) = (last.vol_oi_ratio, last.vol_oi_ratio_ma20) {
        push(ratio > avg * TURNOVER_HIGH, Trigger::TurnoverSpike);
        push(ratio < avg * TURNOVER_LOW, Trigger::TurnoverDrop);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Bar;

    fn row(close: f64) -> FeatureRow {
        FeatureRow::from_bar(Bar {
            open: close,
            high: close,
            low: close,
            close,
            ..Bar::default()
        })
    }

    #[test]
    fn labels_are_unique_and_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for t in Trigger::ALL {
            assert!(seen.insert(t.label()), "duplicate label {}", t.label());
            assert_eq!(Trigger::from_label(t.label()), Some(t));
        }
        let json = serde_json::to_string(&Trigger::Breakout20).unwrap();
        assert_eq!(json, "\"breakout above 20-bar high\"");
        let back: Trigger = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Trigger::Breakout20);
        assert!(serde_json::from_str::<Trigger>("\"nope\"").is_err());
    }

    #[test]
    fn empty_row_fires_nothing() {
        assert!(detect_triggers(&row(100.0), None, &EngineConfig::default()).is_empty());
    }

    #[test]
    fn order_follows_rule_list() {
        let mut last = row(110.0);
        last.ma20 = Some(105.0);
        last.ma60 = Some(100.0);
        last.breakout_long20 = true;
        last.macd = Some(2.0);
        last.macd_signal = Some(1.0);
        last.rsi14 = Some(75.0);
        let t = detect_triggers(&last, None, &EngineConfig::default());
        assert_eq!(
            t,
            vec![
                Trigger::PriceAboveMaStack,
                Trigger::Breakout20,
                Trigger::MacdBullish,
                Trigger::RsiOverbought,
            ]
        );
    }

    #[test]
    fn rsi_thresholds_come_from_config() {
        let mut last = row(100.0);
        last.rsi14 = Some(75.0);
        let config = EngineConfig {
            rsi_overbought: 80.0,
            ..EngineConfig::default()
        };
        assert!(!detect_triggers(&last, None, &config).contains(&Trigger::RsiOverbought));
    }

    #[test]
    fn bandwidth_and_histogram_use_previous_row() {
        let mut prev = row(100.0);
        prev.boll_bandwidth = Some(10.0);
        prev.macd_hist = Some(0.5);
        let mut last = row(100.0);
        last.boll_bandwidth = Some(10.6);
        last.macd_hist = Some(0.4);
        let t = detect_triggers(&last, Some(&prev), &EngineConfig::default());
        assert_eq!(t, vec![Trigger::MacdHistContracting, Trigger::BandwidthExpanding]);

        last.boll_bandwidth = Some(10.2);
        let t = detect_triggers(&last, Some(&prev), &EngineConfig::default());
        assert!(!t.contains(&Trigger::BandwidthExpanding));
        assert!(!t.contains(&Trigger::BandwidthContracting));
    }

    #[test]
    fn psar_states() {
        let mut last = row(100.0);
        last.psar = Some(95.0);
        last.psar_trend = Some(1);
        assert_eq!(detect_triggers(&last, None, &EngineConfig::default()), vec![Trigger::PsarUptrend]);
        last.psar_trend = Some(-1);
        assert_eq!(detect_triggers(&last, None, &EngineConfig::default()), vec![Trigger::PsarReversal]);
    }

    #[test]
    fn cloud_position() {
        let mut last = row(100.0);
        last.senkou_a = Some(98.0);
        last.senkou_b = Some(102.0);
        assert_eq!(detect_triggers(&last, None, &EngineConfig::default()), vec![Trigger::PriceInCloud]);
    }

    #[test]
    fn open_interest_rules() {
        let mut last = row(100.0);
        last.oi_change_pct = Some(6.0);
        last.oi_position = Some(90.0);
        last.oi_bear_div = true;
        last.money_flow_ma5 = Some(-0.8);
        last.vol_oi_ratio = Some(0.4);
        last.vol_oi_ratio_ma20 = Some(0.2);
        let t = detect_triggers(&last, None, &EngineConfig::default());
        assert_eq!(
            t,
            vec![
                Trigger::OiSurge,
                Trigger::OiNearHigh,
                Trigger::PriceOiBearishDivergence,
                Trigger::MoneyOutflow,
                Trigger::TurnoverSpike,
            ]
        );
    }
}
