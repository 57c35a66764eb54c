//! Futures composite: price, volume and open interest read together.
//!
//! Momentum is the 5-bar percent change (x100). The composite score blends
//! the 20-bar z-scores of the three momenta 40/30/30 and needs volume; OI
//! momentum and money flow need only close and OI. Money-flow direction
//! classifies each bar by the signs of its price and OI changes:
//!
//! | price | OI   | flow |
//! |-------|------|------|
//! | up    | up   | +1   |
//! | down  | up   | -1   |
//! | up    | down | -0.5 |
//! | down  | down | +0.5 |
//!
//! anything else (including missing data) is 0.

use super::rolling::{diff, pct_change, rolling_mean, rolling_zscore, safe_div, MinPeriods};

pub const MOMENTUM_WINDOW: usize = 5;
pub const ZSCORE_WINDOW: usize = 20;
const WEIGHTS: (f64, f64, f64) = (0.4, 0.3, 0.3);

/// 5-bar percent change, x100.
pub fn momentum(values: &[f64]) -> Vec<f64> {
    pct_change(values, MOMENTUM_WINDOW)
        .into_iter()
        .map(|v| v * 100.0)
        .collect()
}

/// Open-interest momentum and money flow. Needs only close and OI.
#[derive(Debug, Clone)]
pub struct OiFlowSeries {
    pub oi_momentum: Vec<f64>,
    pub money_flow: Vec<f64>,
    pub money_flow_ma5: Vec<f64>,
}

pub fn oi_flow(closes: &[f64], oi: &[f64]) -> OiFlowSeries {
    let money_flow: Vec<f64> = diff(closes, 1)
        .iter()
        .zip(&diff(oi, 1))
        .map(|(&p, &o)| flow_direction(p, o))
        .collect();
    let money_flow_ma5 = rolling_mean(&money_flow, 5, MinPeriods::Strict);

    OiFlowSeries {
        oi_momentum: momentum(oi),
        money_flow,
        money_flow_ma5,
    }
}

/// Series that need volume and open interest together.
#[derive(Debug, Clone)]
pub struct CompositeSeries {
    pub score: Vec<f64>,
    pub vol_oi_ratio: Vec<f64>,
    pub vol_oi_ratio_ma20: Vec<f64>,
}

pub fn futures_composite(
    volume: &[f64],
    oi: &[f64],
    price_momentum: &[f64],
    volume_momentum: &[f64],
    oi_momentum: &[f64],
) -> CompositeSeries {
    let pz = rolling_zscore(price_momentum, ZSCORE_WINDOW);
    let vz = rolling_zscore(volume_momentum, ZSCORE_WINDOW);
    let oz = rolling_zscore(oi_momentum, ZSCORE_WINDOW);
    let score = pz
        .iter()
        .zip(vz.iter().zip(&oz))
        .map(|(p, (v, o))| WEIGHTS.0 * p + WEIGHTS.1 * v + WEIGHTS.2 * o)
        .collect();

    let vol_oi_ratio: Vec<f64> = volume.iter().zip(oi).map(|(&v, &o)| safe_div(v, o)).collect();
    let vol_oi_ratio_ma20 = rolling_mean(&vol_oi_ratio, 20, MinPeriods::Strict);

    CompositeSeries {
        score,
        vol_oi_ratio,
        vol_oi_ratio_ma20,
    }
}

fn flow_direction(price_change: f64, oi_change: f64) -> f64 {
    match (price_change > 0.0, price_change < 0.0, oi_change > 0.0, oi_change < 0.0) {
        (true, _, true, _) => 1.0,
        (_, true, true, _) => -1.0,
        (true, _, _, true) => -0.5,
        (_, true, _, true) => 0.5,
        _ => 0.0,
    }
}
