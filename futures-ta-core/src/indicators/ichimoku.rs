//! Ichimoku Kinko Hyo.
//!
//! - Tenkan: midpoint of the 9-bar high/low range
//! - Kijun: midpoint of the 26-bar range
//! - Senkou A: (Tenkan + Kijun) / 2, plotted 26 bars ahead
//! - Senkou B: midpoint of the 52-bar range, plotted 26 bars ahead
//! - Chikou: close plotted 26 bars back
//! - Cloud thickness: |Senkou A - Senkou B|
//!
//! Senkou spans at row t come from row t - 26, so they are causal. Chikou at
//! row t is the close of row t + 26: it reads the future and is for display
//! only. Nothing in the engine's decisions consumes it.

use super::rolling::{rolling_max, rolling_min, shift};
use super::column;
use crate::domain::Bar;

pub const TENKAN: usize = 9;
pub const KIJUN: usize = 26;
pub const SENKOU_B: usize = 52;
pub const DISPLACEMENT: usize = 26;

#[derive(Debug, Clone)]
pub struct IchimokuSeries {
    pub tenkan: Vec<f64>,
    pub kijun: Vec<f64>,
    pub senkou_a: Vec<f64>,
    pub senkou_b: Vec<f64>,
    /// Non-causal.
    pub chikou: Vec<f64>,
    pub cloud_thickness: Vec<f64>,
}

fn midpoint(highs: &[f64], lows: &[f64], window: usize) -> Vec<f64> {
    rolling_max(highs, window)
        .iter()
        .zip(&rolling_min(lows, window))
        .map(|(h, l)| (h + l) / 2.0)
        .collect()
}

pub fn ichimoku(bars: &[Bar]) -> IchimokuSeries {
    let highs = column(bars, |b| b.high);
    let lows = column(bars, |b| b.low);
    let closes = column(bars, |b| b.close);
    let lead = DISPLACEMENT as isize;

    let tenkan = midpoint(&highs, &lows, TENKAN);
    let kijun = midpoint(&highs, &lows, KIJUN);
    let base_a: Vec<f64> = tenkan.iter().zip(&kijun).map(|(t, k)| (t + k) / 2.0).collect();
    let senkou_a = shift(&base_a, lead);
    let senkou_b = shift(&midpoint(&highs, &lows, SENKOU_B), lead);
    let chikou = shift(&closes, -lead);
    let cloud_thickness = senkou_a
        .iter()
        .zip(&senkou_b)
        .map(|(a, b)| (a - b).abs())
        .collect();

    IchimokuSeries {
        tenkan,
        kijun,
        senkou_a,
        senkou_b,
        chikou,
        cloud_thickness,
    }
}
