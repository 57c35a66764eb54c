//! Weighted direction score.
//!
//! raw = 0.4 * trend + 0.3 * macd + 0.2 * dmi + 0.1 * vwap, where
//!
//! - trend = (EMA20 - MA60) / |MA60|
//! - macd  = (MACD - signal) / max(|signal| + eps, 1)
//! - dmi   = (+DI - -DI) / (+DI + -DI)
//! - vwap  = (close - VWAP20) / |VWAP20|
//!
//! A component whose inputs are missing contributes 0.

use serde::{Deserialize, Serialize};

use crate::features::FeatureRow;
use crate::indicators::EPSILON;

/// |raw| must exceed this for a directional call.
pub const DIRECTION_THRESHOLD: f64 = 0.02;

const W_TREND: f64 = 0.4;
const W_MACD: f64 = 0.3;
const W_DMI: f64 = 0.2;
const W_VWAP: f64 = 0.1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
    #[default]
    Neutral,
}

impl Direction {
    pub fn from_raw(raw: f64) -> Self {
        if raw > DIRECTION_THRESHOLD {
            Self::Long
        } else if raw < -DIRECTION_THRESHOLD {
            Self::Short
        } else {
            Self::Neutral
        }
    }

    pub fn sign(self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
            Self::Neutral => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Short => "short",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    pub trend: f64,
    pub macd: f64,
    pub dmi: f64,
    pub vwap: f64,
    pub raw: f64,
    /// clamp(|raw|, 0, 1)
    pub strength: f64,
    pub direction_sign: i8,
}

impl ScoreSet {
    pub fn direction(&self) -> Direction {
        Direction::from_raw(self.raw)
    }
}

fn relative(value: f64, base: f64) -> f64 {
    (value - base) / base.abs().max(EPSILON)
}

pub fn compute_scores(row: &FeatureRow) -> ScoreSet {
    let trend = match (row.ema20, row.ma60) {
        (Some(ema), Some(ma)) => relative(ema, ma),
        _ => 0.0,
    };
    let macd = match (row.macd, row.macd_signal) {
        (Some(m), Some(s)) => (m - s) / (s.abs() + EPSILON).max(1.0),
        _ => 0.0,
    };
    let dmi = match (row.plus_di14, row.minus_di14) {
        (Some(p), Some(m)) => (p - m) / (p + m).max(EPSILON),
        _ => 0.0,
    };
    let vwap = match row.vwap20 {
        Some(v) => relative(row.close(), v),
        None => 0.0,
    };

    let raw = W_TREND * trend + W_MACD * macd + W_DMI * dmi + W_VWAP * vwap;
    ScoreSet {
        trend,
        macd,
        dmi,
        vwap,
        raw,
        strength: raw.abs().clamp(0.0, 1.0),
        direction_sign: Direction::from_raw(raw).sign(),
    }
}
