//! Parabolic SAR: Wilder's stop-and-reverse system.
//!
//! The one indicator in the library that is not a windowed transform: it is
//! an explicit state machine advanced bar by bar.
//!
//! State: trend sign, current SAR, extreme point (EP), acceleration factor (AF).
//!
//! - Start: long, SAR = first low, EP = first high, AF = `af_start`.
//! - Each bar: candidate = SAR + AF * (EP - SAR), clamped so it never sits
//!   inside the two previous bars (at or below their lows when long, at or
//!   above their highs when short).
//! - Reversal: long and low <= candidate, or short and high >= candidate.
//!   SAR jumps to the old EP, EP becomes this bar's low/high, AF resets.
//! - Continuation: a new extreme moves EP and steps AF up to `af_max`.
//!
//! Fewer than two bars yields no values.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::Bar;

/// Acceleration-factor schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsarParams {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for PsarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.2,
        }
    }
}

impl PsarParams {
    pub fn is_valid(&self) -> bool {
        self.af_start > 0.0 && self.af_step > 0.0 && self.af_max >= self.af_start
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsarState {
    /// +1 long, -1 short.
    pub trend_sign: i8,
    pub sar: f64,
    pub extreme_point: f64,
    pub acceleration_factor: f64,
}

impl PsarState {
    pub fn start(first: &Bar, params: &PsarParams) -> Self {
        Self {
            trend_sign: 1,
            sar: first.low,
            extreme_point: first.high,
            acceleration_factor: params.af_start,
        }
    }

    /// Advance one bar. `prev` and `prev2` are the two bars before `bar`
    /// (the same bar twice at the start of the series).
    pub fn advance(&mut self, bar: &Bar, prev: &Bar, prev2: &Bar, params: &PsarParams) {
        let candidate = self.sar + self.acceleration_factor * (self.extreme_point - self.sar);

        if self.trend_sign > 0 {
            let sar = candidate.min(prev.low).min(prev2.low);
            if bar.low <= sar {
                self.reverse(-1, bar.low, params);
            } else {
                self.sar = sar;
                if bar.high > self.extreme_point {
                    self.extreme_point = bar.high;
                    self.step_af(params);
                }
            }
        } else {
            let sar = candidate.max(prev.high).max(prev2.high);
            if bar.high >= sar {
                self.reverse(1, bar.high, params);
            } else {
                self.sar = sar;
                if bar.low < self.extreme_point {
                    self.extreme_point = bar.low;
                    self.step_af(params);
                }
            }
        }
    }

    fn reverse(&mut self, trend_sign: i8, new_extreme: f64, params: &PsarParams) {
        self.trend_sign = trend_sign;
        self.sar = self.extreme_point;
        self.extreme_point = new_extreme;
        self.acceleration_factor = params.af_start;
    }

    fn step_af(&mut self, params: &PsarParams) {
        self.acceleration_factor = (self.acceleration_factor + params.af_step).min(params.af_max);
    }
}

#[derive(Debug, Clone)]
pub struct PsarSeries {
    pub sar: Vec<f64>,
    /// +1.0 / -1.0 per bar, NaN where undefined.
    pub trend: Vec<f64>,
}

pub fn parabolic_sar(bars: &[Bar], params: &PsarParams) -> PsarSeries {
    let n = bars.len();
    let mut sar = vec![f64::NAN; n];
    let mut trend = vec![f64::NAN; n];

    if n < 2 || bars[0].high.is_nan() || bars[0].low.is_nan() {
        return PsarSeries { sar, trend };
    }

    let mut state = PsarState::start(&bars[0], params);
    sar[0] = state.sar;
    trend[0] = f64::from(state.trend_sign);

    for i in 1..n {
        let bar = &bars[i];
        if bar.high.is_nan() || bar.low.is_nan() {
            // Unusable bar: leave the row empty and hold the state.
            continue;
        }
        let prev2 = &bars[i.saturating_sub(2)];
        state.advance(bar, &bars[i - 1], prev2, params);
        sar[i] = state.sar;
        trend[i] = f64::from(state.trend_sign);
    }

    PsarSeries { sar, trend }
}

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    params: PsarParams,
    name: String,
}

impl ParabolicSar {
    pub fn new(params: PsarParams) -> Self {
        assert!(params.is_valid(), "invalid PSAR acceleration parameters");
        Self {
            name: format!("psar_{}_{}_{}", params.af_start, params.af_step, params.af_max),
            params,
        }
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        parabolic_sar(bars, &self.params).sar
    }
}
