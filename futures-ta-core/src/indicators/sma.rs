//! Simple Moving Average (SMA) of close.
//!
//! Two explicit policies:
//! - strict: first value at index period-1 (MA20/MA60 used by scores and triggers)
//! - relaxed: first value at index 0, averaging whatever history exists
//!   (MA5/MA10/MA20/MA60 for the snapshot readout)

use super::rolling::{rolling_mean, MinPeriods};
use super::{closes, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    min_periods: MinPeriods,
    name: String,
}

impl Sma {
    pub fn strict(period: usize) -> Self {
        Self::with_policy(period, MinPeriods::Strict)
    }

    pub fn relaxed(period: usize) -> Self {
        Self::with_policy(period, MinPeriods::Relaxed)
    }

    fn with_policy(period: usize, min_periods: MinPeriods) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        let name = match min_periods {
            MinPeriods::Strict => format!("sma_{period}"),
            MinPeriods::Relaxed => format!("sma_{period}_relaxed"),
        };
        Self {
            period,
            min_periods,
            name,
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.min_periods.required(self.period).saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        rolling_mean(&closes(bars), self.period, self.min_periods)
    }
}
