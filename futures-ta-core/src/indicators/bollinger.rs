//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//! - Bandwidth: upper - lower
//!
//! Uses sample stddev (divide by N - 1). Lookback: period - 1.

use super::rolling::{rolling_mean, rolling_std, MinPeriods};
use super::{closes, Indicator};
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
    Bandwidth,
}

/// All Bollinger series for one close column.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub bandwidth: Vec<f64>,
}

pub fn bollinger_bands(closes: &[f64], period: usize, multiplier: f64) -> BollingerSeries {
    let middle = rolling_mean(closes, period, MinPeriods::Strict);
    let std = rolling_std(closes, period);
    let upper: Vec<f64> = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m + multiplier * s)
        .collect();
    let lower: Vec<f64> = middle
        .iter()
        .zip(&std)
        .map(|(m, s)| m - multiplier * s)
        .collect();
    let bandwidth = upper.iter().zip(&lower).map(|(u, l)| u - l).collect();
    BollingerSeries {
        upper,
        middle,
        lower,
        bandwidth,
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
            BollingerBand::Bandwidth => "bandwidth",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let series = bollinger_bands(&closes(bars), self.period, self.multiplier);
        match self.band {
            BollingerBand::Upper => series.upper,
            BollingerBand::Middle => series.middle,
            BollingerBand::Lower => series.lower,
            BollingerBand::Bandwidth => series.bandwidth,
        }
    }
}
