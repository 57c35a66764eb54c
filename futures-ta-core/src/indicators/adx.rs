//! DMI / ADX: Directional Movement Index and Average Directional Index.
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive bars (Wilder's rule: only the
//!    larger of the two moves counts, and only if positive)
//! 2. Average +DM, -DM and TR with a simple `period` mean
//! 3. +DI = 100 * mean(+DM) / mean(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI), epsilon-guarded
//! 5. ADX = `period` mean of DX
//! 6. ADXR = (ADX + ADX `period` bars ago) / 2
//!
//! Lookback: 2 * period - 1 for ADX.

use super::atr::true_range;
use super::rolling::{guard, rolling_mean, shift, MinPeriods};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct DmiSeries {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
    pub adxr: Vec<f64>,
}

/// +DM and -DM per bar. Index 0 is NaN (no previous bar).
pub fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if up.is_nan() || down.is_nan() {
            continue;
        }
        plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    (plus_dm, minus_dm)
}

pub fn dmi(bars: &[Bar], period: usize) -> DmiSeries {
    let (plus_dm, minus_dm) = directional_movement(bars);
    let mean_tr = rolling_mean(&true_range(bars), period, MinPeriods::Strict);
    let mean_plus = rolling_mean(&plus_dm, period, MinPeriods::Strict);
    let mean_minus = rolling_mean(&minus_dm, period, MinPeriods::Strict);

    let di = |dm: &[f64]| -> Vec<f64> {
        dm.iter()
            .zip(&mean_tr)
            .map(|(&d, &tr)| {
                if d.is_nan() || tr.is_nan() {
                    f64::NAN
                } else {
                    100.0 * d / guard(tr)
                }
            })
            .collect()
    };
    let plus_di = di(&mean_plus);
    let minus_di = di(&mean_minus);

    let dx: Vec<f64> = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(&p, &m)| {
            if p.is_nan() || m.is_nan() {
                f64::NAN
            } else {
                100.0 * (p - m).abs() / guard(p + m)
            }
        })
        .collect();

    let adx = rolling_mean(&dx, period, MinPeriods::Strict);
    let lagged = shift(&adx, period as isize);
    let adxr = adx.iter().zip(&lagged).map(|(a, l)| (a + l) / 2.0).collect();

    DmiSeries {
        plus_di,
        minus_di,
        dx,
        adx,
        adxr,
    }
}

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        dmi(bars, self.period).adx
    }
}
