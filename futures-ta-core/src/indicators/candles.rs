//! Price-structure features: 20-bar range and breakouts, candle shape, gaps
//! and floor pivots.

use super::rolling::{guard, rolling_max, rolling_min, safe_div, shift};
use crate::domain::Bar;

/// Range / midpoint below this counts as a consolidation box.
pub const BOX_THRESHOLD: f64 = 0.03;

#[derive(Debug, Clone)]
pub struct RangeSeries {
    /// Highest close of the last `window` bars, current bar included.
    pub hhv: Vec<f64>,
    /// Lowest close of the last `window` bars, current bar included.
    pub llv: Vec<f64>,
    /// Close above the highest close of the preceding `window` bars.
    pub breakout_long: Vec<bool>,
    /// Close below the lowest close of the preceding `window` bars.
    pub breakout_short: Vec<bool>,
    /// (close - hhv) / hhv, always <= 0.
    pub pullback_pct: Vec<f64>,
    pub box_flag: Vec<bool>,
}

pub fn range_breakout(closes: &[f64], window: usize) -> RangeSeries {
    let hhv = rolling_max(closes, window);
    let llv = rolling_min(closes, window);
    let prior_high = shift(&hhv, 1);
    let prior_low = shift(&llv, 1);

    let breakout_long = closes.iter().zip(&prior_high).map(|(c, h)| c > h).collect();
    let breakout_short = closes.iter().zip(&prior_low).map(|(c, l)| c < l).collect();
    let pullback_pct = closes
        .iter()
        .zip(&hhv)
        .map(|(&c, &h)| safe_div(c - h, h))
        .collect();
    let box_flag = hhv
        .iter()
        .zip(&llv)
        .map(|(&h, &l)| safe_div(h - l, (h + l) / 2.0) < BOX_THRESHOLD)
        .collect();

    RangeSeries {
        hhv,
        llv,
        breakout_long,
        breakout_short,
        pullback_pct,
        box_flag,
    }
}

#[derive(Debug, Clone)]
pub struct CandleShape {
    /// (open - previous close) / previous close.
    pub gap_pct: Vec<f64>,
    /// Upper shadow / body.
    pub upper_shadow_ratio: Vec<f64>,
    /// Lower shadow / body.
    pub lower_shadow_ratio: Vec<f64>,
}

pub fn candle_shape(bars: &[Bar]) -> CandleShape {
    let mut gap_pct = vec![f64::NAN; bars.len()];
    for i in 1..bars.len() {
        let prev = bars[i - 1].close;
        gap_pct[i] = safe_div(bars[i].open - prev, prev);
    }

    let (upper_shadow_ratio, lower_shadow_ratio) = bars
        .iter()
        .map(|b| {
            let body = guard((b.close - b.open).abs());
            let top = b.open.max(b.close);
            let bottom = b.open.min(b.close);
            let upper = (b.high - top).max(0.0);
            let lower = (bottom - b.low).max(0.0);
            (upper / body, lower / body)
        })
        .unzip();

    CandleShape {
        gap_pct,
        upper_shadow_ratio,
        lower_shadow_ratio,
    }
}

/// Classic floor pivots for each bar, computed from the bar before it.
#[derive(Debug, Clone)]
pub struct PivotLevels {
    pub pivot: Vec<f64>,
    pub r1: Vec<f64>,
    pub s1: Vec<f64>,
}

pub fn floor_pivots(bars: &[Bar]) -> PivotLevels {
    let n = bars.len();
    let mut pivot = vec![f64::NAN; n];
    let mut r1 = vec![f64::NAN; n];
    let mut s1 = vec![f64::NAN; n];
    for i in 1..n {
        let prev = &bars[i - 1];
        let p = (prev.high + prev.low + prev.close) / 3.0;
        pivot[i] = p;
        r1[i] = 2.0 * p - prev.low;
        s1[i] = 2.0 * p - prev.high;
    }
    PivotLevels { pivot, r1, s1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_ohlc_bars, DEFAULT_EPSILON};

    #[test]
    fn breakout_compares_with_preceding_window() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        closes.push(105.0);
        let r = range_breakout(&closes, 20);
        assert!(r.breakout_long[20]);
        assert!(!r.breakout_short[20]);
        // The level itself includes the breakout bar.
        assert_eq!(r.hhv[20], 105.0);
        assert_approx(r.pullback_pct[20], 0.0, DEFAULT_EPSILON);
        // Not enough history for a prior window yet.
        assert!(!r.breakout_long[19]);
    }

    #[test]
    fn breakdown_flag() {
        let mut closes = vec![50.0; 21];
        closes.push(49.0);
        let r = range_breakout(&closes, 20);
        assert!(r.breakout_short[21]);
        assert!(!r.breakout_long[21]);
    }

    #[test]
    fn tight_range_is_a_box() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 2) as f64).collect();
        let r = range_breakout(&closes, 20);
        assert!(!r.box_flag[18]);
        assert!(r.box_flag[19]);

        let wide: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert!(!range_breakout(&wide, 20).box_flag[19]);
    }

    #[test]
    fn shadows_and_gap() {
        let bars = make_ohlc_bars(&[
            (10.0, 10.5, 9.5, 10.0),
            // Gap up 2%, body 0.5, upper shadow 1.5, lower shadow 0.
            (10.2, 12.2, 10.2, 10.7),
        ]);
        let s = candle_shape(&bars);
        assert!(s.gap_pct[0].is_nan());
        assert_approx(s.gap_pct[1], 0.02, 1e-9);
        assert_approx(s.upper_shadow_ratio[1], 3.0, 1e-9);
        assert_approx(s.lower_shadow_ratio[1], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn pivots_from_previous_bar() {
        let bars = make_ohlc_bars(&[(10.0, 12.0, 6.0, 9.0), (9.0, 10.0, 8.0, 9.5)]);
        let p = floor_pivots(&bars);
        assert!(p.pivot[0].is_nan());
        assert_approx(p.pivot[1], 9.0, DEFAULT_EPSILON);
        assert_approx(p.r1[1], 12.0, DEFAULT_EPSILON);
        assert_approx(p.s1[1], 6.0, DEFAULT_EPSILON);
    }
}
