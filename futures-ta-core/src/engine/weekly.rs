//! Multi-timeframe aggregation: daily bars to weekly bars, and the paired
//! daily/weekly report.
//!
//! Weeks end on Friday. A bar dated Saturday or Sunday belongs to the week
//! ending the following Friday. Each weekly bar is dated by its Friday.
//!
//! | field         | rule                                    |
//! |---------------|-----------------------------------------|
//! | open          | first valid                             |
//! | high          | max                                     |
//! | low           | min                                     |
//! | close         | last valid                              |
//! | volume        | sum of present values, absent if none   |
//! | open_interest | last present value                      |
//!
//! Weeks without a valid open, high, low or close are dropped.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::config::EngineConfig;
use super::summary::{summarize, Summary};
use crate::domain::{Bar, Timeframe};

/// The Friday that closes the week containing `date`.
pub fn week_ending_friday(date: NaiveDate) -> NaiveDate {
    let from_monday = i64::from(date.weekday().num_days_from_monday());
    // Friday is day 4 counted from Monday.
    let ahead = (4 - from_monday).rem_euclid(7);
    date + Duration::days(ahead)
}

#[derive(Default)]
struct WeekAccumulator {
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    open_interest: Option<f64>,
}

impl WeekAccumulator {
    fn push(&mut self, bar: &Bar) {
        if bar.open.is_finite() && self.open.is_none() {
            self.open = Some(bar.open);
        }
        if bar.high.is_finite() {
            self.high = Some(self.high.map_or(bar.high, |h| h.max(bar.high)));
        }
        if bar.low.is_finite() {
            self.low = Some(self.low.map_or(bar.low, |l| l.min(bar.low)));
        }
        if bar.close.is_finite() {
            self.close = Some(bar.close);
        }
        if let Some(v) = bar.volume.filter(|v| v.is_finite()) {
            self.volume = Some(self.volume.unwrap_or(0.0) + v);
        }
        if let Some(oi) = bar.open_interest.filter(|v| v.is_finite()) {
            self.open_interest = Some(oi);
        }
    }

    fn finish(self, date: NaiveDate) -> Option<Bar> {
        Some(Bar {
            date,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume,
            open_interest: self.open_interest,
        })
    }
}

/// Resample an ordered daily series into weekly bars.
pub fn resample_weekly(bars: &[Bar]) -> Vec<Bar> {
    let mut weeks = Vec::new();
    let mut current: Option<(NaiveDate, WeekAccumulator)> = None;

    for bar in bars {
        let label = week_ending_friday(bar.date);
        match &mut current {
            Some((week, acc)) if *week == label => acc.push(bar),
            _ => {
                if let Some((week, acc)) = current.take() {
                    weeks.extend(acc.finish(week));
                }
                let mut acc = WeekAccumulator::default();
                acc.push(bar);
                current = Some((label, acc));
            }
        }
    }
    if let Some((week, acc)) = current {
        weeks.extend(acc.finish(week));
    }

    weeks
}

/// Daily and weekly summaries side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTimeframeReport {
    pub timeframes: Vec<Timeframe>,
    pub daily: Summary,
    pub weekly: Summary,
}

impl MultiTimeframeReport {
    pub fn get(&self, timeframe: Timeframe) -> &Summary {
        match timeframe {
            Timeframe::Daily => &self.daily,
            Timeframe::Weekly => &self.weekly,
        }
    }
}

/// Summarize the daily series and its weekly resample independently.
pub fn analyze_multi_timeframe(bars: &[Bar], config: &EngineConfig) -> MultiTimeframeReport {
    let weekly_bars = resample_weekly(bars);
    MultiTimeframeReport {
        timeframes: vec![Timeframe::Daily, Timeframe::Weekly],
        daily: summarize(bars, config),
        weekly: summarize(&weekly_bars, config),
    }
}
