//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar for one instrument, with optional open interest.
///
/// `volume` and `open_interest` are `None` when the upstream loader had no
/// value for the cell. Missing cells are treated as absent, never as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
    pub open_interest: Option<f64>,
}

impl Bar {
    /// Returns true if any OHLC field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// Volume as a raw series value (NaN when absent).
    pub fn volume_or_nan(&self) -> f64 {
        self.volume.unwrap_or(f64::NAN)
    }

    /// Open interest as a raw series value (NaN when absent).
    pub fn open_interest_or_nan(&self) -> f64 {
        self.open_interest.unwrap_or(f64::NAN)
    }
}

/// Contract violations in a bar series handed to the engine.
///
/// The engine itself never rejects data; callers run [`validate_series`] at
/// the loading boundary before entering the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {index} ({date}) is not after the previous bar ({previous})")]
    NotIncreasing {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },
    #[error("bar {index} ({date}) has a non-finite {field}")]
    NonFinitePrice {
        index: usize,
        date: NaiveDate,
        field: &'static str,
    },
    #[error("bar {index} ({date}) has open/close outside its low-high range")]
    InconsistentRange { index: usize, date: NaiveDate },
    #[error("bar {index} ({date}) has a negative or non-finite {field}: {value}")]
    InvalidQuantity {
        index: usize,
        date: NaiveDate,
        field: &'static str,
        value: f64,
    },
}

/// Check the input contract: strictly increasing dates, finite and
/// consistent OHLC ([`Bar::is_sane`]), non-negative finite volume and open
/// interest when present.
pub fn validate_series(bars: &[Bar]) -> Result<(), BarError> {
    for (index, bar) in bars.iter().enumerate() {
        if index > 0 {
            let previous = bars[index - 1].date;
            if bar.date <= previous {
                return Err(BarError::NotIncreasing {
                    index,
                    date: bar.date,
                    previous,
                });
            }
        }

        for (field, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() {
                return Err(BarError::NonFinitePrice {
                    index,
                    date: bar.date,
                    field,
                });
            }
        }

        if !bar.is_sane() {
            return Err(BarError::InconsistentRange { index, date: bar.date });
        }

        for (field, value) in [("volume", bar.volume), ("open_interest", bar.open_interest)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(BarError::InvalidQuantity {
                        index,
                        date: bar.date,
                        field,
                        value: v,
                    });
                }
            }
        }
    }
    Ok(())
}
