//! Futures TA Core: bar types, indicator library, feature pipeline, signal
//! inference and weekly aggregation.
//!
//! The crate is a pure computation layer:
//! - Domain types (bars, timeframes) and the input contract check
//! - Indicator library over `f64` series with NaN for "no value yet"
//! - Feature pipeline producing one [`features::FeatureRow`] per bar
//! - Signal engine: scores, triggers, levels and a JSON-ready summary
//! - Weekly (W-FRI) resampling and the daily/weekly report
//!
//! No I/O happens here. Loading, batch orchestration and logging live in
//! the runner crate.

pub mod domain;
pub mod engine;
pub mod features;
pub mod indicators;
