//! Domain types for the analysis engine.

pub mod bar;
pub mod timeframe;

pub use bar::{validate_series, Bar, BarError};
pub use timeframe::Timeframe;
