//! Signal inference engine and multi-timeframe aggregator.
//!
//! [`summarize`] reduces one bar series to a [`Summary`]: direction and
//! strength from a weighted score, an ordered list of triggers, a volatility
//! regime and the price/open-interest divergence label.
//! [`analyze_multi_timeframe`] runs it on the daily series and on its weekly
//! resample.

pub mod config;
pub mod scores;
pub mod summary;
pub mod triggers;
pub mod weekly;

pub use config::{ConfigError, EngineConfig};
pub use scores::{compute_scores, Direction, ScoreSet};
pub use summary::{
    oi_divergence, summarize, Levels, OiDivergence, Quality, Snapshot, Summary, Volatility,
    VolatilityRegime,
};
pub use triggers::{detect_triggers, Trigger};
pub use weekly::{analyze_multi_timeframe, resample_weekly, week_ending_friday, MultiTimeframeReport};
