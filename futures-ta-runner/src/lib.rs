//! Futures TA Runner: the boundary around `futures-ta-core`.
//!
//! This crate provides:
//! - Engine configuration loading from TOML files
//! - Series validation before anything reaches the engine
//! - Per-instrument daily/weekly analysis with structured logging
//! - Parallel batch analysis over a universe of instruments
//! - JSON rendering of reports

pub mod config;
pub mod export;
pub mod runner;

pub use config::load_config;
pub use export::render_report;
pub use runner::{analyze_instrument, analyze_universe, RunnerError, UniverseResults};
