//! Per-instrument and universe-wide analysis.
//!
//! The engine never fails, so everything that can go wrong is checked here
//! before a series enters it: the configuration is validated and each bar
//! series must satisfy the input contract. A rejected instrument only loses
//! its own entry in a universe run.

use std::collections::{BTreeMap, HashMap};

use futures_ta_core::domain::{validate_series, Bar, BarError};
use futures_ta_core::engine::{analyze_multi_timeframe, ConfigError, EngineConfig, MultiTimeframeReport};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("series '{symbol}' rejected: {source}")]
    InvalidSeries {
        symbol: String,
        #[source]
        source: BarError,
    },
}

/// Per-symbol outcomes of a universe run, ordered by symbol.
pub type UniverseResults = BTreeMap<String, Result<MultiTimeframeReport, RunnerError>>;

/// Validate one instrument's daily series and produce its daily/weekly report.
pub fn analyze_instrument(
    symbol: &str,
    bars: &[Bar],
    config: &EngineConfig,
) -> Result<MultiTimeframeReport, RunnerError> {
    let span = info_span!("instrument", symbol, bars = bars.len());
    let _guard = span.enter();

    config.validate()?;
    if let Err(source) = validate_series(bars) {
        warn!(error = %source, "series rejected");
        return Err(RunnerError::InvalidSeries {
            symbol: symbol.to_string(),
            source,
        });
    }

    let report = analyze_multi_timeframe(bars, config);

    for note in report.daily.notes.iter().chain(&report.weekly.notes) {
        debug!(note = note.as_str(), "engine note");
    }
    info!(
        daily_direction = report.daily.direction.as_str(),
        daily_strength = report.daily.strength,
        weekly_direction = report.weekly.direction.as_str(),
        weekly_strength = report.weekly.strength,
        triggers = report.daily.triggers.len(),
        quality_ok = report.daily.quality.ok,
        "analysis complete"
    );

    Ok(report)
}

/// Analyze every instrument in parallel, one rayon task per symbol.
pub fn analyze_universe(universe: &HashMap<String, Vec<Bar>>, config: &EngineConfig) -> UniverseResults {
    let results: UniverseResults = universe
        .par_iter()
        .map(|(symbol, bars)| (symbol.clone(), analyze_instrument(symbol, bars, config)))
        .collect();

    let failed = results.values().filter(|r| r.is_err()).count();
    info!(
        instruments = results.len(),
        failed,
        "universe analysis complete"
    );
    results
}
