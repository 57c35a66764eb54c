//! JSON rendering of a report for downstream report and UI consumers.
//!
//! The document holds the symbol plus the daily and weekly summaries.
//! Undefined indicator values are `null`. Persisting it is the caller's job.

use anyhow::{Context, Result};
use futures_ta_core::engine::MultiTimeframeReport;
use serde::Serialize;

#[derive(Serialize)]
struct ReportDocument<'a> {
    symbol: &'a str,
    #[serde(flatten)]
    report: &'a MultiTimeframeReport,
}

/// Pretty-printed JSON for one instrument's report.
pub fn render_report(symbol: &str, report: &MultiTimeframeReport) -> Result<String> {
    serde_json::to_string_pretty(&ReportDocument { symbol, report })
        .with_context(|| format!("failed to serialize report for {symbol}"))
}
