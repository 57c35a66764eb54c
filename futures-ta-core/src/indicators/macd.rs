//! MACD: Moving Average Convergence Divergence.
//!
//! MACD = EMA(fast) - EMA(slow); signal = EMA(signal_span) of MACD;
//! histogram = MACD - signal. All EMAs are strict, so the signal line first
//! appears at index slow + signal_span - 2.

use super::ema::ema_of_series;

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdSeries {
    let fast_ema = ema_of_series(closes, fast);
    let slow_ema = ema_of_series(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema_of_series(&line, signal_span);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdSeries {
        macd: line,
        signal,
        histogram,
    }
}
