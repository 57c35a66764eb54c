//! Look-ahead contamination tests.
//!
//! No value at bar t may depend on bar t+1 or later. Method: compute on a
//! truncated series (bars 0..100) and on the full series (bars 0..200), then
//! require bars 0..100 to match between both runs.
//!
//! Each indicator's first value must also land exactly at its declared
//! lookback.
//!
//! Chikou is the one deliberate exception (close shifted 26 bars back) and is
//! excluded from the feature-row comparison.

use chrono::NaiveDate;
use futures_ta_core::domain::Bar;
use futures_ta_core::features::compute_features;
use futures_ta_core::indicators::*;
use serde_json::Value;

/// N bars of synthetic OHLCV + OI data from a deterministic LCG walk.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;
    let mut oi = 50_000.0;

    for i in 0..n {
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed >> 33) % 200) as f64 * 0.05 - 5.0;
        price = (price + change).max(10.0);
        oi = (oi + ((seed >> 20) % 2000) as f64 - 1000.0).max(1000.0);

        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: Some(1000.0 + (i as f64) * 100.0),
            open_interest: Some(oi),
        });
    }

    bars
}

fn assert_no_lookahead(indicator: &dyn Indicator, full_bars: &[Bar], truncated_len: usize) {
    let full_result = indicator.compute(full_bars);
    let truncated_result = indicator.compute(&full_bars[..truncated_len]);

    assert_eq!(truncated_result.len(), truncated_len, "{}: length", indicator.name());
    assert_eq!(full_result.len(), full_bars.len(), "{}: length", indicator.name());

    let warmup = indicator.lookback();
    assert!(
        full_result[..warmup].iter().all(|v| v.is_nan()),
        "{}: value before bar {warmup}",
        indicator.name()
    );
    assert!(!full_result[warmup].is_nan(), "{}: no value at bar {warmup}", indicator.name());

    for i in 0..truncated_len {
        let (t, f) = (truncated_result[i], full_result[i]);
        if t.is_nan() && f.is_nan() {
            continue;
        }
        assert!(
            (t - f).abs() < 1e-10,
            "{}: look-ahead contamination at bar {i}: truncated={t}, full={f}",
            indicator.name()
        );
    }
}

fn assert_json_close(path: &str, a: &Value, b: &Value) {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap(), y.as_f64().unwrap());
            assert!((x - y).abs() < 1e-9, "{path}: truncated={x}, full={y}");
        }
        (Value::Object(x), Value::Object(y)) => {
            for (key, xv) in x {
                assert_json_close(&format!("{path}.{key}"), xv, &y[key]);
            }
        }
        _ => assert_eq!(a, b, "{path}"),
    }
}

#[test]
fn lookahead_price_indicators() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&Sma::strict(20), &bars, 100);
    assert_no_lookahead(&Sma::relaxed(60), &bars, 100);
    assert_no_lookahead(&Ema::new(20), &bars, 100);
    assert_no_lookahead(&Atr::new(14), &bars, 100);
    assert_no_lookahead(&Rsi::new(14), &bars, 100);
    assert_no_lookahead(&Adx::new(14), &bars, 100);
    assert_no_lookahead(&Cci::new(20), &bars, 100);
    assert_no_lookahead(&WilliamsR::new(14), &bars, 100);
}

#[test]
fn lookahead_bollinger() {
    let bars = make_test_bars(200);
    for band in [
        BollingerBand::Upper,
        BollingerBand::Middle,
        BollingerBand::Lower,
        BollingerBand::Bandwidth,
    ] {
        assert_no_lookahead(&Bollinger::new(20, 2.0, band), &bars, 100);
    }
}

#[test]
fn lookahead_parabolic_sar() {
    let bars = make_test_bars(200);
    assert_no_lookahead(&ParabolicSar::new(PsarParams::default()), &bars, 100);
}

#[test]
fn lookahead_feature_rows() {
    let bars = make_test_bars(200);
    let full = compute_features(&bars);
    let truncated = compute_features(&bars[..100]);

    for i in 0..100 {
        let mut t = serde_json::to_value(&truncated[i]).unwrap();
        let mut f = serde_json::to_value(&full[i]).unwrap();
        t.as_object_mut().unwrap().remove("chikou");
        f.as_object_mut().unwrap().remove("chikou");
        assert_json_close(&format!("row[{i}]"), &t, &f);
    }
}

#[test]
fn chikou_reads_the_future_close() {
    let bars = make_test_bars(60);
    let rows = compute_features(&bars);
    assert_eq!(rows[10].chikou, Some(bars[36].close));
    assert_eq!(rows[59].chikou, None);
}
