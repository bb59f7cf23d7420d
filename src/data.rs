// src/data.rs
// Offline candle input and report output for the CLI. Not a wire format: the
// invariants live in the series, not in the files.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::DateTime;
use csv::ReaderBuilder;
use log::warn;

use crate::candles::RawCandle;
use crate::engine::ZoneDetectionResult;
use crate::errors::EngineError;

/// Reads candles from a CSV file with a header row. Recognized columns:
/// `time` (or `_time`), `open`, `high`, `low`, `close`, `volume`. Timestamps
/// may be epoch milliseconds or RFC 3339. Rows that fail to parse are skipped
/// with a warning; validation proper happens at series insertion.
pub fn load_candles_csv(path: &Path) -> Result<Vec<RawCandle>, EngineError> {
    let file = File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = rdr.headers()?.clone();
    let get_idx = |name: &str| headers.iter().position(|h| h == name);

    let (Some(t_idx), Some(o_idx), Some(h_idx), Some(l_idx), Some(c_idx), Some(v_idx)) = (
        get_idx("time").or_else(|| get_idx("_time")),
        get_idx("open"),
        get_idx("high"),
        get_idx("low"),
        get_idx("close"),
        get_idx("volume"),
    ) else {
        return Err(EngineError::Config(
            "CSV header mismatch: need time, open, high, low, close, volume".to_string(),
        ));
    };

    let mut candles = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("CSV record {} skipped: {}", row + 1, e);
                continue;
            }
        };
        let parse_f64 = |idx: usize| record.get(idx).and_then(|v| v.parse::<f64>().ok());
        let time = record.get(t_idx).and_then(parse_time);
        match (
            time,
            parse_f64(o_idx),
            parse_f64(h_idx),
            parse_f64(l_idx),
            parse_f64(c_idx),
            parse_f64(v_idx),
        ) {
            (Some(time), Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                candles.push(RawCandle {
                    time,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
            _ => warn!("CSV record {} skipped: unparseable fields", row + 1),
        }
    }
    Ok(candles)
}

fn parse_time(value: &str) -> Option<i64> {
    if let Ok(ms) = value.parse::<i64>() {
        return Some(ms);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

/// Writes the detection result as JSON to a file, or stdout when no path is
/// given.
pub fn write_report(
    result: &ZoneDetectionResult,
    path: Option<&Path>,
    pretty: bool,
) -> Result<(), EngineError> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    match path {
        Some(p) => {
            File::create(p)?.write_all(json.as_bytes())?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(json.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }
    Ok(())
}
