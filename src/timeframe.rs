// src/timeframe.rs
use crate::errors::EngineError;

/// Converts a timeframe string into an interval in milliseconds.
///
/// "1m" -> 60 * 1000 = 60000, "1h" -> 60 * 60 * 1000 = 3600000, etc.
/// Supported units: m, h, d, w.
pub fn timeframe_to_ms(timeframe: &str) -> Result<i64, EngineError> {
    let unit = timeframe
        .chars()
        .last()
        .ok_or_else(|| EngineError::Config("empty timeframe string".to_string()))?;
    let number: i64 = timeframe[..timeframe.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| EngineError::Config(format!("bad timeframe '{}'", timeframe)))?;
    if number <= 0 {
        return Err(EngineError::Config(format!(
            "timeframe '{}' must be positive",
            timeframe
        )));
    }
    let unit_ms: i64 = match unit {
        'm' => 60_000,
        'h' => 60_000 * 60,
        'd' => 60_000 * 60 * 24,
        'w' => 60_000 * 60 * 24 * 7,
        other => {
            return Err(EngineError::Config(format!(
                "unknown timeframe unit '{}'",
                other
            )))
        }
    };
    Ok(number * unit_ms)
}
