// src/errors.rs
use thiserror::Error;

/// Errors surfaced by the candle-repair and zone-detection engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Non-monotonic or duplicate timestamp on insert. Fatal for the series;
    /// the caller must discard it or restart ingestion from a checkpoint.
    #[error("out-of-order candle: last timestamp {last} ms, got {got} ms")]
    OutOfOrder { last: i64, got: i64 },

    /// Malformed candle rejected at ingestion. The series is left untouched;
    /// the bad candle is never interpolated over silently.
    #[error("invalid candle at {time} ms: {reason}")]
    InvalidCandle { time: i64, reason: String },

    /// Zone detection requested on a series too short to close any pattern.
    /// Non-fatal: callers log it and carry on with an empty zone set.
    #[error("insufficient history: have {have} candles, need at least {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
