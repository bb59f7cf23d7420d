// Shared candle builders for the integration tests.
#![allow(dead_code)]

use zone_detector::candles::RawCandle;
use zone_detector::config::DetectorConfig;
use zone_detector::engine::{ZoneDetectionRequest, ZoneDetectionResult, ZoneEngine};

pub const HOUR_MS: i64 = 3_600_000;

/// Candle at hour `slot` with explicit OHLC and volume.
pub fn candle(slot: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> RawCandle {
    RawCandle {
        time: slot * HOUR_MS,
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Full-body bullish candle from `from` up to `to`.
pub fn rally_candle(slot: i64, from: f64, to: f64) -> RawCandle {
    candle(slot, from, to, from, to, 100.0)
}

/// Full-body bearish candle from `from` down to `to`.
pub fn drop_candle(slot: i64, from: f64, to: f64) -> RawCandle {
    candle(slot, from, from, to, to, 100.0)
}

/// Consolidation candle around `mid`: body is a tenth of `range`.
pub fn base_candle(slot: i64, mid: f64, range: f64) -> RawCandle {
    let half_body = range * 0.05;
    candle(
        slot,
        mid - half_body,
        mid + range / 2.0,
        mid - range / 2.0,
        mid + half_body,
        50.0,
    )
}

pub fn detect(candles: Vec<RawCandle>) -> ZoneDetectionResult {
    detect_with(candles, DetectorConfig::default())
}

pub fn detect_with(candles: Vec<RawCandle>, config: DetectorConfig) -> ZoneDetectionResult {
    let request = ZoneDetectionRequest {
        symbol: "EURUSD".to_string(),
        timeframe: "1h".to_string(),
        candles,
    };
    ZoneEngine::detect_zones(request, config).expect("detection failed")
}
