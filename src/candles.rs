// src/candles.rs
// Gap-aware candle container. Owns interpolation and the rolling average volume.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Candle as delivered by the exchange client, before repair.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct RawCandle {
    /// Open time of the interval, epoch milliseconds
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Candle after ingestion into a [`CandleSeries`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Trailing simple moving average of volume over the series window
    pub avg_volume: f64,
    /// True when the candle was synthesized to fill a gap. Volume-based logic
    /// downstream must discount these.
    #[serde(default)]
    pub synthetic: bool,
}

impl Candle {
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Lower edge of the candle body.
    pub fn body_low(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Upper edge of the candle body.
    pub fn body_high(&self) -> f64 {
        self.open.max(self.close)
    }
}

/// Ordered candle sequence with a fixed interval. After every insert the series
/// holds no gaps: missing slots are filled with flagged synthetic candles.
#[derive(Serialize, Debug, Clone)]
pub struct CandleSeries {
    interval_ms: i64,
    volume_window: usize,
    gap_damping: f64,
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(interval_ms: i64, volume_window: usize, gap_damping: f64) -> Self {
        Self {
            interval_ms,
            volume_window: volume_window.max(1),
            gap_damping,
            candles: Vec::new(),
        }
    }

    /// Appends a candle, synthesizing any missing candles between the last
    /// inserted timestamp and this one. Returns how many candles were added
    /// (1 plus the synthetic fills).
    pub fn insert(&mut self, raw: RawCandle) -> Result<usize, EngineError> {
        validate(&raw)?;

        let (prev_time, prev_close, prev_range) = match self.candles.last() {
            Some(last) => (last.time, last.close, last.range()),
            None => {
                self.push(real_candle(&raw));
                return Ok(1);
            }
        };

        if raw.time <= prev_time {
            return Err(EngineError::OutOfOrder {
                last: prev_time,
                got: raw.time,
            });
        }
        let delta = raw.time - prev_time;
        if delta % self.interval_ms != 0 {
            return Err(EngineError::InvalidCandle {
                time: raw.time,
                reason: format!("timestamp off the {} ms interval grid", self.interval_ms),
            });
        }

        let missing = delta / self.interval_ms - 1;
        if missing > 0 {
            debug!(
                "filling gap of {} candles between {} and {}",
                missing, prev_time, raw.time
            );
            self.interpolate(prev_time, prev_close, prev_range, missing, &raw);
        }
        self.push(real_candle(&raw));
        Ok(missing as usize + 1)
    }

    /// Interpolation policy: each synthetic candle opens at the previous close,
    /// closes on a straight line toward the next real close, and pads high/low
    /// with a damped fraction of the real ranges flanking the gap so downstream
    /// ratio math never sees a zero-range candle. Volume stays zero.
    fn interpolate(
        &mut self,
        prev_time: i64,
        prev_close: f64,
        prev_range: f64,
        missing: i64,
        next: &RawCandle,
    ) {
        let pad = self.gap_damping * 0.5 * (prev_range + (next.high - next.low));
        let slots = (missing + 1) as f64;
        let mut open = prev_close;
        for k in 1..=missing {
            let close = prev_close + (next.close - prev_close) * (k as f64 / slots);
            self.push(Candle {
                time: prev_time + k * self.interval_ms,
                open,
                high: open.max(close) + pad,
                low: (open.min(close) - pad).max(0.0),
                close,
                volume: 0.0,
                avg_volume: 0.0,
                synthetic: true,
            });
            open = close;
        }
    }

    fn push(&mut self, mut candle: Candle) {
        // Trailing SMA over the last `volume_window` candles including this
        // one; shrinks to whatever is available early in the series.
        let idx = self.candles.len();
        let start = (idx + 1).saturating_sub(self.volume_window);
        let sum: f64 = self.candles[start..].iter().map(|c| c.volume).sum();
        candle.avg_volume = (sum + candle.volume) / (idx - start + 1) as f64;
        self.candles.push(candle);
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn interval_ms(&self) -> i64 {
        self.interval_ms
    }

    pub fn synthetic_count(&self) -> usize {
        self.candles.iter().filter(|c| c.synthetic).count()
    }

    /// Mean high-to-low range of the real candles. Zero for an empty series.
    pub fn average_range(&self) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for candle in self.candles.iter().filter(|c| !c.synthetic) {
            sum += candle.range();
            count += 1;
        }
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }
}

fn real_candle(raw: &RawCandle) -> Candle {
    Candle {
        time: raw.time,
        open: raw.open,
        high: raw.high,
        low: raw.low,
        close: raw.close,
        volume: raw.volume,
        avg_volume: 0.0,
        synthetic: false,
    }
}

fn validate(raw: &RawCandle) -> Result<(), EngineError> {
    let invalid = |reason: &str| EngineError::InvalidCandle {
        time: raw.time,
        reason: reason.to_string(),
    };
    let prices = [raw.open, raw.high, raw.low, raw.close];
    if prices.iter().any(|p| !p.is_finite()) {
        return Err(invalid("non-finite price"));
    }
    if prices.iter().any(|p| *p <= 0.0) {
        return Err(invalid("non-positive price"));
    }
    if !raw.volume.is_finite() || raw.volume < 0.0 {
        return Err(invalid("negative volume"));
    }
    if raw.high < raw.low {
        return Err(invalid("high below low"));
    }
    if raw.high < raw.open.max(raw.close) {
        return Err(invalid("high below candle body"));
    }
    if raw.low > raw.open.min(raw.close) {
        return Err(invalid("low above candle body"));
    }
    Ok(())
}
