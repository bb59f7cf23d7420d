// src/config.rs
use serde::{Deserialize, Serialize};

/// Policy knobs for the detection pipeline.
///
/// The mapping from pattern to zone kind and the interpolation damping are
/// conventions, not law, so they live here rather than being hardcoded.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DetectorConfig {
    /// Body-to-range ratio below which a candle is labelled Base
    pub base_body_threshold: f64,
    /// Trailing window for the rolling average volume
    pub volume_window: usize,
    /// Fraction of the real ranges flanking a gap used to pad synthetic high/low
    pub gap_damping: f64,
    /// Merge proximity as a fraction of the average candle range
    pub merge_gap_pct: f64,
    /// Drop zones touched more than this many times from the final result
    pub max_touch_count: Option<i64>,
    /// Swap the pattern-to-zone mapping (patterns ending in a Drop become
    /// Demand instead of Supply)
    pub invert_zone_mapping: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            base_body_threshold: 0.5, // body under half the range = consolidation
            volume_window: 20,
            gap_damping: 0.25,
            merge_gap_pct: 0.1, // 10% of the average candle range
            max_touch_count: None,
            invert_zone_mapping: false,
        }
    }
}
