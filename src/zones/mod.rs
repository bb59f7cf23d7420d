// src/zones/mod.rs
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod builder;
pub mod freshness;
pub mod merge;

pub use builder::ZoneBuilder;
pub use freshness::{FreshnessTracker, FreshnessTransition};
pub use merge::ZoneMerger;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Price is expected to fall away from the zone
    Supply,
    /// Price is expected to rise away from the zone
    Demand,
}

/// One-way zone state: Fresh until price revisits, Tested after a touch,
/// Broken once price closes through the far side. Ordered by wear.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Tested,
    Broken,
}

/// A contiguous price band where a sharp reversal originated. Immutable once
/// formed except for the freshness/touch bookkeeping maintained by the
/// [`FreshnessTracker`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: String,
    pub kind: ZoneKind,
    pub low: f64,
    pub high: f64,
    /// Open time of the first Base-run candle of the originating pattern
    pub formation_start: i64,
    /// Open time of the last Base-run candle
    pub formation_end: i64,
    /// Open time of the exit boundary candle; freshness checks begin after it
    pub exit_time: i64,
    pub freshness: Freshness,
    /// Distinct re-entries into the zone since formation
    pub touch_count: i64,
    /// Whether the last processed candle overlapped the zone
    #[serde(default)]
    pub price_inside: bool,
    /// Ids of the zones this one consolidated, kept as provenance only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_from: Vec<String>,
}

impl Zone {
    /// Entry side of the zone: the boundary price approaches first.
    pub fn proximal_line(&self) -> f64 {
        match self.kind {
            ZoneKind::Supply => self.low,
            ZoneKind::Demand => self.high,
        }
    }

    /// Far side of the zone: a close beyond it breaks the zone.
    pub fn distal_line(&self) -> f64 {
        match self.kind {
            ZoneKind::Supply => self.high,
            ZoneKind::Demand => self.low,
        }
    }

    pub fn overlaps_price(&self, low: f64, high: f64) -> bool {
        low <= self.high && high >= self.low
    }
}

/// Deterministic zone id so repeated runs over the same data name zones
/// identically. Hash of the identifying fields, truncated to 16 hex chars.
pub fn zone_id(
    symbol: &str,
    timeframe: &str,
    kind: ZoneKind,
    formation_start: i64,
    low: f64,
    high: f64,
) -> String {
    let tag = match kind {
        ZoneKind::Supply => "supply",
        ZoneKind::Demand => "demand",
    };
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}/{}/{}/{}/{:.8}/{:.8}",
        symbol, timeframe, tag, formation_start, low, high
    ));
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
