// src/zones/builder.rs
use log::debug;

use crate::candles::Candle;
use crate::classify::{BasePattern, PatternKind};

use super::{zone_id, Freshness, Zone, ZoneKind};

/// Turns closed base patterns into candidate zones, one per pattern.
/// Deduplication is the merger's job, not ours.
pub struct ZoneBuilder {
    invert_mapping: bool,
}

impl ZoneBuilder {
    pub fn new(invert_mapping: bool) -> Self {
        Self { invert_mapping }
    }

    /// Default mapping: patterns ending in a Drop (Rbd, Dbd) mark Supply,
    /// patterns ending in a Rally (Rbr, Dbr) mark Demand.
    pub fn zone_kind(&self, kind: PatternKind) -> ZoneKind {
        match kind.exits_down() != self.invert_mapping {
            true => ZoneKind::Supply,
            false => ZoneKind::Demand,
        }
    }

    /// Price bounds come from the Base-run candle bodies only; the boundary
    /// momentum candles stay outside the zone.
    pub fn build(
        &self,
        symbol: &str,
        timeframe: &str,
        candles: &[Candle],
        pattern: &BasePattern,
    ) -> Zone {
        let mut low = f64::MAX;
        let mut high = f64::MIN;
        for candle in &candles[pattern.base_start..=pattern.base_end] {
            low = low.min(candle.body_low());
            high = high.max(candle.body_high());
        }

        let kind = self.zone_kind(pattern.kind);
        let formation_start = candles[pattern.base_start].time;
        let formation_end = candles[pattern.base_end].time;
        let exit_time = candles[pattern.exit_idx].time;

        debug!(
            "{:?} pattern closed at {}: {:?} zone [{:.5}, {:.5}]",
            pattern.kind, exit_time, kind, low, high
        );

        Zone {
            id: zone_id(symbol, timeframe, kind, formation_start, low, high),
            kind,
            low,
            high,
            formation_start,
            formation_end,
            exit_time,
            freshness: Freshness::Fresh,
            touch_count: 0,
            price_inside: false,
            merged_from: Vec::new(),
        }
    }

    pub fn build_all(
        &self,
        symbol: &str,
        timeframe: &str,
        candles: &[Candle],
        patterns: &[BasePattern],
    ) -> Vec<Zone> {
        patterns
            .iter()
            .map(|p| self.build(symbol, timeframe, candles, p))
            .collect()
    }
}
