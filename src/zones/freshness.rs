// src/zones/freshness.rs
use log::debug;
use serde::Serialize;

use crate::candles::Candle;

use super::{Freshness, Zone, ZoneKind};

/// A single freshness state change, reported to callers for observability.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FreshnessTransition {
    pub zone_id: String,
    pub from: Freshness,
    pub to: Freshness,
    pub time: i64,
}

/// Drives the one-way Fresh -> Tested -> Broken state machine from price
/// action. Every transition is triggered by a candle; none is reversible.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreshnessTracker;

impl FreshnessTracker {
    pub fn new() -> Self {
        Self
    }

    /// Applies one candle to one zone; returns the transition if the state
    /// moved. Candles at or before the zone's exit boundary are part of the
    /// formation and never count, and synthetic candles carry fabricated
    /// prices so they never touch anything.
    pub fn apply(&self, zone: &mut Zone, candle: &Candle) -> Option<FreshnessTransition> {
        if candle.synthetic || candle.time <= zone.exit_time {
            return None;
        }
        if zone.freshness == Freshness::Broken {
            return None;
        }

        if !zone.overlaps_price(candle.low, candle.high) {
            zone.price_inside = false;
            return None;
        }
        if !zone.price_inside {
            zone.touch_count += 1;
        }
        zone.price_inside = true;

        // A close beyond the distal line is a full breach, not a touch.
        let breached = match zone.kind {
            ZoneKind::Supply => candle.close > zone.high,
            ZoneKind::Demand => candle.close < zone.low,
        };
        let next = if breached {
            Freshness::Broken
        } else {
            Freshness::Tested
        };

        if next > zone.freshness {
            let from = zone.freshness;
            zone.freshness = next;
            debug!(
                "zone {} {:?} -> {:?} at {}",
                zone.id, from, next, candle.time
            );
            return Some(FreshnessTransition {
                zone_id: zone.id.clone(),
                from,
                to: next,
                time: candle.time,
            });
        }
        None
    }

    /// Batch replay, oldest candle to newest across the whole zone set.
    pub fn replay(&self, zones: &mut [Zone], candles: &[Candle]) -> Vec<FreshnessTransition> {
        let mut transitions = Vec::new();
        for candle in candles {
            for zone in zones.iter_mut() {
                if let Some(t) = self.apply(zone, candle) {
                    transitions.push(t);
                }
            }
        }
        transitions
    }
}
