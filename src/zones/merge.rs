// src/zones/merge.rs
use log::debug;

use super::{zone_id, Freshness, Zone, ZoneKind};

/// Consolidates overlapping or near-overlapping zones of the same kind.
///
/// Zones are sorted by low bound before a single sweep, so the final partition
/// does not depend on the order candidates arrived in, and the sweep reaches
/// the transitive fixpoint in one pass per kind. Supply and Demand never merge
/// with each other even when their price bands overlap.
pub struct ZoneMerger {
    /// Absolute price allowance between neighbouring zones
    proximity_gap: f64,
}

impl ZoneMerger {
    pub fn new(proximity_gap: f64) -> Self {
        Self {
            proximity_gap: proximity_gap.max(0.0),
        }
    }

    pub fn merge(&self, symbol: &str, timeframe: &str, zones: Vec<Zone>) -> Vec<Zone> {
        let (supply, demand): (Vec<Zone>, Vec<Zone>) = zones
            .into_iter()
            .partition(|z| z.kind == ZoneKind::Supply);
        let mut merged = self.merge_kind(symbol, timeframe, supply);
        merged.extend(self.merge_kind(symbol, timeframe, demand));
        merged
    }

    fn merge_kind(&self, symbol: &str, timeframe: &str, mut zones: Vec<Zone>) -> Vec<Zone> {
        zones.sort_by(|a, b| {
            a.low
                .total_cmp(&b.low)
                .then(a.high.total_cmp(&b.high))
                .then(a.formation_start.cmp(&b.formation_start))
                .then(a.id.cmp(&b.id))
        });

        let mut out: Vec<Zone> = Vec::with_capacity(zones.len());
        let mut cluster: Vec<Zone> = Vec::new();
        let mut cluster_high = f64::MIN;
        for zone in zones {
            if cluster.is_empty() || zone.low <= cluster_high + self.proximity_gap {
                cluster_high = cluster_high.max(zone.high);
                cluster.push(zone);
            } else {
                out.push(self.consolidate(symbol, timeframe, std::mem::take(&mut cluster)));
                cluster_high = zone.high;
                cluster.push(zone);
            }
        }
        if !cluster.is_empty() {
            out.push(self.consolidate(symbol, timeframe, cluster));
        }
        out
    }

    /// Union of bounds; the oldest formation wins since it marks the first
    /// time price reacted from the area. Freshness keeps the worst wear among
    /// constituents so merging can never resurrect a Tested or Broken zone.
    fn consolidate(&self, symbol: &str, timeframe: &str, cluster: Vec<Zone>) -> Zone {
        if cluster.len() == 1 {
            let mut zones = cluster;
            return zones.remove(0);
        }

        let kind = cluster[0].kind;
        let mut low = f64::MAX;
        let mut high = f64::MIN;
        let mut formation = (i64::MAX, i64::MAX);
        let mut exit_time = i64::MIN;
        let mut touch_count = 0;
        let mut all_fresh = true;
        let mut any_broken = false;
        let mut price_inside = false;
        for zone in &cluster {
            low = low.min(zone.low);
            high = high.max(zone.high);
            formation = formation.min((zone.formation_start, zone.formation_end));
            // Activity only counts once every constituent has fully formed.
            exit_time = exit_time.max(zone.exit_time);
            touch_count += zone.touch_count;
            all_fresh &= zone.freshness == Freshness::Fresh;
            any_broken |= zone.freshness == Freshness::Broken;
            price_inside |= zone.price_inside;
        }
        let freshness = if all_fresh {
            Freshness::Fresh
        } else if any_broken {
            Freshness::Broken
        } else {
            Freshness::Tested
        };

        debug!(
            "consolidated {} {:?} zones into [{:.5}, {:.5}]",
            cluster.len(),
            kind,
            low,
            high
        );

        Zone {
            id: zone_id(symbol, timeframe, kind, formation.0, low, high),
            kind,
            low,
            high,
            formation_start: formation.0,
            formation_end: formation.1,
            exit_time,
            freshness,
            touch_count,
            price_inside,
            merged_from: cluster.into_iter().map(|z| z.id).collect(),
        }
    }
}
