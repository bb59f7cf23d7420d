// tests/merge_tests.rs
//
// Zone consolidation: union bounds, oldest formation, worst freshness,
// and independence from candidate arrival order.

mod common;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use common::HOUR_MS;
use zone_detector::zones::{zone_id, Freshness, Zone, ZoneKind, ZoneMerger};

fn zone(kind: ZoneKind, low: f64, high: f64, start_slot: i64) -> Zone {
    let formation_start = start_slot * HOUR_MS;
    Zone {
        id: zone_id("EURUSD", "1h", kind, formation_start, low, high),
        kind,
        low,
        high,
        formation_start,
        formation_end: formation_start + HOUR_MS,
        exit_time: formation_start + 2 * HOUR_MS,
        freshness: Freshness::Fresh,
        touch_count: 0,
        price_inside: false,
        merged_from: Vec::new(),
    }
}

fn merge(gap: f64, zones: Vec<Zone>) -> Vec<Zone> {
    ZoneMerger::new(gap).merge("EURUSD", "1h", zones)
}

#[test]
fn overlapping_zones_union_and_keep_the_oldest_formation() {
    let older = zone(ZoneKind::Supply, 100.0, 105.0, 2);
    let newer = zone(ZoneKind::Supply, 104.0, 110.0, 7);
    let expected_from = vec![older.id.clone(), newer.id.clone()];

    let merged = merge(0.0, vec![newer, older]);
    assert_eq!(merged.len(), 1);
    let z = &merged[0];
    assert_eq!(z.low, 100.0);
    assert_eq!(z.high, 110.0);
    assert_eq!(z.formation_start, 2 * HOUR_MS);
    assert_eq!(z.formation_end, 3 * HOUR_MS);
    // Activity checks wait for the latest constituent to finish forming.
    assert_eq!(z.exit_time, 9 * HOUR_MS);
    assert_eq!(z.merged_from, expected_from);
}

#[test]
fn disjoint_zones_stay_separate() {
    let merged = merge(
        0.0,
        vec![
            zone(ZoneKind::Supply, 100.0, 105.0, 1),
            zone(ZoneKind::Supply, 106.0, 110.0, 2),
        ],
    );
    assert_eq!(merged.len(), 2);
}

#[test]
fn proximity_gap_pulls_in_near_misses() {
    let candidates = vec![
        zone(ZoneKind::Supply, 100.0, 105.0, 1),
        zone(ZoneKind::Supply, 105.3, 108.0, 2),
    ];
    assert_eq!(merge(0.0, candidates.clone()).len(), 2);
    let merged = merge(0.5, candidates);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].low, 100.0);
    assert_eq!(merged[0].high, 108.0);
}

#[test]
fn different_kinds_never_merge() {
    let merged = merge(
        0.0,
        vec![
            zone(ZoneKind::Supply, 100.0, 105.0, 1),
            zone(ZoneKind::Demand, 102.0, 107.0, 2),
        ],
    );
    assert_eq!(merged.len(), 2);
    assert!(merged.iter().any(|z| z.kind == ZoneKind::Supply));
    assert!(merged.iter().any(|z| z.kind == ZoneKind::Demand));
}

#[test]
fn chains_merge_transitively() {
    // A overlaps B, B overlaps C, A and C are disjoint. All three collapse.
    let merged = merge(
        0.0,
        vec![
            zone(ZoneKind::Demand, 100.0, 103.0, 3),
            zone(ZoneKind::Demand, 102.0, 106.0, 1),
            zone(ZoneKind::Demand, 105.0, 109.0, 2),
        ],
    );
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].low, 100.0);
    assert_eq!(merged[0].high, 109.0);
    assert_eq!(merged[0].formation_start, HOUR_MS);
    assert_eq!(merged[0].merged_from.len(), 3);
}

#[test]
fn merge_result_does_not_depend_on_input_order() {
    let base = vec![
        zone(ZoneKind::Supply, 100.0, 104.0, 1),
        zone(ZoneKind::Supply, 103.0, 107.0, 4),
        zone(ZoneKind::Supply, 110.0, 115.0, 2),
        zone(ZoneKind::Demand, 90.0, 94.0, 3),
        zone(ZoneKind::Demand, 93.5, 96.0, 5),
        zone(ZoneKind::Demand, 80.0, 82.0, 6),
    ];
    let reference = merge(0.25, base.clone());

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let mut shuffled = base.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(merge(0.25, shuffled), reference);
    }
}

#[test]
fn merged_freshness_keeps_the_worst_wear() {
    let mut tested = zone(ZoneKind::Supply, 100.0, 104.0, 1);
    tested.freshness = Freshness::Tested;
    tested.touch_count = 2;
    let mut broken = zone(ZoneKind::Supply, 103.0, 107.0, 2);
    broken.freshness = Freshness::Broken;
    broken.touch_count = 1;
    let fresh = zone(ZoneKind::Supply, 103.0, 110.0, 3);

    // All fresh: still fresh.
    let merged = merge(
        0.0,
        vec![fresh.clone(), zone(ZoneKind::Supply, 103.0, 107.0, 2)],
    );
    assert_eq!(merged[0].freshness, Freshness::Fresh);

    // Fresh + tested: tested, touches carried over.
    let merged = merge(0.0, vec![fresh.clone(), tested.clone()]);
    assert_eq!(merged[0].freshness, Freshness::Tested);
    assert_eq!(merged[0].touch_count, 2);

    // Any broken constituent poisons the whole cluster.
    let merged = merge(0.0, vec![fresh, tested, broken]);
    assert_eq!(merged[0].freshness, Freshness::Broken);
    assert_eq!(merged[0].touch_count, 3);
}

#[test]
fn singleton_clusters_pass_through_untouched() {
    let original = zone(ZoneKind::Demand, 50.0, 55.0, 1);
    let merged = merge(1.0, vec![original.clone()]);
    assert_eq!(merged, vec![original]);
}

#[test]
fn merged_zone_gets_a_fresh_deterministic_id() {
    let a = zone(ZoneKind::Supply, 100.0, 105.0, 1);
    let b = zone(ZoneKind::Supply, 104.0, 110.0, 2);
    let first = merge(0.0, vec![a.clone(), b.clone()]);
    let second = merge(0.0, vec![b, a.clone()]);
    assert_eq!(first[0].id, second[0].id);
    assert_ne!(first[0].id, a.id);
    assert_eq!(first[0].id.len(), 16);
}
