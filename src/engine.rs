// src/engine.rs
// Pipeline driver: series repair -> labels -> patterns -> zones -> merge ->
// freshness. Works candle by candle, so batch detection and live ingestion
// share one code path.

use log::{debug, info, warn};
use serde::Serialize;

use crate::candles::{Candle, CandleSeries, RawCandle};
use crate::classify::{BaseClassifier, CandleLabel, PatternScan};
use crate::config::DetectorConfig;
use crate::errors::EngineError;
use crate::timeframe::timeframe_to_ms;
use crate::zones::{FreshnessTracker, FreshnessTransition, Zone, ZoneBuilder, ZoneKind, ZoneMerger};

/// Minimum history before any pattern can close: entry + base + exit.
pub const MIN_PATTERN_CANDLES: usize = 3;

/// Batch detection input for one symbol/timeframe.
#[derive(Debug, Clone)]
pub struct ZoneDetectionRequest {
    pub symbol: String,
    pub timeframe: String,
    pub candles: Vec<RawCandle>,
}

/// Final output consumed by charting/scoring collaborators: the repaired
/// series (synthetic flags included) and the consolidated zone set.
#[derive(Serialize, Debug, Clone)]
pub struct ZoneDetectionResult {
    pub symbol: String,
    pub timeframe: String,
    pub supply_zones: Vec<Zone>,
    pub demand_zones: Vec<Zone>,
    pub candles: Vec<Candle>,
    pub total_zones_detected: usize,
    pub candles_analyzed: usize,
    pub synthetic_candles: usize,
}

/// What a single serialized ingestion step did.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    /// Candles appended, including synthetic gap fills
    pub candles_added: usize,
    /// Zones whose closing boundary candle was this one
    pub zones_opened: usize,
    pub transitions: Vec<FreshnessTransition>,
}

/// Non-fatal guard for callers that want to know up front. Detection over
/// fewer than three candles simply yields an empty zone set.
pub fn ensure_history(have: usize) -> Result<(), EngineError> {
    if have < MIN_PATTERN_CANDLES {
        return Err(EngineError::InsufficientHistory {
            have,
            need: MIN_PATTERN_CANDLES,
        });
    }
    Ok(())
}

/// Detection state for one trading pair. Pairs are fully independent: run one
/// engine per pair, nothing is shared.
pub struct ZoneEngine {
    symbol: String,
    timeframe: String,
    config: DetectorConfig,
    series: CandleSeries,
    classifier: BaseClassifier,
    builder: ZoneBuilder,
    tracker: FreshnessTracker,
    labels: Vec<CandleLabel>,
    scan: PatternScan,
    zones: Vec<Zone>,
}

impl ZoneEngine {
    pub fn new(symbol: &str, timeframe: &str, config: DetectorConfig) -> Result<Self, EngineError> {
        let interval_ms = timeframe_to_ms(timeframe)?;
        Ok(Self {
            series: CandleSeries::new(interval_ms, config.volume_window, config.gap_damping),
            classifier: BaseClassifier::new(config.base_body_threshold),
            builder: ZoneBuilder::new(config.invert_zone_mapping),
            tracker: FreshnessTracker::new(),
            labels: Vec::new(),
            scan: PatternScan::default(),
            zones: Vec::new(),
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            config,
        })
    }

    /// Ingests one candle to completion before the next is accepted: insertion
    /// (with gap fill), labelling, pattern-closure check, merging and the
    /// freshness update all happen here, in that order.
    pub fn ingest(&mut self, raw: RawCandle) -> Result<IngestOutcome, EngineError> {
        let first_new = self.series.len();
        let added = self.series.insert(raw)?;
        let mut outcome = IngestOutcome {
            candles_added: added,
            ..Default::default()
        };

        for idx in first_new..self.series.len() {
            let label = self.classifier.classify(&self.series.candles()[idx]);
            self.labels.push(label);
            if let Some(pattern) = self.scan.step(idx, label) {
                let zone =
                    self.builder
                        .build(&self.symbol, &self.timeframe, self.series.candles(), &pattern);
                self.zones.push(zone);
                outcome.zones_opened += 1;
            }
        }

        if outcome.zones_opened > 0 {
            let gap = self.config.merge_gap_pct * self.series.average_range();
            let merger = ZoneMerger::new(gap);
            self.zones = merger.merge(
                &self.symbol,
                &self.timeframe,
                std::mem::take(&mut self.zones),
            );
        }

        for idx in first_new..self.series.len() {
            let candle = self.series.candles()[idx].clone();
            for zone in &mut self.zones {
                if let Some(t) = self.tracker.apply(zone, &candle) {
                    outcome.transitions.push(t);
                }
            }
        }

        Ok(outcome)
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Label per candle in the repaired series, parallel to `series()`.
    pub fn labels(&self) -> &[CandleLabel] {
        &self.labels
    }

    pub fn series(&self) -> &CandleSeries {
        &self.series
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    /// Batch entry point: processes a complete candle history oldest to
    /// newest and assembles the output zone set.
    pub fn detect_zones(
        request: ZoneDetectionRequest,
        config: DetectorConfig,
    ) -> Result<ZoneDetectionResult, EngineError> {
        let mut engine = ZoneEngine::new(&request.symbol, &request.timeframe, config)?;
        if let Err(err) = ensure_history(request.candles.len()) {
            warn!("{}/{}: {}", request.symbol, request.timeframe, err);
        }
        for raw in request.candles {
            engine.ingest(raw)?;
        }
        Ok(engine.into_result())
    }

    pub fn into_result(self) -> ZoneDetectionResult {
        let ZoneEngine {
            symbol,
            timeframe,
            config,
            series,
            mut zones,
            ..
        } = self;

        if let Some(max_touches) = config.max_touch_count {
            let before = zones.len();
            zones.retain(|z| z.touch_count <= max_touches);
            debug!(
                "touch count filter (max {}): {} -> {} zones",
                max_touches,
                before,
                zones.len()
            );
        }

        let (mut supply_zones, mut demand_zones): (Vec<Zone>, Vec<Zone>) =
            zones.into_iter().partition(|z| z.kind == ZoneKind::Supply);
        supply_zones.sort_by(|a, b| a.low.total_cmp(&b.low));
        demand_zones.sort_by(|a, b| a.low.total_cmp(&b.low));

        let total_zones_detected = supply_zones.len() + demand_zones.len();
        let candles_analyzed = series.len();
        let synthetic_candles = series.synthetic_count();
        info!(
            "{}/{}: {} supply, {} demand zones from {} candles ({} synthetic)",
            symbol,
            timeframe,
            supply_zones.len(),
            demand_zones.len(),
            candles_analyzed,
            synthetic_candles
        );

        ZoneDetectionResult {
            symbol,
            timeframe,
            supply_zones,
            demand_zones,
            candles: series.into_candles(),
            total_zones_detected,
            candles_analyzed,
            synthetic_candles,
        }
    }
}
