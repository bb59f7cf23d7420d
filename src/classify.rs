// src/classify.rs
// Per-candle directional labels and base-run pattern scanning.

use serde::{Deserialize, Serialize};

use crate::candles::Candle;

/// Directional label for a single candle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandleLabel {
    Rally,
    Base,
    Drop,
}

/// Compound type of a base pattern, named by its boundary candles:
/// Rally-Base-Rally, Rally-Base-Drop, Drop-Base-Rally, Drop-Base-Drop.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Rbr,
    Rbd,
    Dbr,
    Dbd,
}

impl PatternKind {
    fn from_boundaries(entry: CandleLabel, exit: CandleLabel) -> Option<Self> {
        use CandleLabel::*;
        match (entry, exit) {
            (Rally, Rally) => Some(PatternKind::Rbr),
            (Rally, Drop) => Some(PatternKind::Rbd),
            (Drop, Rally) => Some(PatternKind::Dbr),
            (Drop, Drop) => Some(PatternKind::Dbd),
            _ => None,
        }
    }

    /// True for patterns whose exit leg points down (Rbd, Dbd).
    pub fn exits_down(&self) -> bool {
        matches!(self, PatternKind::Rbd | PatternKind::Dbd)
    }
}

/// A maximal run of consecutive Base candles bounded on each side by a
/// momentum (Rally or Drop) candle. Indices refer to the labelled series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePattern {
    pub kind: PatternKind,
    pub entry_idx: usize,
    pub base_start: usize,
    pub base_end: usize,
    pub exit_idx: usize,
}

/// Labels candles by body-to-range ratio against a configurable threshold.
pub struct BaseClassifier {
    body_threshold: f64,
}

impl BaseClassifier {
    pub fn new(body_threshold: f64) -> Self {
        Self { body_threshold }
    }

    /// Total and deterministic: every candle gets exactly one label. A candle
    /// with zero range counts as Base.
    pub fn classify(&self, candle: &Candle) -> CandleLabel {
        let range = candle.range();
        if range <= 0.0 {
            return CandleLabel::Base;
        }
        if candle.body() / range < self.body_threshold {
            return CandleLabel::Base;
        }
        if candle.close > candle.open {
            CandleLabel::Rally
        } else if candle.close < candle.open {
            CandleLabel::Drop
        } else {
            CandleLabel::Base
        }
    }

    pub fn label_all(&self, candles: &[Candle]) -> Vec<CandleLabel> {
        candles.iter().map(|c| self.classify(c)).collect()
    }

    /// Scans labels left to right and emits every closed base pattern.
    /// Pure fold over [`PatternScan`]: restartable, no state leaks across calls.
    pub fn find_patterns(&self, labels: &[CandleLabel]) -> Vec<BasePattern> {
        let mut scan = PatternScan::default();
        labels
            .iter()
            .enumerate()
            .filter_map(|(idx, &label)| scan.step(idx, label))
            .collect()
    }
}

/// Incremental pattern scanner. Feed it one label at a time; a pattern is
/// emitted the moment its closing boundary candle is observed.
#[derive(Debug, Clone, Default)]
pub struct PatternScan {
    /// Most recent momentum candle, the candidate entry boundary
    entry: Option<(usize, CandleLabel)>,
    /// Current run of Base candles following the entry, as (start, end)
    run: Option<(usize, usize)>,
}

impl PatternScan {
    pub fn step(&mut self, idx: usize, label: CandleLabel) -> Option<BasePattern> {
        if label == CandleLabel::Base {
            // Base candles before the first momentum candle cannot anchor a
            // pattern; they are skipped until an entry boundary exists.
            if self.entry.is_some() {
                self.run = Some(match self.run {
                    Some((start, _)) => (start, idx),
                    None => (idx, idx),
                });
            }
            return None;
        }

        let closed = match (self.entry, self.run) {
            (Some((entry_idx, entry_label)), Some((base_start, base_end))) => {
                PatternKind::from_boundaries(entry_label, label).map(|kind| BasePattern {
                    kind,
                    entry_idx,
                    base_start,
                    base_end,
                    exit_idx: idx,
                })
            }
            // Two adjacent momentum candles with no Base run between them do
            // not form a pattern: zones require at least one consolidation
            // candle.
            _ => None,
        };

        self.entry = Some((idx, label));
        self.run = None;
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candles::Candle;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: 0,
            open,
            high,
            low,
            close,
            volume: 1.0,
            avg_volume: 1.0,
            synthetic: false,
        }
    }

    fn classifier() -> BaseClassifier {
        BaseClassifier::new(0.5)
    }

    #[test]
    fn labels_by_body_to_range_ratio() {
        let c = classifier();
        // Full-body moves
        assert_eq!(c.classify(&candle(10.0, 12.0, 10.0, 12.0)), CandleLabel::Rally);
        assert_eq!(c.classify(&candle(12.0, 12.0, 10.0, 10.0)), CandleLabel::Drop);
        // Small body relative to range
        assert_eq!(c.classify(&candle(11.0, 12.0, 10.0, 11.1)), CandleLabel::Base);
        // Zero-range guard
        assert_eq!(c.classify(&candle(10.0, 10.0, 10.0, 10.0)), CandleLabel::Base);
        // Flat close with a wick
        assert_eq!(c.classify(&candle(10.0, 11.0, 9.0, 10.0)), CandleLabel::Base);
    }

    #[test]
    fn rally_base_base_drop_is_one_rbd() {
        use CandleLabel::*;
        let patterns = classifier().find_patterns(&[Rally, Base, Base, Drop]);
        assert_eq!(
            patterns,
            vec![BasePattern {
                kind: PatternKind::Rbd,
                entry_idx: 0,
                base_start: 1,
                base_end: 2,
                exit_idx: 3,
            }]
        );
    }

    #[test]
    fn adjacent_momentum_candles_form_nothing() {
        use CandleLabel::*;
        assert!(classifier().find_patterns(&[Rally, Drop, Rally, Drop]).is_empty());
    }

    #[test]
    fn single_base_candle_counts_as_a_run() {
        use CandleLabel::*;
        let patterns = classifier().find_patterns(&[Drop, Base, Rally]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::Dbr);
        assert_eq!((patterns[0].base_start, patterns[0].base_end), (1, 1));
    }

    #[test]
    fn leading_bases_do_not_anchor_patterns() {
        use CandleLabel::*;
        let patterns = classifier().find_patterns(&[Base, Base, Rally, Base, Drop]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].entry_idx, 2);
    }

    #[test]
    fn shared_boundary_chains_patterns() {
        use CandleLabel::*;
        // The Drop at index 3 closes the first pattern and enters the second.
        let patterns = classifier().find_patterns(&[Rally, Base, Base, Drop, Base, Rally]);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].kind, PatternKind::Rbd);
        assert_eq!(patterns[1].kind, PatternKind::Dbr);
        assert_eq!(patterns[0].exit_idx, patterns[1].entry_idx);
    }

    #[test]
    fn scanning_is_restartable() {
        use CandleLabel::*;
        let labels = [Rally, Base, Drop, Base, Base, Drop];
        let c = classifier();
        assert_eq!(c.find_patterns(&labels), c.find_patterns(&labels));
    }
}
