//! Running statistics for one comparison run

use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate metrics bucket, counted for every record regardless of type
pub const TOTAL_METRICS: &str = "metrics total";

/// Descriptive bucket with `matched <type>` and `missed <type>` tallies
pub const BY_TYPE: &str = "by type";

/// Descriptive bucket with per-document verdict tallies
pub const DOC_LEVEL: &str = "doc-level";

pub const TP: &str = "TP";
pub const FP: &str = "FP";
pub const FN: &str = "FN";

pub const DOC_MATCH: &str = "match";
pub const DOC_MISMATCH: &str = "mismatch";
pub const DOC_MATCH_EMPTY: &str = "match-empty";
pub const DOC_MATCH_NONEMPTY: &str = "match-nonempty";
pub const DOC_TOTAL: &str = "TOTAL";

const METRICS_PREFIX: &str = "metrics";

/// Name of the per-type metrics bucket
pub fn metrics_bucket(entity_type: &str) -> String {
    format!("{} {}", METRICS_PREFIX, entity_type)
}

/// Corpus-wide counters: bucket name -> counter name -> count
///
/// Counters only ever grow during a run. Both levels are ordered so the
/// report comes out the same on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stats {
    buckets: BTreeMap<String, BTreeMap<String, u64>>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, bucket: &str, counter: &str) {
        *self
            .buckets
            .entry(bucket.to_string())
            .or_default()
            .entry(counter.to_string())
            .or_insert(0) += 1;
    }

    /// Current value of a counter, 0 if it was never incremented
    pub fn get(&self, bucket: &str, counter: &str) -> u64 {
        self.buckets
            .get(bucket)
            .and_then(|counters| counters.get(counter))
            .copied()
            .unwrap_or(0)
    }

    /// Number of documents compared so far
    pub fn documents(&self) -> u64 {
        self.get(DOC_LEVEL, DOC_TOTAL)
    }

    /// Metrics for every `metrics *` bucket, sorted by bucket name
    pub fn metrics(&self) -> Vec<(&str, Metrics)> {
        self.buckets
            .iter()
            .filter(|(name, _)| name.starts_with(METRICS_PREFIX))
            .map(|(name, counters)| {
                let count = |key: &str| counters.get(key).copied().unwrap_or(0);
                (
                    name.as_str(),
                    Metrics::new(count(TP), count(FP), count(FN)),
                )
            })
            .collect()
    }

    /// Every bucket that is not a metrics bucket, sorted by name
    pub fn descriptive(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, u64>)> {
        self.buckets
            .iter()
            .filter(|(name, _)| !name.starts_with(METRICS_PREFIX))
            .map(|(name, counters)| (name.as_str(), counters))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// True/false positive and false negative counts for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub true_positives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl Metrics {
    pub fn new(true_positives: u64, false_positives: u64, false_negatives: u64) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    #[must_use]
    pub fn precision(&self) -> f64 {
        prec_rec_f(self.true_positives, self.false_positives, self.false_negatives).0
    }

    #[must_use]
    pub fn recall(&self) -> f64 {
        prec_rec_f(self.true_positives, self.false_positives, self.false_negatives).1
    }

    #[must_use]
    pub fn f1(&self) -> f64 {
        prec_rec_f(self.true_positives, self.false_positives, self.false_negatives).2
    }
}

/// Precision, recall and F1; any ratio with a zero denominator is 0
pub fn prec_rec_f(tp: u64, fp: u64, fn_: u64) -> (f64, f64, f64) {
    let ratio = |num: f64, den: f64| if den == 0.0 { 0.0 } else { num / den };
    let p = ratio(tp as f64, (tp + fp) as f64);
    let r = ratio(tp as f64, (tp + fn_) as f64);
    let f = ratio(2.0 * p * r, p + r);
    (p, r, f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_and_get() {
        let mut stats = Stats::new();
        stats.increment(TOTAL_METRICS, TP);
        stats.increment(TOTAL_METRICS, TP);
        stats.increment(&metrics_bucket("Gene"), FN);

        assert_eq!(stats.get(TOTAL_METRICS, TP), 2);
        assert_eq!(stats.get("metrics Gene", FN), 1);
        assert_eq!(stats.get("metrics Gene", TP), 0);
        assert_eq!(stats.get("nonexistent", TP), 0);
    }

    #[test]
    fn test_metrics_and_descriptive_are_sorted_and_disjoint() {
        let mut stats = Stats::new();
        stats.increment("metrics total", TP);
        stats.increment("metrics Disease", FP);
        stats.increment(DOC_LEVEL, DOC_TOTAL);
        stats.increment(BY_TYPE, "missed Disease");

        let names: Vec<&str> = stats.metrics().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["metrics Disease", "metrics total"]);

        let descriptive: Vec<&str> = stats.descriptive().map(|(name, _)| name).collect();
        assert_eq!(descriptive, vec!["by type", "doc-level"]);
        assert_eq!(stats.documents(), 1);
    }

    #[test]
    fn test_prec_rec_f_degenerate() {
        assert_eq!(prec_rec_f(0, 0, 0), (0.0, 0.0, 0.0));
        assert_eq!(prec_rec_f(0, 3, 0), (0.0, 0.0, 0.0));
        assert_eq!(prec_rec_f(0, 0, 2), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_prec_rec_f_values() {
        let (p, r, f) = prec_rec_f(3, 1, 2);
        assert!((p - 0.75).abs() < 1e-9);
        assert!((r - 0.6).abs() < 1e-9);
        assert!((f - 2.0 * 0.75 * 0.6 / 1.35).abs() < 1e-9);

        let metrics = Metrics::new(1, 0, 0);
        assert_eq!(metrics.precision(), 1.0);
        assert_eq!(metrics.recall(), 1.0);
        assert_eq!(metrics.f1(), 1.0);
    }
}
