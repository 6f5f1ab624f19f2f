//! Matching and scoring of one document pair

use super::events::{MatchEvent, MatchSink, TextPair};
use super::transform::prepare;
use super::type_policy::types_match;
use crate::models::stats::{
    metrics_bucket, BY_TYPE, DOC_LEVEL, DOC_MATCH, DOC_MATCH_EMPTY, DOC_MATCH_NONEMPTY,
    DOC_MISMATCH, DOC_TOTAL, FN, FP, TOTAL_METRICS, TP,
};
use crate::models::{spans_overlap, CompareOptions, Stats, Textbound};
use serde::Serialize;
use std::collections::BTreeSet;

/// Document-level agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    /// Every record on both sides found a partner
    #[serde(rename = "match-nonempty")]
    MatchNonEmpty,
    /// Both sides empty
    MatchEmpty,
    /// At least one record on either side is unmatched
    Mismatch,
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        !matches!(self, Verdict::Mismatch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::MatchNonEmpty => DOC_MATCH_NONEMPTY,
            Verdict::MatchEmpty => DOC_MATCH_EMPTY,
            Verdict::Mismatch => DOC_MISMATCH,
        }
    }
}

/// Result of comparing one document pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentOutcome {
    pub label: String,
    pub verdict: Verdict,
    /// `-max(unmatched)` on mismatch, `max(matched)` otherwise; for sorting only
    pub score: i64,
    pub true_positives: usize,
    pub false_negatives: usize,
    pub false_positives: usize,
}

/// Whether `second` is a candidate partner for `first` under `options`
///
/// Span compatibility is decided first; types are only compared, and the
/// comparison only reported, for span-compatible pairs.
fn is_candidate(
    first: &Textbound,
    second: &Textbound,
    options: &CompareOptions,
    sink: &mut dyn MatchSink,
) -> bool {
    let spans_compatible = if options.overlap {
        spans_overlap((first.start, first.end), (second.start, second.end))
    } else {
        first.start == second.start && first.end == second.end
    };
    spans_compatible
        && types_match(
            &first.entity_type,
            &second.entity_type,
            TextPair {
                first: &first.text,
                second: &second.text,
            },
            options.map_types,
            sink,
        )
}

/// Match already-prepared record lists and fold the result into `stats`
///
/// Matching is not one-to-one. Each record of `first` with at least one
/// candidate counts as a single true positive however many candidates it
/// has, and a record of `second` claimed by several records counts once.
/// Unclaimed records of `second` are false positives.
pub fn match_annotations(
    first: &[Textbound],
    second: &[Textbound],
    options: &CompareOptions,
    stats: &mut Stats,
    label: &str,
    sink: &mut dyn MatchSink,
) -> DocumentOutcome {
    // records are identified by their index, never by value
    let mut matched_first: BTreeSet<usize> = BTreeSet::new();
    let mut matched_second: BTreeSet<usize> = BTreeSet::new();
    let mut only_first: BTreeSet<usize> = BTreeSet::new();
    let mut only_second: BTreeSet<usize> = BTreeSet::new();

    for (i, a) in first.iter().enumerate() {
        let candidates: Vec<usize> = second
            .iter()
            .enumerate()
            .filter(|(_, b)| is_candidate(a, b, options, sink))
            .map(|(j, _)| j)
            .collect();

        if let Some(&partner) = candidates.first() {
            sink.event(MatchEvent::Matched {
                text: &a.text,
                first_type: &a.entity_type,
                second_type: &second[partner].entity_type,
            });
            matched_first.insert(i);
            matched_second.extend(candidates.iter().copied());
            stats.increment(TOTAL_METRICS, TP);
            stats.increment(&metrics_bucket(&a.entity_type), TP);
            for tb in std::iter::once(a).chain(candidates.iter().map(|&j| &second[j])) {
                stats.increment(BY_TYPE, &format!("matched {}", tb.entity_type));
            }
        } else {
            sink.event(MatchEvent::OnlyFirst { textbound: a });
            only_first.insert(i);
            stats.increment(TOTAL_METRICS, FN);
            stats.increment(&metrics_bucket(&a.entity_type), FN);
            stats.increment(BY_TYPE, &format!("missed {}", a.entity_type));
        }
    }

    for (j, b) in second.iter().enumerate() {
        if matched_second.contains(&j) {
            continue;
        }
        sink.event(MatchEvent::OnlySecond { textbound: b });
        only_second.insert(j);
        stats.increment(TOTAL_METRICS, FP);
        stats.increment(&metrics_bucket(&b.entity_type), FP);
        stats.increment(BY_TYPE, &format!("missed {}", b.entity_type));
    }

    let verdict = if !only_first.is_empty() || !only_second.is_empty() {
        Verdict::Mismatch
    } else if !matched_first.is_empty() && !matched_second.is_empty() {
        Verdict::MatchNonEmpty
    } else {
        Verdict::MatchEmpty
    };
    if verdict.is_match() {
        stats.increment(DOC_LEVEL, DOC_MATCH);
    }
    stats.increment(DOC_LEVEL, verdict.as_str());
    stats.increment(DOC_LEVEL, DOC_TOTAL);

    let score = if verdict.is_match() {
        matched_first.len().max(matched_second.len()) as i64
    } else {
        -(only_first.len().max(only_second.len()) as i64)
    };
    sink.event(MatchEvent::Score { score, label });

    DocumentOutcome {
        label: label.to_string(),
        verdict,
        score,
        true_positives: matched_first.len(),
        false_negatives: only_first.len(),
        false_positives: only_second.len(),
    }
}

/// Transform both sides per `options`, then match them
pub fn compare_annotations(
    mut first: Vec<Textbound>,
    mut second: Vec<Textbound>,
    options: &CompareOptions,
    stats: &mut Stats,
    label: &str,
    sink: &mut dyn MatchSink,
) -> DocumentOutcome {
    prepare(&mut first, options, sink);
    prepare(&mut second, options, sink);
    match_annotations(&first, &second, options, stats, label, sink)
}
