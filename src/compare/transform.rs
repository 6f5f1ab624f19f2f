//! Rewrites applied to both record lists before matching

use super::events::{MatchEvent, MatchSink};
use super::type_policy::canonicalize;
use crate::models::{CompareOptions, RetypeRule, Textbound};
use std::collections::BTreeSet;

/// Reassign types of records carrying listed normalization IDs
///
/// Rules are tried in order against each record's current type, so an
/// earlier rule's output can feed a later rule within the same pass.
pub fn retype_by_norm(textbounds: &mut [Textbound], rules: &[RetypeRule], sink: &mut dyn MatchSink) {
    for tb in textbounds.iter_mut() {
        for rule in rules {
            if tb.entity_type == rule.from && tb.has_norm_id_in(&rule.ids) {
                sink.event(MatchEvent::Retyped {
                    to: &rule.to,
                    textbound: &*tb,
                });
                tb.entity_type = rule.to.clone();
            }
        }
    }
}

/// Drop records whose type is in `excluded`
pub fn filter_by_type(textbounds: &mut Vec<Textbound>, excluded: &BTreeSet<String>) {
    textbounds.retain(|tb| !excluded.contains(&tb.entity_type));
}

/// Replace every type by its canonical name
pub fn apply_type_mapping(textbounds: &mut [Textbound]) {
    for tb in textbounds.iter_mut() {
        tb.entity_type = canonicalize(&tb.entity_type).to_string();
    }
}

/// Run the enabled stages in order: retype, filter, force-map
pub fn prepare(textbounds: &mut Vec<Textbound>, options: &CompareOptions, sink: &mut dyn MatchSink) {
    if !options.retype.is_empty() {
        retype_by_norm(textbounds, &options.retype, sink);
    }
    if !options.filter_types.is_empty() {
        filter_by_type(textbounds, &options.filter_types);
    }
    if options.force_map {
        apply_type_mapping(textbounds);
    }
}
