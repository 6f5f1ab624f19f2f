//! Type canonicalization and equivalence

use super::events::{MatchEvent, MatchSink, TextPair};

/// Source-specific type codes and the canonical names they stand for
pub const TYPE_MAP: &[(&str, &str)] = &[
    // EVEX
    ("cel", "Cell"),
    ("che", "Chemical"),
    ("dis", "Disease"),
    ("ggp", "Gene"),
    ("org", "Organism"),
    // EXTRACT
    ("Chemical_compound", "Chemical"),
    // PubTator
    ("Species", "Organism"),
];

/// Canonical name for a type, or the type itself when it has no mapping
pub fn canonicalize(entity_type: &str) -> &str {
    TYPE_MAP
        .iter()
        .find(|(code, _)| *code == entity_type)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(entity_type)
}

/// Whether two types count as the same
///
/// Without mapping this is string equality. With mapping either side may be
/// written in the raw or the canonical vocabulary.
pub fn types_equivalent(first: &str, second: &str, map_types: bool) -> bool {
    if !map_types {
        return first == second;
    }
    first == second
        || canonicalize(first) == second
        || first == canonicalize(second)
        || canonicalize(first) == canonicalize(second)
}

/// [`types_equivalent`] that also reports the decision to `sink`
pub fn types_match(
    first_type: &str,
    second_type: &str,
    text: TextPair<'_>,
    map_types: bool,
    sink: &mut dyn MatchSink,
) -> bool {
    let matched = types_equivalent(first_type, second_type, map_types);

    if matched {
        sink.event(MatchEvent::TypeMatch {
            first_type,
            second_type,
            text,
        });
        if text.differs() {
            sink.event(MatchEvent::OverlapMatch {
                first_type,
                second_type,
                text,
            });
        }
    } else {
        sink.event(MatchEvent::TypeMismatch {
            first_type,
            second_type,
            text,
        });
    }

    matched
}
