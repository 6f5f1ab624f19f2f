//! Annotation matching engine
//!
//! One document pair goes through [`transform::prepare`] on both sides and
//! then [`matcher::match_annotations`], which folds its counts into the
//! shared [`crate::models::Stats`].

pub mod events;
pub mod matcher;
pub mod transform;
pub mod type_policy;

pub use events::{ConsoleSink, MatchEvent, MatchSink, NullSink, RecordingSink, TextPair};
pub use matcher::{compare_annotations, match_annotations, DocumentOutcome, Verdict};
pub use transform::{apply_type_mapping, filter_by_type, prepare, retype_by_norm};
pub use type_policy::{canonicalize, types_equivalent, types_match, TYPE_MAP};
