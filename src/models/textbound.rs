//! Standoff records: typed text spans and their normalizations

use super::diagnostic::Diagnostics;
use super::error::RecordError;
use super::span::parse_span;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A typed, character-offset span annotation over a document
///
/// Two textbounds with identical fields are still distinct records; the
/// matcher tracks them by their position in the document's record list,
/// so there is no value equality.
#[derive(Debug, Clone, Serialize)]
pub struct Textbound {
    pub id: String,

    /// Freeform type label; reassigned by retyping and forced mapping
    pub entity_type: String,

    /// Span as written in the source, e.g. `"0 5"` or `"0 5;9 12"`
    pub span: String,

    /// Start offset (inclusive)
    pub start: usize,

    /// End offset (exclusive)
    pub end: usize,

    pub text: String,

    pub normalizations: Vec<Normalization>,
}

impl Textbound {
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        span: impl Into<String>,
        text: impl Into<String>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, RecordError> {
        let span = span.into();
        let (start, end) = parse_span(&span, diagnostics)?;
        Ok(Self {
            id: id.into(),
            entity_type: entity_type.into(),
            span,
            start,
            end,
            text: text.into(),
            normalizations: Vec::new(),
        })
    }

    /// Single-fragment textbound from known offsets
    pub fn from_offsets(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            span: format!("{} {}", start, end),
            start,
            end,
            text: text.into(),
            normalizations: Vec::new(),
        }
    }

    /// Parse a `<id>\t<type> <span>\t<text>` line
    pub fn from_standoff(line: &str, diagnostics: &mut Diagnostics) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [id, type_span, text] = fields.as_slice() else {
            return Err(RecordError::FieldCount {
                expected: 3,
                found: fields.len(),
            });
        };
        let (entity_type, span) = type_span
            .split_once(' ')
            .ok_or(RecordError::MissingSpan)?;
        Self::new(*id, entity_type, span, *text, diagnostics)
    }

    /// Check the recorded text against the document text it annotates
    ///
    /// Offsets count characters, not bytes.
    pub fn validate_text(&self, document_text: &str) -> Result<(), RecordError> {
        let length = document_text.chars().count();
        if self.end > length {
            return Err(RecordError::OutOfBounds {
                start: self.start,
                end: self.end,
                length,
            });
        }
        let found: String = document_text
            .chars()
            .skip(self.start)
            .take(self.end - self.start)
            .collect();
        if found != self.text {
            return Err(RecordError::TextMismatch {
                expected: self.text.clone(),
                found,
            });
        }
        Ok(())
    }

    /// Whether any attached normalization refers to one of `ids`
    pub fn has_norm_id_in(&self, ids: &HashSet<String>) -> bool {
        self.normalizations.iter().any(|n| ids.contains(&n.norm_id))
    }
}

impl fmt::Display for Textbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{} {}\t{}", self.id, self.entity_type, self.span, self.text)
    }
}

/// Reference from a textbound to an external vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalization {
    pub id: String,

    /// Normalization type tag, e.g. `Reference`
    pub norm_type: String,

    /// ID of the annotated textbound
    pub tb_id: String,

    /// Key in the external vocabulary, e.g. `TAGGER:12345`
    pub norm_id: String,

    pub text: String,
}

impl Normalization {
    /// Parse a `<id>\t<type> <tb-id> <norm-id>\t<text>` line
    pub fn from_standoff(line: &str) -> Result<Self, RecordError> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [id, type_ids, text] = fields.as_slice() else {
            return Err(RecordError::FieldCount {
                expected: 3,
                found: fields.len(),
            });
        };
        let tokens: Vec<&str> = type_ids.split(' ').collect();
        let [norm_type, tb_id, norm_id] = tokens.as_slice() else {
            return Err(RecordError::TokenCount {
                expected: 3,
                found: tokens.len(),
            });
        };
        Ok(Self {
            id: id.to_string(),
            norm_type: norm_type.to_string(),
            tb_id: tb_id.to_string(),
            norm_id: norm_id.to_string(),
            text: text.to_string(),
        })
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{} {} {}\t{}",
            self.id, self.norm_type, self.tb_id, self.norm_id, self.text
        )
    }
}
