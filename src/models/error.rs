//! Error types for standoff record parsing

/// A problem with a single annotation record, independent of where it came from
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("expected {expected} tab-separated fields, got {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("expected type and span separated by a space")]
    MissingSpan,

    #[error("expected {expected} space-separated tokens, got {found}")]
    TokenCount { expected: usize, found: usize },

    #[error("span fragment \"{0}\" is not \"start end\"")]
    MalformedFragment(String),

    #[error("invalid offset \"{0}\"")]
    InvalidOffset(String),

    #[error("span fragment starts at {start} after its end {end}")]
    InvertedSpan { start: usize, end: usize },

    #[error("text \"{expected}\" does not match document text \"{found}\"")]
    TextMismatch { expected: String, found: String },

    #[error("span {start}-{end} is outside the document text ({length} characters)")]
    OutOfBounds { start: usize, end: usize, length: usize },
}

/// A malformed record, located in its source document
///
/// Aborts parsing of the containing document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line} in {source_name}: {reason}: {content}")]
pub struct FormatError {
    /// File path or store key of the document
    pub source_name: String,

    /// 1-based line number
    pub line: usize,

    /// The offending line
    pub content: String,

    #[source]
    pub reason: RecordError,
}

impl FormatError {
    pub fn new(
        source_name: impl Into<String>,
        line: usize,
        content: impl Into<String>,
        reason: RecordError,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            line,
            content: content.into(),
            reason,
        }
    }
}
