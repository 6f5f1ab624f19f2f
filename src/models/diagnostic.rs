//! Non-fatal diagnostics
//!
//! Conditions that are reported but never abort a comparison: lossy
//! multi-fragment spans, unsupported lines, dangling normalizations,
//! unpaired documents. Every entry is logged through `tracing` when it is
//! recorded and kept so callers can inspect what happened during a run.

use serde::Serialize;
use std::fmt;

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// Discontinuous span collapsed to its enclosing range
    MultiFragmentSpan,
    /// Line of an annotation kind that is not compared
    UnsupportedLine,
    /// Normalization pointing at a textbound that does not exist
    UnlinkedNormalization,
    /// Textbound text disagrees with the document text
    TextMismatch,
    /// Two paths of different shape (file, directory, store)
    PathMismatch,
    /// Document present on one side only
    ///
    /// Kept apart from [`DiagnosticKind::PathMismatch`]: an unpaired
    /// directory entry, store key or second file lands here, never there.
    MissingCounterpart,
    /// Document that failed to parse and was left out of the statistics
    DocumentFailed,
    /// Input left over after conversion
    ExtraInput,
    /// Fallback taken after a lookup table failed to load
    Fallback,
}

/// Severity a diagnostic is logged at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Collector for diagnostics raised during one run
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(kind = ?kind, "{}", message);
        self.push(kind, Level::Info, message);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(kind = ?kind, "{}", message);
        self.push(kind, Level::Warning, message);
    }

    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(kind = ?kind, "{}", message);
        self.push(kind, Level::Error, message);
    }

    fn push(&mut self, kind: DiagnosticKind, level: Level, message: String) {
        self.entries.push(Diagnostic {
            kind,
            level,
            message,
        });
    }

    /// Number of recorded diagnostics of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_by_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(DiagnosticKind::UnsupportedLine, "skipping line 2");
        diagnostics.error(DiagnosticKind::UnlinkedNormalization, "unknown T9");
        diagnostics.warn(DiagnosticKind::UnsupportedLine, "skipping line 5");

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedLine), 2);
        assert_eq!(diagnostics.count(DiagnosticKind::MultiFragmentSpan), 0);
        assert_eq!(
            diagnostics.iter().nth(1).map(|d| d.level),
            Some(Level::Error)
        );
    }
}
