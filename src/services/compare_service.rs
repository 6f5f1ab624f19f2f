//! Comparison driver - pairs documents from two sources and scores them
//!
//! A source is a single annotation file, a directory tree of them, or a
//! document store. Both sides must have the same shape. Statistics from every
//! compared pair accumulate in one [`Stats`] owned by the run.

use crate::compare::{compare_annotations, DocumentOutcome, MatchSink};
use crate::models::{
    CompareOptions, Diagnostic, DiagnosticKind, Diagnostics, FormatError, Stats, Textbound,
};
use crate::parser::parse_standoff;
use crate::services::document_store::{is_store, DocumentStore, DOCUMENTS_TABLE};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of the document text next to an annotation file
pub const TEXT_EXTENSION: &str = "txt";

/// Shape of a comparison source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    Store,
    Missing,
}

impl PathKind {
    pub fn of(path: &Path) -> Self {
        if !path.exists() {
            PathKind::Missing
        } else if path.is_dir() {
            PathKind::Directory
        } else if is_store(path) {
            PathKind::Store
        } else {
            PathKind::File
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PathKind::File => "file",
            PathKind::Directory => "directory",
            PathKind::Store => "store",
            PathKind::Missing => "missing path",
        }
    }
}

/// Whether `path` ends in `suffix` (given with its leading dot)
///
/// Only the last extension counts, so `.ann` matches `a.b.ann` but a bare
/// `.ann` file name has no extension at all.
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    match (path.extension(), suffix.strip_prefix('.')) {
        (Some(ext), Some(wanted)) => ext == wanted,
        _ => false,
    }
}

/// One side of a document pair
#[derive(Debug, Clone)]
pub struct Document {
    /// Name used in error messages
    pub source: String,
    pub content: String,
    /// Text the annotations refer to, when known
    pub text: Option<String>,
}

impl Document {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            text: None,
        }
    }

    pub fn with_text(mut self, text: Option<String>) -> Self {
        self.text = text;
        self
    }

    fn parse(&self, diagnostics: &mut Diagnostics) -> std::result::Result<Vec<Textbound>, FormatError> {
        parse_standoff(&self.content, &self.source, diagnostics)
    }
}

/// Document pair that could not be compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub label: String,
    pub error: String,
}

/// Everything a finished run produced
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub stats: Stats,
    pub outcomes: Vec<DocumentOutcome>,
    pub failures: Vec<DocumentFailure>,
    pub diagnostics: Vec<Diagnostic>,
}

/// State of one comparison run
pub struct CompareRun<'a> {
    options: &'a CompareOptions,
    sink: &'a mut dyn MatchSink,
    stats: Stats,
    diagnostics: Diagnostics,
    outcomes: Vec<DocumentOutcome>,
    failures: Vec<DocumentFailure>,
}

impl<'a> CompareRun<'a> {
    pub fn new(options: &'a CompareOptions, sink: &'a mut dyn MatchSink) -> Self {
        Self {
            options,
            sink,
            stats: Stats::new(),
            diagnostics: Diagnostics::new(),
            outcomes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn outcomes(&self) -> &[DocumentOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> &[DocumentFailure] {
        &self.failures
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn finish(self) -> RunSummary {
        RunSummary {
            stats: self.stats,
            outcomes: self.outcomes,
            failures: self.failures,
            diagnostics: self.diagnostics.into_vec(),
        }
    }

    /// Compare two sources of the same shape
    ///
    /// A missing first source is an error. A missing second source or a
    /// shape mismatch is reported and the pair skipped.
    pub fn compare(&mut self, first: &Path, second: &Path) -> Result<()> {
        match (PathKind::of(first), PathKind::of(second)) {
            (PathKind::Missing, _) => {
                anyhow::bail!("no such file, directory or store: {}", first.display());
            }
            (_, PathKind::Missing) => {
                self.diagnostics.warn(
                    DiagnosticKind::MissingCounterpart,
                    format!("{} not found", second.display()),
                );
            }
            (PathKind::File, PathKind::File) => self.compare_files(first, second)?,
            (PathKind::Directory, PathKind::Directory) => self.compare_dirs(first, second)?,
            (PathKind::Store, PathKind::Store) => self.compare_stores(first, second)?,
            (first_kind, second_kind) => {
                self.diagnostics.warn(
                    DiagnosticKind::PathMismatch,
                    format!(
                        "cannot compare {} {} to {} {}",
                        first_kind.name(),
                        first.display(),
                        second_kind.name(),
                        second.display()
                    ),
                );
            }
        }
        Ok(())
    }

    /// Compare one pair of annotation files, labelled by the first path
    pub fn compare_files(&mut self, first: &Path, second: &Path) -> Result<()> {
        let first_doc = self.read_file(first)?;
        let second_doc = self.read_file(second)?;
        let label = first.display().to_string();
        self.compare_documents(&first_doc, &second_doc, &label)
            .with_context(|| format!("failed to compare {} and {}", first.display(), second.display()))
    }

    /// Compare every pair of same-named annotation files under two trees
    ///
    /// Files are paired by path relative to each root and visited in sorted
    /// order. A pair that fails to parse is recorded and skipped.
    pub fn compare_dirs(&mut self, first: &Path, second: &Path) -> Result<()> {
        let first_files = collect_annotation_files(first, &self.options.suffix)?;
        let second_files = collect_annotation_files(second, &self.options.suffix)?;
        tracing::debug!(
            first = first_files.len(),
            second = second_files.len(),
            "collected annotation files"
        );

        for relative in first_files.union(&second_files) {
            if self.limit_reached() {
                break;
            }
            match (first_files.contains(relative), second_files.contains(relative)) {
                (true, true) => {
                    let first_path = first.join(relative);
                    if let Err(e) = self.compare_files(&first_path, &second.join(relative)) {
                        self.record_failure(first_path.display().to_string(), format!("{:#}", e));
                    }
                }
                (true, false) => self.report_missing(relative, second),
                (false, _) => self.report_missing(relative, first),
            }
        }
        Ok(())
    }

    /// Compare documents stored under the same key in two stores
    ///
    /// Keys of the first store are visited in order; keys missing from the
    /// second store are reported and skipped.
    pub fn compare_stores(&mut self, first: &Path, second: &Path) -> Result<()> {
        let first_store = DocumentStore::open(first, DOCUMENTS_TABLE)
            .with_context(|| format!("failed to open {}", first.display()))?;
        let second_store = DocumentStore::open(second, DOCUMENTS_TABLE)
            .with_context(|| format!("failed to open {}", second.display()))?;

        for (key, content) in first_store.entries()? {
            if !has_suffix(Path::new(&key), &self.options.suffix) {
                continue;
            }
            if self.limit_reached() {
                break;
            }
            let Some(second_content) = second_store.get(&key)? else {
                self.report_missing(Path::new(&key), second);
                continue;
            };

            let first_doc = Document::new(format!("{}:{}", first.display(), key), content)
                .with_text(self.stored_text(&first_store, &key)?);
            let second_doc = Document::new(format!("{}:{}", second.display(), key), second_content)
                .with_text(self.stored_text(&second_store, &key)?);
            if let Err(e) = self.compare_documents(&first_doc, &second_doc, &key) {
                self.record_failure(key, e.to_string());
            }
        }
        Ok(())
    }

    /// Parse, optionally validate, and match one document pair
    pub fn compare_documents(
        &mut self,
        first: &Document,
        second: &Document,
        label: &str,
    ) -> std::result::Result<(), FormatError> {
        let first_records = first.parse(&mut self.diagnostics)?;
        let second_records = second.parse(&mut self.diagnostics)?;

        if self.options.validate_text {
            self.validate(first, &first_records);
            self.validate(second, &second_records);
        }

        let outcome = compare_annotations(
            first_records,
            second_records,
            self.options,
            &mut self.stats,
            label,
            &mut *self.sink,
        );
        self.outcomes.push(outcome);
        Ok(())
    }

    fn validate(&mut self, document: &Document, records: &[Textbound]) {
        let Some(text) = document.text.as_deref() else {
            return;
        };
        for tb in records {
            if let Err(reason) = tb.validate_text(text) {
                self.diagnostics.warn(
                    DiagnosticKind::TextMismatch,
                    format!("{}: {}: {}", document.source, tb.id, reason),
                );
            }
        }
    }

    fn read_file(&self, path: &Path) -> Result<Document> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let text = if self.options.validate_text {
            let text_path = path.with_extension(TEXT_EXTENSION);
            if text_path.is_file() {
                Some(
                    fs::read_to_string(&text_path)
                        .with_context(|| format!("failed to read {}", text_path.display()))?,
                )
            } else {
                None
            }
        } else {
            None
        };
        Ok(Document::new(path.display().to_string(), content).with_text(text))
    }

    fn stored_text(&self, store: &DocumentStore, key: &str) -> Result<Option<String>> {
        if !self.options.validate_text {
            return Ok(None);
        }
        let text_key = Path::new(key).with_extension(TEXT_EXTENSION);
        Ok(store.get(&text_key.to_string_lossy())?)
    }

    fn limit_reached(&self) -> bool {
        let reached = self.options.limit_reached(self.stats.documents());
        if reached {
            tracing::info!(documents = self.stats.documents(), "document limit reached");
        }
        reached
    }

    fn report_missing(&mut self, name: &Path, side: &Path) {
        self.diagnostics.warn(
            DiagnosticKind::MissingCounterpart,
            format!("{} not found in {}", name.display(), side.display()),
        );
    }

    fn record_failure(&mut self, label: String, error: String) {
        self.diagnostics.error(
            DiagnosticKind::DocumentFailed,
            format!("skipping {}: {}", label, error),
        );
        self.failures.push(DocumentFailure { label, error });
    }
}

/// Relative paths of all files under `root` ending in `suffix`
fn collect_annotation_files(root: &Path, suffix: &str) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() || !has_suffix(entry.path(), suffix) {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.insert(relative.to_path_buf());
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{NullSink, RecordingSink, Verdict};
    use crate::models::stats::{DOC_LEVEL, DOC_TOTAL, FN, TOTAL_METRICS, TP};
    use tempfile::TempDir;

    const GENE: &str = "T1\tGene 0 5\tBRCA1\n";

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_path_kind() {
        let temp_dir = TempDir::new().unwrap();
        let file = write(temp_dir.path(), "a.ann", "");
        let store = write(temp_dir.path(), "a.redb", "");
        assert_eq!(PathKind::of(&file), PathKind::File);
        assert_eq!(PathKind::of(&store), PathKind::Store);
        assert_eq!(PathKind::of(temp_dir.path()), PathKind::Directory);
        assert_eq!(PathKind::of(&temp_dir.path().join("nope")), PathKind::Missing);
    }

    #[test]
    fn test_has_suffix() {
        assert!(has_suffix(Path::new("dir/doc.ann"), ".ann"));
        assert!(has_suffix(Path::new("doc.v2.ann"), ".ann"));
        assert!(!has_suffix(Path::new("doc.txt"), ".ann"));
        assert!(!has_suffix(Path::new(".ann"), ".ann"));
        assert!(!has_suffix(Path::new("doc.ann"), "ann"));
    }

    #[test]
    fn test_compare_documents_records_outcome() {
        let options = CompareOptions::default();
        let mut sink = RecordingSink::new();
        let mut run = CompareRun::new(&options, &mut sink);

        run.compare_documents(&Document::new("a", GENE), &Document::new("b", GENE), "doc")
            .unwrap();

        assert_eq!(run.stats().get(TOTAL_METRICS, TP), 1);
        assert_eq!(run.outcomes().len(), 1);
        assert_eq!(run.outcomes()[0].verdict, Verdict::MatchNonEmpty);
        drop(run);
        assert_eq!(sink.count("MATCH"), 1);
        assert_eq!(sink.count("SCORE 1\tdoc"), 1);
    }

    #[test]
    fn test_format_error_leaves_stats_untouched() {
        let options = CompareOptions::default();
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);

        let bad = Document::new("bad.ann", "T1\tGene 0 5\n");
        assert!(run.compare_documents(&bad, &Document::new("b", GENE), "doc").is_err());
        assert!(run.stats().is_empty());
    }

    #[test]
    fn test_validate_text_reports_mismatch() {
        let options = CompareOptions {
            validate_text: true,
            ..CompareOptions::default()
        };
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);

        let first = Document::new("a", GENE).with_text(Some("BRCA2 is a gene".to_string()));
        let second = Document::new("b", GENE).with_text(Some("BRCA1 is a gene".to_string()));
        run.compare_documents(&first, &second, "doc").unwrap();

        assert_eq!(run.diagnostics().count(DiagnosticKind::TextMismatch), 1);
        // validation never affects scoring
        assert_eq!(run.stats().get(TOTAL_METRICS, TP), 1);
    }

    #[test]
    fn test_shape_mismatch_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let file = write(temp_dir.path(), "a.ann", GENE);
        let options = CompareOptions::default();
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);

        run.compare(&file, temp_dir.path()).unwrap();
        run.compare(&file, &temp_dir.path().join("missing.ann")).unwrap();

        assert_eq!(run.diagnostics().count(DiagnosticKind::PathMismatch), 1);
        assert_eq!(run.diagnostics().count(DiagnosticKind::MissingCounterpart), 1);
        assert_eq!(run.stats().documents(), 0);
        assert!(run.compare(&temp_dir.path().join("missing.ann"), &file).is_err());
    }

    #[test]
    fn test_compare_dirs_pairs_by_relative_path() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("set1");
        let second = temp_dir.path().join("set2");
        write(&first, "a.ann", GENE);
        write(&second, "a.ann", GENE);
        write(&first, "nested/b.ann", "T1\tDisease 0 5\ttumor\n");
        write(&second, "nested/b.ann", "");
        write(&first, "only-first.ann", GENE);
        write(&second, "only-second.ann", GENE);
        write(&first, "a.txt", "BRCA1");

        let options = CompareOptions::default();
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);
        run.compare(&first, &second).unwrap();

        assert_eq!(run.stats().get(DOC_LEVEL, DOC_TOTAL), 2);
        assert_eq!(run.stats().get(TOTAL_METRICS, TP), 1);
        assert_eq!(run.stats().get(TOTAL_METRICS, FN), 1);
        assert_eq!(run.diagnostics().count(DiagnosticKind::MissingCounterpart), 2);
        assert_eq!(run.diagnostics().count(DiagnosticKind::PathMismatch), 0);

        let labels: Vec<String> = run.outcomes().iter().map(|o| o.label.clone()).collect();
        assert_eq!(
            labels,
            vec![
                first.join("a.ann").display().to_string(),
                first.join("nested/b.ann").display().to_string(),
            ]
        );
    }

    #[test]
    fn test_compare_dirs_isolates_failures() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("set1");
        let second = temp_dir.path().join("set2");
        write(&first, "a.ann", "T1\tGene 5 0\tBRCA1\n");
        write(&second, "a.ann", GENE);
        write(&first, "b.ann", GENE);
        write(&second, "b.ann", GENE);

        let options = CompareOptions::default();
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);
        run.compare(&first, &second).unwrap();

        assert_eq!(run.failures().len(), 1);
        assert_eq!(run.failures()[0].label, first.join("a.ann").display().to_string());
        assert_eq!(run.diagnostics().count(DiagnosticKind::DocumentFailed), 1);
        assert_eq!(run.stats().documents(), 1);
    }

    #[test]
    fn test_limit_stops_directory_run() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("set1");
        let second = temp_dir.path().join("set2");
        for name in ["a.ann", "b.ann", "c.ann"] {
            write(&first, name, GENE);
            write(&second, name, GENE);
        }

        let options = CompareOptions {
            limit: Some(2),
            ..CompareOptions::default()
        };
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);
        run.compare(&first, &second).unwrap();

        assert_eq!(run.stats().documents(), 2);
    }

    #[test]
    fn test_compare_stores() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("set1.redb");
        let second = temp_dir.path().join("set2.redb");
        DocumentStore::create(
            &first,
            DOCUMENTS_TABLE,
            [("a.ann", GENE), ("a.txt", "BRCA1"), ("b.ann", GENE)],
        )
        .unwrap();
        DocumentStore::create(&second, DOCUMENTS_TABLE, [("a.ann", GENE)]).unwrap();

        let options = CompareOptions::default();
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);
        run.compare(&first, &second).unwrap();

        assert_eq!(run.stats().documents(), 1);
        assert_eq!(run.outcomes()[0].label, "a.ann");
        assert_eq!(run.diagnostics().count(DiagnosticKind::MissingCounterpart), 1);
    }
}
