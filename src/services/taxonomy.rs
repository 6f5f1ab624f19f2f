//! NCBI taxonomy ID to scientific name lookup
//!
//! Built once by the caller and handed to the converter; nothing here is
//! loaded lazily.

use crate::models::{DiagnosticKind, Diagnostics};
use anyhow::{bail, Context};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default location of the full name table
pub const DEFAULT_TAXNAMES_PATH: &str = "data/taxnames.tsv";

/// Name returned for IDs missing from the table
pub const UNKNOWN_NAME: &str = "<UNKNOWN>";

const BUILTIN_NAMES: &[(i64, &str)] = &[
    (3702, "Arabidopsis thaliana"),
    (4896, "Schizosaccharomyces pombe"),
    (4932, "Saccharomyces cerevisiae"),
    (6239, "Caenorhabditis elegans"),
    (7227, "Drosophila melanogaster"),
    (7955, "Danio rerio"),
    (9031, "Gallus gallus"),
    (9606, "Homo sapiens"),
    (9823, "Sus scrofa"),
    (9913, "Bos taurus"),
    (10090, "Mus musculus"),
    (10116, "Rattus norvegicus"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyNames {
    names: HashMap<i64, String>,
}

impl TaxonomyNames {
    /// The common model organisms
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_NAMES
                .iter()
                .map(|(id, name)| (*id, name.to_string()))
                .collect(),
        }
    }

    /// Load a `taxid\tname` table
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut names = HashMap::new();
        for (index, line) in content.lines().enumerate() {
            let Some((id, name)) = line.split_once('\t') else {
                bail!("line {} in {}: expected taxid and name", index + 1, path.display());
            };
            let id: i64 = id.parse().with_context(|| {
                format!("line {} in {}: invalid taxid \"{}\"", index + 1, path.display(), id)
            })?;
            names.insert(id, name.to_string());
        }
        Ok(Self { names })
    }

    /// Load a table, falling back to [`TaxonomyNames::builtin`] on failure
    pub fn load_or_builtin(path: &Path, diagnostics: &mut Diagnostics) -> Self {
        match Self::load(path) {
            Ok(names) => {
                tracing::info!(path = %path.display(), entries = names.len(), "loaded taxonomy names");
                names
            }
            Err(e) => {
                diagnostics.warn(
                    DiagnosticKind::Fallback,
                    format!("failed to load {}: {:#}; using built-in names", path.display(), e),
                );
                Self::builtin()
            }
        }
    }

    /// Scientific name for a taxonomy ID, or `<UNKNOWN>`
    pub fn name(&self, taxid: i64) -> &str {
        self.names.get(&taxid).map(String::as_str).unwrap_or(UNKNOWN_NAME)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_names() {
        let names = TaxonomyNames::builtin();
        assert_eq!(names.len(), 12);
        assert_eq!(names.name(10090), "Mus musculus");
        assert_eq!(names.name(1), UNKNOWN_NAME);
    }

    #[test]
    fn test_load_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("taxnames.tsv");
        fs::write(&path, "562\tEscherichia coli\n9606\tHomo sapiens\n").unwrap();

        let names = TaxonomyNames::load(&path).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.name(562), "Escherichia coli");
        assert_eq!(names.name(10090), UNKNOWN_NAME);
    }

    #[test]
    fn test_fallback_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut diagnostics = Diagnostics::new();
        let names =
            TaxonomyNames::load_or_builtin(&temp_dir.path().join("missing.tsv"), &mut diagnostics);
        assert_eq!(names, TaxonomyNames::builtin());
        assert_eq!(diagnostics.count(DiagnosticKind::Fallback), 1);
    }

    #[test]
    fn test_malformed_table_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("taxnames.tsv");
        fs::write(&path, "notanumber\tSomething\n").unwrap();
        assert!(TaxonomyNames::load(&path).is_err());
    }
}
