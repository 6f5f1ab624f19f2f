//! Comparison options and their file-based configuration

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given
pub const CONFIG_FILE_NAME: &str = "standoff-compare.toml";

pub const DEFAULT_SUFFIX: &str = ".ann";

/// Reclassify records of type `from` carrying a normalization in `ids`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetypeRule {
    pub from: String,
    pub to: String,
    pub ids: HashSet<String>,
}

impl RetypeRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>, ids: HashSet<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ids,
        }
    }
}

/// Options controlling one comparison run
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Types dropped from both sides before matching
    pub filter_types: BTreeSet<String>,

    /// Stop after this many documents
    pub limit: Option<u64>,

    /// Treat raw and canonical type names as equivalent when matching
    pub map_types: bool,

    /// Rewrite every type to its canonical name before matching
    pub force_map: bool,

    /// Accept overlapping spans instead of requiring identical ones
    pub overlap: bool,

    /// Applied in order, see [`crate::compare::transform::retype_by_norm`]
    pub retype: Vec<RetypeRule>,

    /// Extension (with leading dot) of the files and keys to compare
    pub suffix: String,

    /// Check textbound text against sibling `.txt` documents when present
    pub validate_text: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            filter_types: BTreeSet::new(),
            limit: None,
            map_types: false,
            force_map: false,
            overlap: false,
            retype: Vec::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
            validate_text: false,
        }
    }
}

impl CompareOptions {
    /// Whether the document limit has been reached after `documents` comparisons
    pub fn limit_reached(&self, documents: u64) -> bool {
        self.limit.is_some_and(|limit| documents >= limit)
    }
}

/// Retype rule as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetypeConfig {
    pub from: String,
    pub to: String,
    pub ids_file: PathBuf,
}

/// Defaults for [`CompareOptions`] read from `standoff-compare.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    pub suffix: Option<String>,
    pub maptypes: bool,
    pub forcemap: bool,
    pub overlap: bool,
    pub validate_text: bool,
    pub filtertypes: Vec<String>,
    pub limit: Option<u64>,
    pub retype: Vec<RetypeConfig>,
}

impl CompareConfig {
    /// Load config from an explicit path, or from the working directory
    ///
    /// An explicit path must exist; the implicit one falls back to defaults.
    pub fn load(explicit: Option<&Path>, working_dir: &Path) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = working_dir.join(CONFIG_FILE_NAME);
                if !path.exists() {
                    return Ok(Self::default());
                }
                path
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config {}", config_path.display()))?;
        let config: CompareConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Turn the config into options, reading any retype ID files
    pub fn into_options(self) -> anyhow::Result<CompareOptions> {
        let retype = self
            .retype
            .into_iter()
            .map(|rule| Ok(RetypeRule::new(rule.from, rule.to, read_ids(&rule.ids_file)?)))
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(CompareOptions {
            filter_types: self.filtertypes.into_iter().collect(),
            limit: self.limit,
            map_types: self.maptypes,
            force_map: self.forcemap,
            overlap: self.overlap,
            retype,
            suffix: self.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
            validate_text: self.validate_text,
        })
    }
}

/// Read a set of normalization IDs, one per line
///
/// Only the line ending is stripped, so a blank line contributes the empty ID.
pub fn read_ids(path: &Path) -> anyhow::Result<HashSet<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read ID file {}", path.display()))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Parse `FROM:TO:FILE[;FROM:TO:FILE ...]`, reading each ID file
pub fn parse_retype_rules(spec: &str) -> anyhow::Result<Vec<RetypeRule>> {
    spec.split(';')
        .map(|rule| {
            let parts: Vec<&str> = rule.split(':').collect();
            let [from, to, file] = parts.as_slice() else {
                bail!("invalid retype rule \"{}\", expected FROM:TO:FILE", rule);
            };
            Ok(RetypeRule::new(*from, *to, read_ids(Path::new(file))?))
        })
        .collect()
}

/// Parse a comma-separated list of type names
pub fn parse_type_list(list: &str) -> BTreeSet<String> {
    list.split(',').map(str::to_string).collect()
}
