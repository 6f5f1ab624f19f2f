//! Converter from tagger TSV output to standoff documents

use crate::models::{DiagnosticKind, Diagnostics, Normalization, Textbound};
use crate::parser::{Mention, TaggedDocument};
use crate::services::document_store::{DocumentStore, NAMES_TABLE};
use crate::services::taxonomy::TaxonomyNames;
use crate::Result;
use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, BufRead, Write};
use std::iter::{Enumerate, Peekable};
use std::path::{Path, PathBuf};

/// Normalization type written for every tagger mention
pub const NORM_TYPE: &str = "Reference";

/// Prefix of normalization IDs built from tagger serials
pub const NORM_ID_PREFIX: &str = "TAGGER";

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Write `<pmid>.txt` and `<pmid>.ann` here instead of to the output stream
    pub directory: Option<PathBuf>,

    /// Shard output into subdirectories named by this many leading pmid characters
    pub dir_prefix: Option<usize>,
}

/// Display names for tagger serials, read from a store's `names` table
///
/// Without a store every lookup returns the caller's default. With one, the
/// first answer for a serial is cached and reused, even if it was a default.
pub struct NameLookup {
    store: Option<DocumentStore>,
    cache: HashMap<i64, String>,
}

impl NameLookup {
    pub fn none() -> Self {
        Self {
            store: None,
            cache: HashMap::new(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        let store = DocumentStore::open(path, NAMES_TABLE)
            .with_context(|| format!("failed to open name store {}", path.display()))?;
        Ok(Self {
            store: Some(store),
            cache: HashMap::new(),
        })
    }

    pub fn name(&mut self, serial: i64, default: &str) -> Result<String> {
        let Some(store) = &self.store else {
            return Ok(default.to_string());
        };
        if let Some(name) = self.cache.get(&serial) {
            return Ok(name.clone());
        }
        let name = store
            .get(&serial.to_string())?
            .unwrap_or_else(|| default.to_string());
        self.cache.insert(serial, name.clone());
        Ok(name)
    }
}

type TagLines<T> = Peekable<Enumerate<io::Lines<T>>>;

pub struct Converter<'a> {
    taxonomy: &'a TaxonomyNames,
    names: NameLookup,
    options: ConvertOptions,
    diagnostics: Diagnostics,
}

impl<'a> Converter<'a> {
    pub fn new(taxonomy: &'a TaxonomyNames, names: NameLookup, options: ConvertOptions) -> Self {
        Self {
            taxonomy,
            names,
            options,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Convert every document, returning how many were written
    ///
    /// Tags must come in document order: tag lines are consumed while their
    /// pmid equals the current document's. Lines left over at the end are
    /// reported. Output goes to `out` unless a directory is configured.
    pub fn process<D: BufRead, T: BufRead, W: Write>(
        &mut self,
        docs: D,
        docs_name: &str,
        tags: T,
        tags_name: &str,
        out: &mut W,
    ) -> Result<usize> {
        let mut tag_lines: TagLines<T> = tags.lines().enumerate().peekable();
        let mut converted = 0;

        for (index, line) in docs.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read {}", docs_name))?;
            let document = TaggedDocument::from_tsv(&line, index + 1, docs_name)?;
            let text = document.text();

            let mut mentions = Vec::new();
            if let Some(pmid) = document.pmid.as_deref() {
                while let Some((line_number, tag_line)) = next_tag_for(&mut tag_lines, pmid)
                    .with_context(|| format!("failed to read {}", tags_name))?
                {
                    let mention =
                        Mention::from_tsv(&tag_line, line_number, tags_name, self.taxonomy)?;
                    mention.validate_text(&text)?;
                    mentions.push(mention);
                }
            }

            let textbounds = self.to_standoff(&mentions)?;
            self.write_document(&document, &text, &textbounds, out)?;
            converted += 1;
        }

        for (index, line) in tag_lines {
            let line = line.with_context(|| format!("failed to read {}", tags_name))?;
            self.diagnostics.warn(
                DiagnosticKind::ExtraInput,
                format!("Extra line {} in {}: {}", index + 1, tags_name, line),
            );
        }

        tracing::info!(documents = converted, "conversion finished");
        Ok(converted)
    }

    /// Collapse mentions sharing span, type and text into single textbounds
    ///
    /// Groups come out in (start, end, type, text) order, each mention of a
    /// group contributing one normalization.
    pub fn to_standoff(&mut self, mentions: &[Mention]) -> Result<Vec<Textbound>> {
        let mut grouped: BTreeMap<(usize, usize, &str, &str), Vec<&Mention>> = BTreeMap::new();
        for m in mentions {
            grouped
                .entry((m.start, m.end, m.typename.as_str(), m.text.as_str()))
                .or_default()
                .push(m);
        }

        let mut textbounds = Vec::with_capacity(grouped.len());
        let mut norm_index = 0;
        for (t_index, ((start, end, typename, text), group)) in grouped.into_iter().enumerate() {
            let mut tb = Textbound::from_offsets(format!("T{}", t_index + 1), typename, start, end, text);
            for m in group {
                norm_index += 1;
                tracing::debug!(
                    pmid = %m.pmid,
                    serial = m.serial,
                    organism = m.organism.as_deref().unwrap_or("-"),
                    tb = %tb.id,
                    "normalized mention"
                );
                tb.normalizations.push(Normalization {
                    id: format!("N{}", norm_index),
                    norm_type: NORM_TYPE.to_string(),
                    tb_id: tb.id.clone(),
                    norm_id: format!("{}:{}", NORM_ID_PREFIX, m.serial),
                    text: self.names.name(m.serial, &m.text)?,
                });
            }
            textbounds.push(tb);
        }
        Ok(textbounds)
    }

    fn write_document<W: Write>(
        &self,
        document: &TaggedDocument,
        text: &str,
        textbounds: &[Textbound],
        out: &mut W,
    ) -> Result<()> {
        let Some(directory) = &self.options.directory else {
            writeln!(out, "{}", text)?;
            write_standoff(out, textbounds)?;
            return Ok(());
        };

        let name = document.pmid.as_deref().unwrap_or(&document.id);
        let outdir = match self.options.dir_prefix {
            Some(prefix) => directory.join(name.chars().take(prefix).collect::<String>()),
            None => directory.clone(),
        };
        fs::create_dir_all(&outdir)
            .with_context(|| format!("failed to create {}", outdir.display()))?;

        let txt_path = outdir.join(format!("{}.txt", name));
        fs::write(&txt_path, format!("{}\n", text))
            .with_context(|| format!("failed to write {}", txt_path.display()))?;

        let ann_path = outdir.join(format!("{}.ann", name));
        let mut ann = Vec::new();
        write_standoff(&mut ann, textbounds)?;
        fs::write(&ann_path, ann).with_context(|| format!("failed to write {}", ann_path.display()))?;

        tracing::debug!(path = %ann_path.display(), textbounds = textbounds.len(), "wrote document");
        Ok(())
    }
}

fn write_standoff<W: Write>(out: &mut W, textbounds: &[Textbound]) -> io::Result<()> {
    for tb in textbounds {
        writeln!(out, "{}", tb)?;
        for norm in &tb.normalizations {
            writeln!(out, "{}", norm)?;
        }
    }
    Ok(())
}

/// Next tag line (1-based number and content) if it belongs to `pmid`
fn next_tag_for<T: BufRead>(tags: &mut TagLines<T>, pmid: &str) -> io::Result<Option<(usize, String)>> {
    match tags.peek() {
        Some((_, Ok(line))) if line.split('\t').next() == Some(pmid) => {}
        Some((_, Err(_))) => {}
        _ => return Ok(None),
    }
    match tags.next() {
        Some((index, line)) => Ok(Some((index + 1, line?))),
        None => Ok(None),
    }
}
