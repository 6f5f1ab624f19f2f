//! Convert CLI command

use crate::models::{DiagnosticKind, Diagnostics};
use crate::services::convert_service::{ConvertOptions, Converter, NameLookup};
use crate::services::taxonomy::{TaxonomyNames, DEFAULT_TAXNAMES_PATH};
use crate::Result;
use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// TSV file with document text and data
    pub docs: PathBuf,

    /// TSV file with tags for documents
    pub tags: PathBuf,

    /// Store whose names table maps tagger serials to names
    #[arg(short, long, value_name = "DB")]
    pub namedb: Option<PathBuf>,

    /// Output directory (default stdout)
    #[arg(short, long, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Add subdirectories named by a document ID prefix of this length
    #[arg(short = 'P', long, value_name = "N")]
    pub dir_prefix: Option<usize>,

    /// TSV file mapping NCBI taxonomy IDs to names
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TAXNAMES_PATH)]
    pub taxnames: PathBuf,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    let mut diagnostics = Diagnostics::new();
    let taxonomy = TaxonomyNames::load_or_builtin(&args.taxnames, &mut diagnostics);
    let names = match &args.namedb {
        Some(path) => NameLookup::open(path)?,
        None => NameLookup::none(),
    };

    let docs = BufReader::new(
        File::open(&args.docs).with_context(|| format!("failed to open {}", args.docs.display()))?,
    );
    let tags = BufReader::new(
        File::open(&args.tags).with_context(|| format!("failed to open {}", args.tags.display()))?,
    );

    let options = ConvertOptions {
        directory: args.directory.clone(),
        dir_prefix: args.dir_prefix,
    };
    let to_directory = options.directory.is_some();
    let mut converter = Converter::new(&taxonomy, names, options);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let converted = converter.process(
        docs,
        &args.docs.display().to_string(),
        tags,
        &args.tags.display().to_string(),
        &mut out,
    )?;
    out.flush()?;

    if to_directory {
        println!(
            "{}",
            format!("✅ Converted {} documents", converted).green().bold()
        );
        let extra = converter.diagnostics().count(DiagnosticKind::ExtraInput);
        if extra > 0 {
            println!("{}", format!("⚠️  {} unmatched tag line(s)", extra).yellow());
        }
    }
    Ok(())
}
