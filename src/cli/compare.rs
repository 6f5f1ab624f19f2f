//! Compare CLI command

use crate::compare::{ConsoleSink, MatchSink, NullSink};
use crate::models::options::{parse_retype_rules, parse_type_list};
use crate::models::{CompareConfig, CompareOptions};
use crate::services::compare_service::{CompareRun, RunSummary};
use crate::Result;
use clap::Args;
use colored::Colorize;
use std::env;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub struct CompareArgs {
    /// Reference annotations: file, directory or .redb store
    #[arg(value_name = "SET1")]
    pub set1: PathBuf,

    /// Annotations scored against SET1, same shape as SET1
    #[arg(value_name = "SET2")]
    pub set2: PathBuf,

    /// Filter out annotations by type
    #[arg(short, long, value_name = "TYPE[,TYPE ...]")]
    pub filtertypes: Option<String>,

    /// Only compare first N documents
    #[arg(short, long, value_name = "N")]
    pub limit: Option<u64>,

    /// Apply mapping to type names when matching
    #[arg(short, long)]
    pub maptypes: bool,

    /// Always map types when a mapping exists
    #[arg(short = 'M', long)]
    pub forcemap: bool,

    /// Accept annotation overlap as match
    #[arg(short, long)]
    pub overlap: bool,

    /// Retype annotations with a norm ID listed in FILE
    #[arg(short, long, value_name = "FROM:TO:FILE[;FROM:TO:FILE ...]")]
    pub retype: Option<String>,

    /// Suffix of files to compare [default: .ann]
    #[arg(short, long)]
    pub suffix: Option<String>,

    /// Check annotation text against sibling .txt documents
    #[arg(long)]
    pub validate_text: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not print per-annotation match lines
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file [default: ./standoff-compare.toml if present]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl CompareArgs {
    /// Options from `config` with command-line flags layered on top
    pub fn options(&self, mut config: CompareConfig) -> Result<CompareOptions> {
        if self.retype.is_some() {
            config.retype.clear();
        }
        let mut options = config.into_options()?;

        if let Some(list) = &self.filtertypes {
            options.filter_types = parse_type_list(list);
        }
        if self.limit.is_some() {
            options.limit = self.limit;
        }
        options.map_types |= self.maptypes;
        options.force_map |= self.forcemap;
        options.overlap |= self.overlap;
        options.validate_text |= self.validate_text;
        if let Some(rules) = &self.retype {
            options.retype = parse_retype_rules(rules)?;
        }
        if let Some(suffix) = &self.suffix {
            options.suffix = suffix.clone();
        }
        Ok(options)
    }
}

pub fn run(args: CompareArgs) -> Result<()> {
    let config = CompareConfig::load(args.config.as_deref(), &env::current_dir()?)?;
    let options = args.options(config)?;

    let mut console = ConsoleSink;
    let mut null = NullSink;
    let sink: &mut dyn MatchSink = if args.quiet || args.json {
        &mut null
    } else {
        &mut console
    };

    let mut run = CompareRun::new(&options, sink);
    run.compare(&args.set1, &args.set2)?;
    let summary = run.finish();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print!("{}", render_report(&summary));
    if !summary.failures.is_empty() {
        eprintln!(
            "{}",
            format!("{} document(s) could not be compared:", summary.failures.len())
                .red()
                .bold()
        );
        for failure in &summary.failures {
            eprintln!("   • {}: {}", failure.label, failure.error);
        }
    }
    Ok(())
}

/// Plain-text report: metrics per bucket, then the descriptive counters
pub fn render_report(summary: &RunSummary) -> String {
    let rule = "-".repeat(78);
    let mut lines = vec![rule.clone()];

    for (bucket, m) in summary.stats.metrics() {
        lines.push(format!(
            "{}: f:{:.2}% (p:{:.2}% r:{:.2}%, tp:{} fp:{} fn:{})",
            bucket,
            m.f1() * 100.0,
            m.precision() * 100.0,
            m.recall() * 100.0,
            m.true_positives,
            m.false_positives,
            m.false_negatives
        ));
    }

    lines.push(rule);
    for (bucket, counters) in summary.stats.descriptive() {
        lines.push(format!("stats {}", bucket));
        for (counter, count) in counters {
            lines.push(format!("{}\t{}", counter, count));
        }
        lines.push("-".repeat(10));
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::NullSink;
    use crate::services::compare_service::Document;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_flags_override_config() {
        let temp_dir = TempDir::new().unwrap();
        let ids = temp_dir.path().join("ids.txt");
        fs::write(&ids, "TAGGER:1\n").unwrap();

        let config = CompareConfig {
            suffix: Some(".a1".to_string()),
            overlap: true,
            filtertypes: vec!["Wikipedia".to_string()],
            limit: Some(5),
            retype: vec![crate::models::RetypeConfig {
                from: "Gene".to_string(),
                to: "Chemical".to_string(),
                ids_file: temp_dir.path().join("missing.txt"),
            }],
            ..CompareConfig::default()
        };
        let args = CompareArgs {
            filtertypes: Some("Tissue,Disease".to_string()),
            limit: Some(2),
            maptypes: true,
            retype: Some(format!("A:B:{}", ids.display())),
            ..CompareArgs::default()
        };

        let options = args.options(config).unwrap();
        assert_eq!(options.suffix, ".a1");
        assert!(options.overlap);
        assert!(options.map_types);
        assert!(!options.force_map);
        assert_eq!(options.limit, Some(2));
        assert_eq!(options.filter_types.len(), 2);
        assert!(options.filter_types.contains("Disease"));
        assert_eq!(options.retype.len(), 1);
        assert_eq!(options.retype[0].from, "A");
    }

    #[test]
    fn test_render_report() {
        let options = CompareOptions::default();
        let mut sink = NullSink;
        let mut run = CompareRun::new(&options, &mut sink);
        run.compare_documents(
            &Document::new("a", "T1\tGene 0 5\tBRCA1\nT2\tDisease 10 15\ttumor\n"),
            &Document::new("b", "T1\tGene 0 5\tBRCA1\n"),
            "doc",
        )
        .unwrap();

        let report = render_report(&run.finish());
        let expected = [
            "-".repeat(78),
            "metrics Disease: f:0.00% (p:0.00% r:0.00%, tp:0 fp:0 fn:1)".to_string(),
            "metrics Gene: f:100.00% (p:100.00% r:100.00%, tp:1 fp:0 fn:0)".to_string(),
            "metrics total: f:66.67% (p:100.00% r:50.00%, tp:1 fp:0 fn:1)".to_string(),
            "-".repeat(78),
            "stats by type".to_string(),
            "matched Gene\t2".to_string(),
            "missed Disease\t1".to_string(),
            "-".repeat(10),
            "stats doc-level".to_string(),
            "TOTAL\t1".to_string(),
            "mismatch\t1".to_string(),
            "-".repeat(10),
        ]
        .join("\n")
            + "\n";
        assert_eq!(report, expected);
    }
}
