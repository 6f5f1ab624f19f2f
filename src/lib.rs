// standoff-compare - agreement metrics for standoff entity annotations
// Scores one annotation set against a reference by precision, recall and F1

pub mod cli;
pub mod compare;
pub mod models;
pub mod parser;
pub mod services;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use compare::{compare_annotations, DocumentOutcome, MatchSink, Verdict};
pub use models::{CompareOptions, Diagnostics, FormatError, Normalization, Stats, Textbound};
pub use parser::parse_standoff;
pub use services::{CompareRun, RunSummary};
