//! Per-record events raised while comparing a document pair

use crate::models::Textbound;
use colored::Colorize;
use std::fmt;

/// Text of the two records a type comparison was made for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPair<'a> {
    pub first: &'a str,
    pub second: &'a str,
}

impl TextPair<'_> {
    pub fn differs(&self) -> bool {
        self.first != self.second
    }
}

impl fmt::Display for TextPair<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.differs() {
            write!(f, "\"{}\"/\"{}\"", self.first, self.second)
        } else {
            write!(f, "\"{}\"", self.first)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum MatchEvent<'a> {
    /// Types judged equivalent
    TypeMatch {
        first_type: &'a str,
        second_type: &'a str,
        text: TextPair<'a>,
    },
    /// Types judged different
    TypeMismatch {
        first_type: &'a str,
        second_type: &'a str,
        text: TextPair<'a>,
    },
    /// Types matched on records whose texts differ
    OverlapMatch {
        first_type: &'a str,
        second_type: &'a str,
        text: TextPair<'a>,
    },
    /// Record about to be retyped; shows the record before the change
    Retyped {
        to: &'a str,
        textbound: &'a Textbound,
    },
    /// Reference record with at least one partner
    Matched {
        text: &'a str,
        first_type: &'a str,
        second_type: &'a str,
    },
    /// Reference record without a partner
    OnlyFirst { textbound: &'a Textbound },
    /// Unclaimed record of the second set
    OnlySecond { textbound: &'a Textbound },
    /// Heuristic document score
    Score { score: i64, label: &'a str },
}

impl fmt::Display for MatchEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchEvent::TypeMatch {
                first_type,
                second_type,
                text,
            } => write!(f, "type match: \"{}\" vs \"{}\" ({})", first_type, second_type, text),
            MatchEvent::TypeMismatch {
                first_type,
                second_type,
                text,
            } => write!(f, "TYPE MISMATCH: \"{}\" vs \"{}\" ({})", first_type, second_type, text),
            MatchEvent::OverlapMatch {
                first_type,
                second_type,
                text,
            } => write!(f, "OVERLAP-MATCH: \"{}\" vs \"{}\" ({})", first_type, second_type, text),
            MatchEvent::Retyped { to, textbound } => {
                write!(f, "NOTE: Retype to {}: {}", to, textbound)
            }
            MatchEvent::Matched {
                text,
                first_type,
                second_type,
            } => write!(f, "MATCH: \"{}\" ({}/{})", text, first_type, second_type),
            MatchEvent::OnlyFirst { textbound } => {
                write!(f, "ONLY1: \"{}\" ({})", textbound.text, textbound.entity_type)
            }
            MatchEvent::OnlySecond { textbound } => {
                write!(f, "ONLY2: \"{}\" ({})", textbound.text, textbound.entity_type)
            }
            MatchEvent::Score { score, label } => write!(f, "SCORE {}\t{}", score, label),
        }
    }
}

/// Receiver for match events
pub trait MatchSink {
    fn event(&mut self, event: MatchEvent<'_>);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl MatchSink for NullSink {
    fn event(&mut self, _event: MatchEvent<'_>) {}
}

/// Keeps the rendered event lines
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub lines: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.lines.iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl MatchSink for RecordingSink {
    fn event(&mut self, event: MatchEvent<'_>) {
        self.lines.push(event.to_string());
    }
}

/// Prints events to stdout, coloured by outcome
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl MatchSink for ConsoleSink {
    fn event(&mut self, event: MatchEvent<'_>) {
        let line = event.to_string();
        match event {
            MatchEvent::TypeMatch { .. } => println!("{}", line.bright_black()),
            MatchEvent::TypeMismatch { .. } => println!("{}", line.yellow()),
            MatchEvent::OverlapMatch { .. } => println!("{}", line.cyan()),
            MatchEvent::Retyped { .. } => println!("{}", line.blue()),
            MatchEvent::Matched { .. } => println!("{}", line.green()),
            MatchEvent::OnlyFirst { .. } | MatchEvent::OnlySecond { .. } => {
                println!("{}", line.red())
            }
            MatchEvent::Score { score, .. } if score < 0 => println!("{}", line.red().bold()),
            MatchEvent::Score { .. } => println!("{}", line.green().bold()),
        }
    }
}
