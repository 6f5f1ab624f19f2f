use crate::models::{
    DiagnosticKind, Diagnostics, FormatError, Normalization, RecordError, Textbound,
};
use std::collections::HashMap;

/// Source name used when annotations do not come from a named file
pub const DEFAULT_SOURCE: &str = "<INPUT>";

/// Parse one document's standoff annotations
///
/// Returns the textbounds in input order with their normalizations attached.
/// Blank lines are ignored and lines of unsupported annotation kinds
/// (relations, events, attributes, notes) are skipped with a diagnostic. A
/// malformed `T` or `N` line aborts the whole document.
pub fn parse_standoff(
    content: &str,
    source_name: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Textbound>, FormatError> {
    let mut textbounds = Vec::new();
    let mut normalizations = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let located = |reason: RecordError| FormatError::new(source_name, line_number, line, reason);

        if line.trim().is_empty() {
            continue;
        } else if line.starts_with('T') {
            textbounds.push(Textbound::from_standoff(line, diagnostics).map_err(located)?);
        } else if line.starts_with('N') {
            normalizations.push(Normalization::from_standoff(line).map_err(located)?);
        } else {
            diagnostics.warn(
                DiagnosticKind::UnsupportedLine,
                format!("skipping line {} in {}: {}", line_number, source_name, line),
            );
        }
    }

    attach_normalizations(&mut textbounds, normalizations, diagnostics);
    Ok(textbounds)
}

/// Attach each normalization to the textbound it names
///
/// With duplicate textbound IDs the last one wins.
fn attach_normalizations(
    textbounds: &mut [Textbound],
    normalizations: Vec<Normalization>,
    diagnostics: &mut Diagnostics,
) {
    let by_id: HashMap<String, usize> = textbounds
        .iter()
        .enumerate()
        .map(|(index, tb)| (tb.id.clone(), index))
        .collect();

    for norm in normalizations {
        match by_id.get(&norm.tb_id) {
            Some(&index) => textbounds[index].normalizations.push(norm),
            None => diagnostics.error(
                DiagnosticKind::UnlinkedNormalization,
                format!("skip normalization for unknown textbound: {}", norm),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "T1\tGene 0 5\tBRCA1\n\
                            T2\tDisease 21 34\tbreast cancer\n\
                            N1\tReference T1 TAGGER:672\tBRCA1\n\
                            N2\tReference T2 DOID:1612\tbreast cancer\n\
                            N3\tReference T1 HGNC:1100\tBRCA1\n";

    #[test]
    fn test_parse_and_link() {
        let mut diagnostics = Diagnostics::new();
        let textbounds = parse_standoff(DOCUMENT, "doc.ann", &mut diagnostics).unwrap();

        assert_eq!(textbounds.len(), 2);
        assert_eq!(textbounds[0].id, "T1");
        assert_eq!(textbounds[1].id, "T2");
        let t1_norms: Vec<&str> = textbounds[0]
            .normalizations
            .iter()
            .map(|n| n.norm_id.as_str())
            .collect();
        assert_eq!(t1_norms, vec!["TAGGER:672", "HGNC:1100"]);
        assert_eq!(textbounds[1].normalizations.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let mut diagnostics = Diagnostics::new();
        let textbounds =
            parse_standoff("\n   \nT1\tGene 0 5\tBRCA1\n\n", DEFAULT_SOURCE, &mut diagnostics)
                .unwrap();
        assert_eq!(textbounds.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unsupported_lines_are_skipped() {
        let mut diagnostics = Diagnostics::new();
        let content = "T1\tGene 0 5\tBRCA1\nR1\tBinds Arg1:T1 Arg2:T1\t\n#1\tAnnotatorNotes T1\tcheck\n";
        let textbounds = parse_standoff(content, "doc.ann", &mut diagnostics).unwrap();

        assert_eq!(textbounds.len(), 1);
        assert_eq!(diagnostics.count(DiagnosticKind::UnsupportedLine), 2);
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("skipping line 2 in doc.ann")));
    }

    #[test]
    fn test_unknown_textbound_reference_is_dropped() {
        let mut diagnostics = Diagnostics::new();
        let content = "T1\tGene 0 5\tBRCA1\nN1\tReference T9 TAGGER:1\tx\nN2\tReference T1 TAGGER:2\ty\n";
        let textbounds = parse_standoff(content, "doc.ann", &mut diagnostics).unwrap();

        assert_eq!(textbounds[0].normalizations.len(), 1);
        assert_eq!(textbounds[0].normalizations[0].id, "N2");
        assert_eq!(diagnostics.count(DiagnosticKind::UnlinkedNormalization), 1);
    }

    #[test]
    fn test_malformed_line_reports_location() {
        let mut diagnostics = Diagnostics::new();
        let content = "T1\tGene 0 5\tBRCA1\nT2\tGene 7 x\tTP53\n";
        let err = parse_standoff(content, "set2/doc.ann", &mut diagnostics).unwrap_err();

        assert_eq!(err.source_name, "set2/doc.ann");
        assert_eq!(err.line, 2);
        assert_eq!(err.content, "T2\tGene 7 x\tTP53");
        assert_eq!(err.reason, RecordError::InvalidOffset("x".to_string()));
    }

    #[test]
    fn test_malformed_normalization_aborts() {
        let mut diagnostics = Diagnostics::new();
        let content = "T1\tGene 0 5\tBRCA1\nN1\tReference T1\tBRCA1\n";
        let err = parse_standoff(content, "doc.ann", &mut diagnostics).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.reason, RecordError::TokenCount { .. }));
    }

    #[test]
    fn test_empty_document() {
        let mut diagnostics = Diagnostics::new();
        assert!(parse_standoff("", "empty.ann", &mut diagnostics)
            .unwrap()
            .is_empty());
    }
}
