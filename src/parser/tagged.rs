//! Tagger TSV input: documents and the mentions found in them

use crate::services::taxonomy::TaxonomyNames;
use std::str::FromStr;

/// Errors in tagger input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("line {line} in {source_name}: expected {expected} fields, got {found}: {content}")]
    FieldCount {
        source_name: String,
        line: usize,
        expected: usize,
        found: usize,
        content: String,
    },

    #[error("line {line} in {source_name}: invalid {field} \"{value}\"")]
    InvalidNumber {
        source_name: String,
        line: usize,
        field: &'static str,
        value: String,
    },

    #[error("line {line} in {source_name}: unexpected tagger type {value}")]
    UnknownType {
        source_name: String,
        line: usize,
        value: i64,
    },

    #[error("text mismatch in {pmid}: \"{expected}\" vs \"{found}\"")]
    TextMismatch {
        pmid: String,
        expected: String,
        found: String,
    },
}

/// Tagger type codes for non-gene entities
///
/// Positive codes are NCBI taxonomy IDs of the organism a gene belongs to.
const TAGGER_TYPES: &[(i64, &str)] = &[
    (-1, "Chemical"),
    (-2, "Organism"),  // NCBI species taxonomy id (tagging species)
    (-3, "Organism"),  // NCBI species taxonomy id (tagging proteins)
    (-11, "Wikipedia"),
    (-21, "Biological_process"),
    (-22, "Cellular_component"),
    (-23, "Molecular_function"),
    (-24, "GO_other"),
    (-25, "Tissue"),
    (-26, "Disease"),
    (-27, "Environment"),
    (-28, "Phenotype"), // APO
    (-29, "Phenotype"), // FYPO
    (-30, "Phenotype"), // MPheno
    (-31, "Behaviour"),
    (-36, "Phenotype"), // mammalian phenotypes
];

/// Standoff type name and, for genes, the organism name
pub fn typename_and_species(code: i64, taxonomy: &TaxonomyNames) -> Option<(String, Option<String>)> {
    if code > 0 {
        return Some(("Gene".to_string(), Some(taxonomy.name(code).to_string())));
    }
    TAGGER_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (name.to_string(), None))
}

/// One line of the document TSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedDocument {
    pub id: String,
    /// `id` without its `PMID:` prefix; documents lacking it get no mentions
    pub pmid: Option<String>,
    pub authors: String,
    pub journal: String,
    pub year: String,
    pub title: String,
    pub abstract_text: String,
}

impl TaggedDocument {
    /// Title and abstract, the text mention offsets refer to
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.abstract_text)
    }

    pub fn from_tsv(line: &str, line_number: usize, source_name: &str) -> Result<Self, ConvertError> {
        let line = line.trim_end_matches('\n');
        let fields: Vec<&str> = line.split('\t').collect();
        let [id, authors, journal, year, title, abstract_text] = fields.as_slice() else {
            return Err(ConvertError::FieldCount {
                source_name: source_name.to_string(),
                line: line_number,
                expected: 6,
                found: fields.len(),
                content: line.to_string(),
            });
        };
        Ok(Self {
            id: id.to_string(),
            pmid: id.strip_prefix("PMID:").map(str::to_string),
            authors: authors.to_string(),
            journal: journal.to_string(),
            year: year.to_string(),
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
        })
    }
}

/// One line of the tag TSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub pmid: String,
    pub paragraph: u32,
    pub sentence: u32,
    pub start: usize,
    /// Exclusive; the input gives it inclusive
    pub end: usize,
    pub text: String,
    pub type_code: i64,
    pub serial: i64,
    pub typename: String,
    pub organism: Option<String>,
}

impl Mention {
    pub fn from_tsv(
        line: &str,
        line_number: usize,
        source_name: &str,
        taxonomy: &TaxonomyNames,
    ) -> Result<Self, ConvertError> {
        let line = line.trim_end_matches('\n');
        let fields: Vec<&str> = line.split('\t').collect();
        let [pmid, paragraph, sentence, start, end, text, type_code, serial] = fields.as_slice()
        else {
            return Err(ConvertError::FieldCount {
                source_name: source_name.to_string(),
                line: line_number,
                expected: 8,
                found: fields.len(),
                content: line.to_string(),
            });
        };

        let type_code: i64 = parse_field(type_code, "type", line_number, source_name)?;
        let (typename, organism) = typename_and_species(type_code, taxonomy).ok_or_else(|| {
            ConvertError::UnknownType {
                source_name: source_name.to_string(),
                line: line_number,
                value: type_code,
            }
        })?;

        let end = parse_field::<usize>(end, "end", line_number, source_name)?
            .checked_add(1)
            .ok_or_else(|| ConvertError::InvalidNumber {
                source_name: source_name.to_string(),
                line: line_number,
                field: "end",
                value: end.to_string(),
            })?;

        Ok(Self {
            pmid: pmid.to_string(),
            paragraph: parse_field(paragraph, "paragraph", line_number, source_name)?,
            sentence: parse_field(sentence, "sentence", line_number, source_name)?,
            start: parse_field(start, "start", line_number, source_name)?,
            end,
            text: text.to_string(),
            type_code,
            serial: parse_field(serial, "serial", line_number, source_name)?,
            typename,
            organism,
        })
    }

    /// Check the mention text against the document it was found in
    pub fn validate_text(&self, document_text: &str) -> Result<(), ConvertError> {
        let found: String = document_text
            .chars()
            .skip(self.start)
            .take(self.end.saturating_sub(self.start))
            .collect();
        if found != self.text {
            return Err(ConvertError::TextMismatch {
                pmid: self.pmid.clone(),
                expected: self.text.clone(),
                found,
            });
        }
        Ok(())
    }
}

fn parse_field<T: FromStr>(
    value: &str,
    field: &'static str,
    line: usize,
    source_name: &str,
) -> Result<T, ConvertError> {
    value.parse().map_err(|_| ConvertError::InvalidNumber {
        source_name: source_name.to_string(),
        line,
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_tsv() {
        let doc = TaggedDocument::from_tsv(
            "PMID:123\tSmith J\tNature\t2001\tBRCA1 study\tBRCA1 causes cancer.\n",
            1,
            "docs.tsv",
        )
        .unwrap();
        assert_eq!(doc.pmid.as_deref(), Some("123"));
        assert_eq!(doc.text(), "BRCA1 study\nBRCA1 causes cancer.");
    }

    #[test]
    fn test_document_without_pmid_prefix() {
        let doc = TaggedDocument::from_tsv("DOC7\ta\tj\t2001\tt\tx", 1, "docs.tsv").unwrap();
        assert_eq!(doc.pmid, None);
    }

    #[test]
    fn test_document_field_count() {
        let err = TaggedDocument::from_tsv("PMID:1\tonly\tthree", 4, "docs.tsv").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::FieldCount {
                line: 4,
                expected: 6,
                found: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_mention_end_becomes_exclusive() {
        let taxonomy = TaxonomyNames::builtin();
        let mention =
            Mention::from_tsv("123\t0\t1\t0\t4\tBRCA1\t9606\t18", 1, "tags.tsv", &taxonomy).unwrap();
        assert_eq!((mention.start, mention.end), (0, 5));
        assert_eq!(mention.typename, "Gene");
        assert_eq!(mention.organism.as_deref(), Some("Homo sapiens"));
        assert_eq!(mention.serial, 18);
    }

    #[test]
    fn test_mention_non_gene_types() {
        let taxonomy = TaxonomyNames::builtin();
        let mention =
            Mention::from_tsv("123\t1\t2\t6\t11\tcancer\t-26\t99\n", 1, "tags.tsv", &taxonomy)
                .unwrap();
        assert_eq!(mention.typename, "Disease");
        assert_eq!(mention.organism, None);
    }

    #[test]
    fn test_mention_unknown_type_and_bad_number() {
        let taxonomy = TaxonomyNames::builtin();
        assert!(matches!(
            Mention::from_tsv("1\t0\t0\t0\t1\tab\t-99\t1", 2, "tags.tsv", &taxonomy),
            Err(ConvertError::UnknownType { value: -99, .. })
        ));
        assert!(matches!(
            Mention::from_tsv("1\t0\t0\tx\t1\tab\t-1\t1", 2, "tags.tsv", &taxonomy),
            Err(ConvertError::InvalidNumber { field: "start", .. })
        ));
    }

    #[test]
    fn test_mention_inclusive_end_at_usize_max() {
        let taxonomy = TaxonomyNames::builtin();
        let line = format!("1\t0\t0\t0\t{}\tx\t-1\t1", usize::MAX);
        match Mention::from_tsv(&line, 3, "tags.tsv", &taxonomy) {
            Err(ConvertError::InvalidNumber {
                field: "end",
                line: 3,
                value,
                ..
            }) => assert_eq!(value, usize::MAX.to_string()),
            other => panic!("expected an invalid end offset, got {:?}", other),
        }
    }

    #[test]
    fn test_mention_validate_text() {
        let taxonomy = TaxonomyNames::builtin();
        let mention =
            Mention::from_tsv("1\t0\t0\t6\t11\tcancer\t-26\t1", 1, "tags.tsv", &taxonomy).unwrap();
        assert!(mention.validate_text("BRCA1 cancer").is_ok());
        assert!(matches!(
            mention.validate_text("BRCA1 tumors"),
            Err(ConvertError::TextMismatch { .. })
        ));
    }
}
