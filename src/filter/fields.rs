use regex::Regex;

use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::swissprot::record::ParsedRecord;

/// Passes parsed records whose text field `key` matches a regular expression.
/// Records without the field, or where it holds a subsection, never match.
#[derive(Debug, Clone)]
pub struct FieldPatternFilter {
    key: String,
    pattern: Regex,
    inverted: bool,
}

impl FieldPatternFilter {
    pub fn new(key: &str, pattern: &str, inverted: bool) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidFilterArgument {
            name: format!("field {key}"),
            reason: e.to_string(),
        })?;

        Ok(Self {
            key: key.to_string(),
            pattern,
            inverted,
        })
    }
}

impl Filter<ParsedRecord> for FieldPatternFilter {
    fn passes(&self, record: &ParsedRecord) -> bool {
        let matched = record
            .text(&self.key)
            .map_or(false, |value| self.pattern.is_match(value));
        matched ^ self.inverted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swissprot::record::FieldValue;

    fn record() -> ParsedRecord {
        let mut record = ParsedRecord::new();
        record.insert("OX", FieldValue::Text("NCBI_TaxID=9606;".to_string()));
        record.insert("RN", FieldValue::Section(Vec::new()));
        record
    }

    #[test]
    fn test_field_pattern() {
        assert!(FieldPatternFilter::new("OX", r"TaxID=9606\b", false).unwrap().passes(&record()));
        assert!(!FieldPatternFilter::new("OX", r"TaxID=10090\b", false).unwrap().passes(&record()));
        assert!(FieldPatternFilter::new("OX", r"TaxID=10090\b", true).unwrap().passes(&record()));
    }

    #[test]
    fn test_missing_or_section_field_never_matches() {
        assert!(!FieldPatternFilter::new("KW", ".*", false).unwrap().passes(&record()));
        assert!(!FieldPatternFilter::new("RN", ".*", false).unwrap().passes(&record()));
    }
}
