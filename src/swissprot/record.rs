use std::collections::HashMap;

/// The value stored under a key of a ParsedRecord
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The trimmed content of all lines of a field, joined by newlines
    Text(String),
    /// Every occurrence of a repeated subsection, in file order.
    /// Occurrences are addressed by their ordinal: "1", "2", ...
    Section(Vec<ParsedRecord>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&[ParsedRecord]> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::Section(occurrences) => Some(occurrences),
        }
    }

    /// The subsection occurrence with the given ordinal ("1" is the first one)
    pub fn occurrence(&self, ordinal: &str) -> Option<&ParsedRecord> {
        let index: usize = ordinal.parse().ok()?;
        self.as_section()?.get(index.checked_sub(1)?)
    }

    /// Iterate over (ordinal, occurrence) pairs of a subsection
    pub fn ordinals(&self) -> impl Iterator<Item = (String, &ParsedRecord)> + '_ {
        self.as_section()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(i, record)| ((i + 1).to_string(), record))
    }
}

/// A SwissProt record decoded into its fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRecord {
    fields: HashMap<String, FieldValue>,
}

impl ParsedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: FieldValue) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// The text of a plain field. Absent optional fields are stored as empty text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_text()
    }

    pub fn section(&self, key: &str) -> Option<&[ParsedRecord]> {
        self.get(key)?.as_section()
    }

    pub fn occurrence(&self, key: &str, ordinal: &str) -> Option<&ParsedRecord> {
        self.get(key)?.occurrence(ordinal)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(title: &str) -> ParsedRecord {
        let mut record = ParsedRecord::new();
        record.insert("RT", FieldValue::Text(title.to_string()));
        record
    }

    #[test]
    fn test_occurrence_by_ordinal() {
        let mut record = ParsedRecord::new();
        record.insert(
            "RN",
            FieldValue::Section(vec![reference("first"), reference("second")]),
        );

        assert_eq!(record.occurrence("RN", "1").unwrap().text("RT"), Some("first"));
        assert_eq!(record.occurrence("RN", "2").unwrap().text("RT"), Some("second"));
        assert!(record.occurrence("RN", "0").is_none());
        assert!(record.occurrence("RN", "3").is_none());
        assert!(record.occurrence("RN", "one").is_none());

        let ordinals: Vec<String> = record.get("RN").unwrap().ordinals().map(|(o, _)| o).collect();
        assert_eq!(ordinals, vec!["1", "2"]);
    }

    #[test]
    fn test_text_and_section_accessors() {
        let mut record = ParsedRecord::new();
        record.insert("ID", FieldValue::Text("FOO_HUMAN".to_string()));
        record.insert("RN", FieldValue::Section(Vec::new()));

        assert_eq!(record.text("ID"), Some("FOO_HUMAN"));
        assert_eq!(record.text("RN"), None);
        assert_eq!(record.section("RN").map(|s| s.len()), Some(0));
        assert!(record.section("ID").is_none());
        assert_eq!(record.len(), 2);
    }
}
