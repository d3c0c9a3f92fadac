use crate::error::{Error, Result};
use crate::swissprot::grammar::SEQUENCE_DATA_KEY;
use crate::swissprot::record::ParsedRecord;

pub const IDENTIFIER_KEY: &str = "ID";
pub const ACCESSION_KEY: &str = "AC";
pub const DESCRIPTION_KEY: &str = "DE";

/// Residues per line when wrapping is requested
pub const FASTA_LINE_WIDTH: usize = 59;

const RECOMMENDED_NAME_PREFIX: &str = "RecName: Full=";

/// Render a parsed SwissProt record as a single FASTA entry:
/// `>sw|ACCESSION|ENTRY_NAME DESCRIPTION` followed by the sequence
pub fn render_fasta(record: &ParsedRecord, wrap: bool) -> Result<String> {
    let accession = primary_accession(record)?;
    let entry_name = entry_name(record)?;
    let description = description(record);
    let sequence = sequence(record)?;

    let mut fasta = String::with_capacity(
        accession.len() + entry_name.len() + description.len() + sequence.len() * 2 + 8,
    );
    fasta.push_str(">sw|");
    fasta.push_str(accession);
    fasta.push('|');
    fasta.push_str(entry_name);
    fasta.push(' ');
    fasta.push_str(&description);
    fasta.push('\n');

    if wrap {
        push_wrapped(&mut fasta, &sequence, FASTA_LINE_WIDTH);
    } else {
        fasta.push_str(&sequence);
        fasta.push('\n');
    }

    Ok(fasta)
}

/// The first accession number of the AC field
pub fn primary_accession(record: &ParsedRecord) -> Result<&str> {
    let ac = required_text(record, ACCESSION_KEY)?;
    Ok(ac.split(';').next().unwrap_or_default().trim())
}

/// The first token of the ID field
pub fn entry_name(record: &ParsedRecord) -> Result<&str> {
    let id = required_text(record, IDENTIFIER_KEY)?;
    Ok(id.split_whitespace().next().unwrap_or_default())
}

/// The DE field, reduced to the recommended full name for records that use one
pub fn description(record: &ParsedRecord) -> String {
    let de = record.text(DESCRIPTION_KEY).unwrap_or_default();

    match de.strip_prefix(RECOMMENDED_NAME_PREFIX) {
        Some(rest) => rest.split(';').next().unwrap_or_default().to_string(),
        None => de.lines().map(str::trim).collect::<Vec<&str>>().join(" "),
    }
}

/// All residues of the sequence data lines without any whitespace
pub fn sequence(record: &ParsedRecord) -> Result<String> {
    let data = record
        .text(SEQUENCE_DATA_KEY)
        .ok_or_else(|| Error::MissingField(SEQUENCE_DATA_KEY.to_string()))?;
    Ok(data.split_whitespace().collect())
}

fn required_text<'a>(record: &'a ParsedRecord, key: &str) -> Result<&'a str> {
    record
        .text(key)
        .ok_or_else(|| Error::MissingField(key.to_string()))
}

fn push_wrapped(target: &mut String, sequence: &str, width: usize) {
    // Residues are ASCII, so chunking the bytes never splits a character
    for chunk in sequence.as_bytes().chunks(width) {
        target.push_str(&String::from_utf8_lossy(chunk));
        target.push('\n');
    }
    if sequence.is_empty() {
        target.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swissprot::parser::RecordParser;
    use crate::swissprot::record::FieldValue;

    const FOO_HUMAN: &str = "ID   FOO_HUMAN   STANDARD\nAC   P12345; Q99999;\nDE   RecName: Full=Test protein;\nSQ   SEQUENCE   10 AA\n     ABCDE FGHIJ\n";

    fn parse(raw: &str) -> ParsedRecord {
        RecordParser::with_default_grammar().unwrap().parse(raw).unwrap()
    }

    #[test]
    fn test_render_foo_human() {
        let got = render_fasta(&parse(FOO_HUMAN), false).unwrap();
        assert_eq!(got, ">sw|P12345|FOO_HUMAN Test protein\nABCDEFGHIJ\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let record = parse(FOO_HUMAN);
        assert_eq!(
            render_fasta(&record, true).unwrap(),
            render_fasta(&record, true).unwrap()
        );
    }

    #[test]
    fn test_blank_sequence_lines_are_ignored() {
        let mut record = parse(FOO_HUMAN);
        record.insert(
            SEQUENCE_DATA_KEY,
            FieldValue::Text("\n\nABCDE FGHIJ\n\n".to_string()),
        );
        assert_eq!(
            render_fasta(&record, false).unwrap(),
            ">sw|P12345|FOO_HUMAN Test protein\nABCDEFGHIJ\n"
        );
    }

    #[test]
    fn test_old_style_description() {
        let raw = FOO_HUMAN.replace(
            "DE   RecName: Full=Test protein;",
            "DE   Test protein precursor (EC 1.2.3.4)\nDE   (Fragment).",
        );
        let got = render_fasta(&parse(&raw), false).unwrap();
        assert_eq!(
            got,
            ">sw|P12345|FOO_HUMAN Test protein precursor (EC 1.2.3.4) (Fragment).\nABCDEFGHIJ\n"
        );
    }

    #[test]
    fn test_wrapped_sequence() {
        let residues: String = "ACDEFGHIKLMNPQRSTVWY".repeat(6);
        let lines: Vec<String> = residues
            .as_bytes()
            .chunks(10)
            .map(|c| format!("     {}", String::from_utf8_lossy(c)))
            .collect();
        let raw = FOO_HUMAN.replace("     ABCDE FGHIJ", &lines.join("\n"));

        let got = render_fasta(&parse(&raw), true).unwrap();
        let body: Vec<&str> = got.lines().skip(1).collect();

        assert_eq!(body.len(), 3);
        assert_eq!(body[0].len(), FASTA_LINE_WIDTH);
        assert_eq!(body[1].len(), FASTA_LINE_WIDTH);
        assert_eq!(body[2].len(), 120 - 2 * FASTA_LINE_WIDTH);
        assert_eq!(body.concat(), residues);
        assert!(got.ends_with('\n'));
    }

    #[test]
    fn test_missing_accession() {
        let record = ParsedRecord::new();
        assert!(matches!(render_fasta(&record, false), Err(Error::MissingField(_))));
    }
}
