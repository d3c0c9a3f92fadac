use crate::error::{Error, Result};

/// A protein decoded from a single FASTA entry
#[derive(Debug, Clone, PartialEq)]
pub struct Protein {
    /// First token of the header, e.g. "sw|P12345|FOO_HUMAN"
    pub id: String,
    pub accession: String,
    pub description: String,
    pub sequence: String,
    pub score: f64,
}

impl Protein {
    pub fn new(id: &str, description: &str, sequence: &str) -> Self {
        Self {
            id: id.to_string(),
            accession: accession_from_id(id).to_string(),
            description: description.to_string(),
            sequence: sequence.to_string(),
            score: 0.0,
        }
    }

    /// Decode a FASTA entry: one `>` header line followed by sequence lines
    pub fn from_fasta(fasta: &str) -> Result<Self> {
        let mut lines = fasta.lines().skip_while(|l| l.trim().is_empty());

        let header = lines
            .next()
            .and_then(|l| l.strip_prefix('>'))
            .ok_or_else(|| Error::InvalidFasta(fasta.chars().take(40).collect()))?
            .trim();

        let (id, description) = match header.split_once(char::is_whitespace) {
            Some((id, description)) => (id, description.trim()),
            None => (header, ""),
        };

        let sequence: String = lines.flat_map(str::split_whitespace).collect();
        Ok(Self::new(id, description, &sequence))
    }

    pub fn header(&self) -> String {
        if self.description.is_empty() {
            format!(">{}", self.id)
        } else {
            format!(">{} {}", self.id, self.description)
        }
    }

    /// Render as FASTA, optionally wrapping the sequence every `line_width` residues
    pub fn to_fasta(&self, line_width: Option<usize>) -> String {
        let mut fasta = self.header();
        fasta.push('\n');

        match line_width {
            Some(width) if width > 0 && !self.sequence.is_empty() => {
                for chunk in self.sequence.as_bytes().chunks(width) {
                    fasta.push_str(&String::from_utf8_lossy(chunk));
                    fasta.push('\n');
                }
            }
            _ => {
                fasta.push_str(&self.sequence);
                fasta.push('\n');
            }
        }

        fasta
    }

    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    /// Append the header of `other` to this one, as done when identical sequences are merged
    pub fn merge_header(&mut self, other: &Protein, separator: &str) {
        let other_header = other.header();
        let other_header = other_header.trim_start_matches('>');
        if self.description.is_empty() {
            self.description = other_header.to_string();
        } else {
            self.description.push_str(separator);
            self.description.push_str(other_header);
        }
    }

    /// Keep only the first `length` residues
    pub fn truncate_n_terminal(&self, length: usize) -> Self {
        let mut truncated = self.clone();
        truncated.sequence = self.sequence.chars().take(length).collect();
        truncated
    }

    /// Keep only the last `length` residues
    pub fn truncate_c_terminal(&self, length: usize) -> Self {
        let mut truncated = self.clone();
        let skip = self.sequence.chars().count().saturating_sub(length);
        truncated.sequence = self.sequence.chars().skip(skip).collect();
        truncated
    }
}

/// "sw|P12345|FOO_HUMAN" -> "P12345", anything without pipes is used as is
fn accession_from_id(id: &str) -> &str {
    let mut parts = id.split('|');
    match (parts.next(), parts.next()) {
        (Some(_), Some(accession)) if !accession.is_empty() => accession,
        _ => id,
    }
}
