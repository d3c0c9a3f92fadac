use tracing::trace;

use crate::error::Result;
use crate::loader::{DbFormat, DbLoader, SourceSlot};

const HEADER_START: char = '>';

/// Reads FASTA files; an entry runs from one `>` header line up to the next
#[derive(Default)]
pub struct FastaLoader {
    slot: SourceSlot,
}

impl FastaLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DbLoader for FastaLoader {
    fn db_name(&self) -> &'static str {
        "FASTA"
    }

    fn format(&self) -> DbFormat {
        DbFormat::Fasta
    }

    fn slot(&self) -> &SourceSlot {
        &self.slot
    }

    fn slot_mut(&mut self) -> &mut SourceSlot {
        &mut self.slot
    }

    fn next_raw_entry(&mut self) -> Result<Option<String>> {
        let source = self.slot.source_mut()?;

        // Anything in front of the first header is not part of an entry
        let header = loop {
            match source.next_line()? {
                Some(line) if line.starts_with(HEADER_START) => break line,
                Some(line) => {
                    if !line.trim().is_empty() {
                        trace!(line = %line, "Skipping line outside of an entry");
                    }
                }
                None => return Ok(None),
            }
        };

        let mut raw = header;
        raw.push('\n');

        while let Some(line) = source.next_line()? {
            if line.starts_with(HEADER_START) {
                // The next header belongs to the next entry
                source.push_back(line);
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            raw.push_str(&line);
            raw.push('\n');
        }

        Ok(Some(raw))
    }

    fn raw_to_fasta(&self, raw: &str) -> Result<String> {
        Ok(raw.to_string())
    }

    fn is_entry_start(&self, line: &str) -> bool {
        line.starts_with(HEADER_START)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::filter::raw::FastaTaxonomyFilter;
    use crate::loader::EntryCount;

    const DATABASE: &str = "\
; a comment before the first entry
>sp|P12345|FOO_HUMAN Test protein OS=Homo sapiens OX=9606
ABCDE
FGHIJ

>sp|P54321|BAR_MOUSE Other protein OS=Mus musculus OX=10090
MKLVA
>sp|Q11111|BAZ_HUMAN Third protein OS=Homo sapiens OX=9606
MMMM";

    fn loaded() -> (NamedTempFile, FastaLoader) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DATABASE.as_bytes()).unwrap();
        let mut loader = FastaLoader::new();
        loader.load(file.path()).unwrap();
        (file, loader)
    }

    #[test]
    fn test_raw_entries() {
        let (_file, mut loader) = loaded();

        assert_eq!(
            loader.next_raw_entry().unwrap().unwrap(),
            ">sp|P12345|FOO_HUMAN Test protein OS=Homo sapiens OX=9606\nABCDE\nFGHIJ\n"
        );
        assert_eq!(
            loader.next_fasta_entry().unwrap().unwrap(),
            ">sp|P54321|BAR_MOUSE Other protein OS=Mus musculus OX=10090\nMKLVA\n"
        );
        let last = loader.next_protein().unwrap().unwrap();
        assert_eq!(last.accession, "Q11111");
        assert_eq!(last.sequence, "MMMM");
        assert!(loader.next_raw_entry().unwrap().is_none());
    }

    #[test]
    fn test_count_and_reset() {
        let (_file, mut loader) = loaded();
        loader.next_raw_entry().unwrap();
        assert_eq!(loader.count_entries().unwrap(), EntryCount::Counted(3));

        let first = loader.next_raw_entry().unwrap();
        // Reading the first entry leaves the second header in the lookahead
        loader.reset().unwrap();
        loader.reset().unwrap();
        assert_eq!(loader.next_raw_entry().unwrap(), first);
    }

    #[test]
    fn test_filtered_entries() {
        let (_file, mut loader) = loaded();
        let human = FastaTaxonomyFilter::new("Homo sapiens", false);

        let mut accessions = Vec::new();
        while let Some(protein) = loader.next_filtered_protein(&human).unwrap() {
            accessions.push(protein.accession);
        }
        assert_eq!(accessions, vec!["P12345", "Q11111"]);
    }

    #[test]
    fn test_can_read_file() {
        let (file, loader) = loaded();
        // The comment line is the first non-blank line
        assert!(!loader.can_read_file(file.path()));

        let mut plain = NamedTempFile::new().unwrap();
        plain.write_all(b"\n\n>P1\nMKL\n").unwrap();
        assert!(loader.can_read_file(plain.path()));
    }
}
