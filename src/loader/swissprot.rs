use std::sync::Arc;

use tracing::{trace, warn};

use crate::error::Result;
use crate::filter::Filter;
use crate::loader::{DbFormat, DbLoader, SourceSlot};
use crate::swissprot::fasta::render_fasta;
use crate::swissprot::grammar::GrammarTable;
use crate::swissprot::parser::RecordParser;
use crate::swissprot::record::ParsedRecord;

const ENTRY_START: &str = "ID   ";
const ENTRY_END: &str = "//";

/// Reads SwissProt flat files, where every entry starts with an `ID` line
/// and ends with a `//` line
#[derive(Default)]
pub struct SwissProtLoader {
    slot: SourceSlot,
    grammar: Option<Arc<GrammarTable>>,
    wrap: bool,
    strict: bool,
}

impl SwissProtLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader with the given grammar (the bundled one when None) and line wrapping
    pub fn configured(grammar: Option<Arc<GrammarTable>>, wrap: bool) -> Self {
        Self {
            grammar,
            wrap,
            ..Self::default()
        }
    }

    /// Wrap rendered FASTA sequences every 59 residues
    pub fn with_line_wrapping(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Parse with `grammar` instead of the bundled one
    pub fn with_grammar(mut self, grammar: Arc<GrammarTable>) -> Self {
        self.grammar = Some(grammar);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn line_wrapping(&self) -> bool {
        self.wrap
    }

    pub fn parser(&self) -> Result<RecordParser> {
        let grammar = match &self.grammar {
            Some(grammar) => Arc::clone(grammar),
            None => GrammarTable::shared_default()?,
        };
        Ok(RecordParser::new(grammar).strict(self.strict))
    }

    pub fn next_parsed_entry(&mut self) -> Result<Option<ParsedRecord>> {
        let parser = self.parser()?;
        match self.next_raw_entry()? {
            Some(raw) => parser.parse(&raw).map(Some),
            None => Ok(None),
        }
    }

    /// The next entry whose parsed form passes `filter`
    pub fn next_filtered_parsed_entry(
        &mut self,
        filter: &dyn Filter<ParsedRecord>,
    ) -> Result<Option<ParsedRecord>> {
        while let Some(record) = self.next_parsed_entry()? {
            if filter.passes(&record) {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

impl DbLoader for SwissProtLoader {
    fn db_name(&self) -> &'static str {
        "SwissProt"
    }

    fn format(&self) -> DbFormat {
        DbFormat::SwissProt
    }

    fn slot(&self) -> &SourceSlot {
        &self.slot
    }

    fn slot_mut(&mut self) -> &mut SourceSlot {
        &mut self.slot
    }

    fn next_raw_entry(&mut self) -> Result<Option<String>> {
        let source = self.slot.source_mut()?;
        let mut raw = String::new();

        while let Some(line) = source.next_line()? {
            if line.trim_start().starts_with(ENTRY_END) {
                if raw.is_empty() {
                    trace!("Skipping empty entry");
                    continue;
                }
                return Ok(Some(raw));
            }
            if raw.is_empty() && line.trim().is_empty() {
                continue;
            }
            raw.push_str(&line);
            raw.push('\n');
        }

        if raw.trim().is_empty() {
            return Ok(None);
        }

        warn!(
            path = %source.path().display(),
            "Last entry is not terminated by \"//\""
        );
        Ok(Some(raw))
    }

    fn raw_to_fasta(&self, raw: &str) -> Result<String> {
        let record = self.parser()?.parse(raw)?;
        render_fasta(&record, self.wrap)
    }

    fn is_entry_start(&self, line: &str) -> bool {
        line.starts_with(ENTRY_START)
    }
}
