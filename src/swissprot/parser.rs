use std::str::Lines;
use std::sync::Arc;

use tracing::trace;

use crate::error::{Error, Result};
use crate::swissprot::grammar::{FieldDescriptor, GrammarNode, GrammarTable};
use crate::swissprot::record::{FieldValue, ParsedRecord};

const END_OF_RECORD: &str = "<end of record>";

/// Forward cursor over the lines of one raw record, with room to push back a single line
pub struct RecordCursor<'a> {
    lines: Lines<'a>,
    pushed_back: Option<&'a str>,
}

impl<'a> RecordCursor<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            lines: raw.lines(),
            pushed_back: None,
        }
    }

    pub fn next_line(&mut self) -> Option<&'a str> {
        self.pushed_back.take().or_else(|| self.lines.next())
    }

    pub fn push_back(&mut self, line: &'a str) {
        debug_assert!(self.pushed_back.is_none(), "push_back called twice in a row");
        self.pushed_back = Some(line);
    }

    /// Look at the next line without consuming it
    pub fn peek(&mut self) -> Option<&'a str> {
        let line = self.next_line()?;
        self.push_back(line);
        Some(line)
    }

    /// Number of lines that were never read
    pub fn remaining(mut self) -> usize {
        usize::from(self.pushed_back.take().is_some()) + self.lines.count()
    }
}

/// Decodes raw SwissProt records according to a GrammarTable
#[derive(Debug, Clone)]
pub struct RecordParser {
    grammar: Arc<GrammarTable>,
    strict: bool,
}

impl RecordParser {
    pub fn new(grammar: Arc<GrammarTable>) -> Self {
        Self {
            grammar,
            strict: false,
        }
    }

    /// A parser using the grammar bundled with the crate
    pub fn with_default_grammar() -> Result<Self> {
        Ok(Self::new(GrammarTable::shared_default()?))
    }

    /// In strict mode, lines left over after the last grammar field are an error
    /// instead of being ignored
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn grammar(&self) -> &Arc<GrammarTable> {
        &self.grammar
    }

    pub fn parse(&self, raw: &str) -> Result<ParsedRecord> {
        let mut cursor = RecordCursor::new(raw);
        let mut record = ParsedRecord::new();

        parse_nodes(self.grammar.nodes(), &mut cursor, &mut record)?;

        let remaining = cursor.remaining();
        if remaining > 0 {
            if self.strict {
                return Err(Error::TrailingLines(remaining));
            }
            trace!(remaining, "Ignoring lines after the last grammar field");
        }

        Ok(record)
    }
}

fn parse_nodes(nodes: &[GrammarNode], cursor: &mut RecordCursor, target: &mut ParsedRecord) -> Result<()> {
    for node in nodes {
        match node {
            GrammarNode::Field(descriptor) => {
                let value = parse_field(descriptor, cursor)?;
                target.insert(&descriptor.key, FieldValue::Text(value));
            }
            GrammarNode::Subsection { key, children } => {
                let occurrences = parse_subsection(node.first_field(), children, cursor)?;
                target.insert(key, FieldValue::Section(occurrences));
            }
        }
    }

    Ok(())
}

/// Read all consecutive lines of a single field
fn parse_field(descriptor: &FieldDescriptor, cursor: &mut RecordCursor) -> Result<String> {
    let limit = descriptor.occurrence.limit();
    let mut value = String::new();
    let mut accepted = 0;

    while limit.map_or(true, |n| accepted < n) {
        let line = match cursor.next_line() {
            None => break,
            Some(line) => line,
        };

        if !descriptor.matches(line) {
            cursor.push_back(line);
            break;
        }

        if accepted > 0 {
            value.push('\n');
        }
        value.push_str(descriptor.value_of(line));
        accepted += 1;
    }

    if accepted == 0 && descriptor.occurrence.is_required() {
        let found = match cursor.peek() {
            Some(line) => line.chars().take(2).collect(),
            None => END_OF_RECORD.to_string(),
        };
        return Err(Error::Parse {
            expected: descriptor.key.clone(),
            found,
        });
    }

    Ok(value)
}

/// Read every occurrence of a subsection, as long as its first key shows up next
fn parse_subsection(
    first: &FieldDescriptor,
    children: &[GrammarNode],
    cursor: &mut RecordCursor,
) -> Result<Vec<ParsedRecord>> {
    let mut occurrences = Vec::new();

    while let Some(line) = cursor.peek() {
        if !first.matches(line) {
            break;
        }

        let mut occurrence = ParsedRecord::new();
        parse_nodes(children, cursor, &mut occurrence)?;
        occurrences.push(occurrence);
    }

    Ok(occurrences)
}
