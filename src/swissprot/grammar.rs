use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use tracing::debug;

use crate::error::{Error, Result};

/// Every SwissProt line starts with a key field of this width ("ID   ", "AC   ", ...)
pub const KEY_FIELD_WIDTH: usize = "ID   ".len();

/// Line code of the sequence data lines, which consists of two blanks
pub const SEQUENCE_DATA_KEY: &str = "  ";

const DEFAULT_GRAMMAR_SOURCE: &str = include_str!("../../resources/swissprot.grammar");

lazy_static! {
    static ref DEFAULT_GRAMMAR: std::result::Result<Arc<GrammarTable>, String> =
        GrammarTable::parse(DEFAULT_GRAMMAR_SOURCE)
            .map(Arc::new)
            .map_err(|e| match e {
                Error::Config(msg) => msg,
                other => other.to_string(),
            });
}

/// How many lines a field may span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// Exactly this many lines (always > 0)
    Exactly(usize),
    ZeroOrMore,
    OneOrMore,
}

impl Occurrence {
    /// Decode the numeric code used in the grammar resource
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            -1 => Some(Occurrence::OneOrMore),
            0 => Some(Occurrence::ZeroOrMore),
            n if n > 0 => Some(Occurrence::Exactly(n as usize)),
            _ => None,
        }
    }

    /// Whether at least one line must be present
    pub fn is_required(&self) -> bool {
        !matches!(self, Occurrence::ZeroOrMore)
    }

    /// The maximum amount of lines, if there is one
    pub fn limit(&self) -> Option<usize> {
        match self {
            Occurrence::Exactly(n) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: String,
    pub occurrence: Occurrence,
    /// Number of subsections opened on this key
    pub opens: usize,
    /// Number of subsections closed after this key
    pub closes: usize,
}

impl FieldDescriptor {
    pub fn new(key: &str, occurrence: Occurrence) -> Self {
        Self {
            key: key.to_string(),
            occurrence,
            opens: 0,
            closes: 0,
        }
    }

    pub fn opens_subsection(&self) -> bool {
        self.opens > 0
    }

    pub fn closes_subsection(&self) -> bool {
        self.closes > 0
    }

    /// Whether the key field of `line` holds this key
    pub fn matches(&self, line: &str) -> bool {
        let key = self.key.as_bytes();
        let line = line.as_bytes();

        if !line.starts_with(key) {
            return false;
        }

        let padding_end = line.len().min(KEY_FIELD_WIDTH);
        line[key.len()..padding_end].iter().all(|b| *b == b' ')
    }

    /// The content of a matching line after its key field
    pub fn value_of<'a>(&self, line: &'a str) -> &'a str {
        line.get(KEY_FIELD_WIDTH..).unwrap_or("").trim()
    }
}

/// A grammar entry, with subsections already resolved into their children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarNode {
    Field(FieldDescriptor),
    Subsection {
        key: String,
        children: Vec<GrammarNode>,
    },
}

impl GrammarNode {
    /// The first plain field that has to be read for this node
    pub fn first_field(&self) -> &FieldDescriptor {
        match self {
            GrammarNode::Field(descriptor) => descriptor,
            // Subsections are built from at least their opening descriptor
            GrammarNode::Subsection { children, .. } => children[0].first_field(),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            GrammarNode::Field(descriptor) => &descriptor.key,
            GrammarNode::Subsection { key, .. } => key,
        }
    }
}

/// The ordered field layout of a SwissProt record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarTable {
    descriptors: Vec<FieldDescriptor>,
    nodes: Vec<GrammarNode>,
}

impl GrammarTable {
    /// The grammar bundled with the crate. It is parsed on first use and shared afterwards;
    /// when parsing failed, every call reports the same configuration error.
    pub fn shared_default() -> Result<Arc<GrammarTable>> {
        match &*DEFAULT_GRAMMAR {
            Ok(grammar) => Ok(Arc::clone(grammar)),
            Err(msg) => Err(Error::Config(msg.clone())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "unable to read grammar \"{}\": {}",
                path.display(),
                e
            ))
        })?;
        let grammar = Self::parse(&text)?;
        debug!(path = %path.display(), fields = grammar.descriptors.len(), "Loaded grammar");
        Ok(grammar)
    }

    /// Parse a grammar resource: one `KEY,code` descriptor per line,
    /// optionally prefixed by `[` and suffixed by `]`
    pub fn parse(text: &str) -> Result<Self> {
        let mut descriptors = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            descriptors.push(parse_descriptor(idx + 1, line)?);
        }

        Self::from_descriptors(descriptors)
    }

    pub fn from_descriptors(descriptors: Vec<FieldDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            return Err(Error::Config("grammar does not contain any fields".to_string()));
        }

        let nodes = build_nodes(&descriptors)?;
        Ok(Self { descriptors, nodes })
    }

    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    pub fn nodes(&self) -> &[GrammarNode] {
        &self.nodes
    }
}

fn parse_descriptor(line_number: usize, line: &str) -> Result<FieldDescriptor> {
    let malformed = |reason: &str| {
        Error::Config(format!(
            "grammar line {line_number} (\"{line}\"): {reason}"
        ))
    };

    // Leading blanks are part of the key (the sequence data key is two blanks),
    // unless the line opens a subsection
    let mut body = line.trim_end();
    let mut opens = 0;
    if body.trim_start().starts_with('[') {
        body = body.trim_start();
        while let Some(rest) = body.strip_prefix('[') {
            opens += 1;
            body = rest;
        }
    }

    let mut closes = 0;
    while let Some(rest) = body.strip_suffix(']') {
        closes += 1;
        body = rest.trim_end();
    }

    let (key, code) = body
        .rsplit_once(',')
        .ok_or_else(|| malformed("expected KEY,occurrence"))?;

    if key.is_empty() || key.len() > KEY_FIELD_WIDTH || key.contains(['[', ']']) {
        return Err(malformed("key must be 1 to 5 characters long"));
    }

    let code: i64 = code
        .trim()
        .parse()
        .map_err(|_| malformed("occurrence is not a number"))?;
    let occurrence = Occurrence::from_code(code)
        .ok_or_else(|| malformed("occurrence must be -1, 0 or a positive number"))?;

    Ok(FieldDescriptor {
        key: key.to_string(),
        occurrence,
        opens,
        closes,
    })
}

/// Group the flat descriptor list into subsections by counting brackets
fn build_nodes(descriptors: &[FieldDescriptor]) -> Result<Vec<GrammarNode>> {
    let mut root = Vec::new();
    let mut open: Vec<(String, Vec<GrammarNode>)> = Vec::new();

    for descriptor in descriptors {
        for _ in 0..descriptor.opens {
            open.push((descriptor.key.clone(), Vec::new()));
        }

        let target = match open.last_mut() {
            Some((_, children)) => children,
            None => &mut root,
        };
        target.push(GrammarNode::Field(descriptor.clone()));

        for _ in 0..descriptor.closes {
            let (key, children) = open.pop().ok_or_else(|| {
                Error::Config(format!(
                    "field '{}' closes a subsection that was never opened",
                    descriptor.key
                ))
            })?;

            let target = match open.last_mut() {
                Some((_, children)) => children,
                None => &mut root,
            };
            target.push(GrammarNode::Subsection { key, children });
        }
    }

    if let Some((key, _)) = open.last() {
        return Err(Error::Config(format!("subsection '{key}' is never closed")));
    }

    Ok(root)
}
