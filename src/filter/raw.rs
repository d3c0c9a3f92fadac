use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::filter::Filter;

lazy_static! {
    /// "OS=Homo sapiens OX=9606 GN=..." -> "Homo sapiens"
    static ref FASTA_ORGANISM: Regex = Regex::new(r"OS=(.+?)(?:\s+[A-Z]{2}=|$)").unwrap();
    /// "... [Homo sapiens]" -> "Homo sapiens"
    static ref FASTA_BRACKETS: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
}

/// Join the values of all lines of a raw SwissProt entry that carry `key`
fn swissprot_field(raw: &str, key: &str) -> String {
    raw.lines()
        .filter(|l| l.starts_with(key) && l.get(2..5) == Some("   "))
        .map(|l| l.get(5..).unwrap_or_default().trim())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Passes SwissProt entries whose organism (OS) contains the given text, ignoring case
#[derive(Debug, Clone)]
pub struct SwissProtTaxonomyFilter {
    taxonomy: String,
    inverted: bool,
}

impl SwissProtTaxonomyFilter {
    pub fn new(taxonomy: &str, inverted: bool) -> Self {
        Self {
            taxonomy: taxonomy.trim().to_lowercase(),
            inverted,
        }
    }
}

impl Filter<str> for SwissProtTaxonomyFilter {
    fn passes(&self, raw: &str) -> bool {
        let organism = swissprot_field(raw, "OS").to_lowercase();
        organism.contains(&self.taxonomy) ^ self.inverted
    }
}

/// Passes SwissProt entries that list the given keyword (KW), ignoring case
#[derive(Debug, Clone)]
pub struct SwissProtKeywordFilter {
    keyword: String,
    inverted: bool,
}

impl SwissProtKeywordFilter {
    pub fn new(keyword: &str, inverted: bool) -> Self {
        Self {
            keyword: keyword.trim().to_string(),
            inverted,
        }
    }
}

impl Filter<str> for SwissProtKeywordFilter {
    fn passes(&self, raw: &str) -> bool {
        let keywords = swissprot_field(raw, "KW");
        let found = keywords
            .split(';')
            .map(|k| k.trim().trim_end_matches('.'))
            .any(|k| k.eq_ignore_ascii_case(&self.keyword));
        found ^ self.inverted
    }
}

/// Passes FASTA entries whose header names an organism containing the given text,
/// either as UniProt style `OS=...` or as NCBI style `[...]`
#[derive(Debug, Clone)]
pub struct FastaTaxonomyFilter {
    taxonomy: String,
    inverted: bool,
}

impl FastaTaxonomyFilter {
    pub fn new(taxonomy: &str, inverted: bool) -> Self {
        Self {
            taxonomy: taxonomy.trim().to_lowercase(),
            inverted,
        }
    }

    fn matches_header(&self, header: &str) -> bool {
        FASTA_ORGANISM
            .captures_iter(header)
            .chain(FASTA_BRACKETS.captures_iter(header))
            .any(|c| c[1].to_lowercase().contains(&self.taxonomy))
    }
}

impl Filter<str> for FastaTaxonomyFilter {
    fn passes(&self, raw: &str) -> bool {
        let header = raw.lines().next().unwrap_or_default();
        self.matches_header(header) ^ self.inverted
    }
}

/// Passes entries of any format whose raw text matches a regular expression
#[derive(Debug, Clone)]
pub struct RawPatternFilter {
    pattern: Regex,
    inverted: bool,
}

impl RawPatternFilter {
    pub fn new(pattern: &str, inverted: bool) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidFilterArgument {
            name: "pattern".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern, inverted })
    }
}

impl Filter<str> for RawPatternFilter {
    fn passes(&self, raw: &str) -> bool {
        self.pattern.is_match(raw) ^ self.inverted
    }
}
