use regex::Regex;

use crate::error::{Error, Result};
use crate::filter::Filter;
use crate::protein::Protein;

/// Passes proteins whose sequence matches a regular expression, e.g. "N[^P][ST]"
#[derive(Debug, Clone)]
pub struct SequencePatternFilter {
    pattern: Regex,
    inverted: bool,
}

impl SequencePatternFilter {
    pub fn new(pattern: &str, inverted: bool) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::InvalidFilterArgument {
            name: "sequence".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern, inverted })
    }
}

impl Filter<Protein> for SequencePatternFilter {
    fn passes(&self, protein: &Protein) -> bool {
        self.pattern.is_match(&protein.sequence) ^ self.inverted
    }
}

/// Passes proteins with a length in `min..=max`; without a maximum only `min` applies
#[derive(Debug, Clone)]
pub struct SequenceLengthFilter {
    min: usize,
    max: Option<usize>,
    inverted: bool,
}

impl SequenceLengthFilter {
    pub fn new(min: usize, max: Option<usize>, inverted: bool) -> Self {
        Self { min, max, inverted }
    }
}

impl Filter<Protein> for SequenceLengthFilter {
    fn passes(&self, protein: &Protein) -> bool {
        let length = protein.length();
        let in_range = length >= self.min && self.max.map_or(true, |max| length <= max);
        in_range ^ self.inverted
    }
}
