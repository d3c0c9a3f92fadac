use strum_macros::{Display, EnumString};

/// Cleaves protein sequences into peptides
pub trait Enzyme: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the bond between `sequence[i]` and `sequence[i + 1]` is cut
    fn cleaves_after(&self, sequence: &[u8], i: usize) -> bool;

    /// All peptides of the complete digest with a length in `min_length..=max_length`
    fn digest<'a>(&self, sequence: &'a str, min_length: usize, max_length: usize) -> Vec<&'a str> {
        let mut result = Vec::new();
        let content = sequence.as_bytes();
        let length = content.len();
        let mut start = 0;

        for i in 0..length {
            if i + 1 < length && self.cleaves_after(content, i) {
                push_in_range(&mut result, &sequence[start..i + 1], min_length, max_length);
                start = i + 1;
            }
        }

        if start < length {
            push_in_range(&mut result, &sequence[start..], min_length, max_length);
        }

        result
    }
}

fn push_in_range<'a>(result: &mut Vec<&'a str>, peptide: &'a str, min_length: usize, max_length: usize) {
    if peptide.len() >= min_length && peptide.len() <= max_length {
        result.push(peptide);
    }
}

/// Cuts after K or R, unless the next residue is P
#[derive(Debug, Clone, Copy, Default)]
pub struct Trypsin;

impl Enzyme for Trypsin {
    fn name(&self) -> &str {
        "Trypsin"
    }

    fn cleaves_after(&self, sequence: &[u8], i: usize) -> bool {
        matches!(sequence[i], b'K' | b'R') && sequence.get(i + 1) != Some(&b'P')
    }
}

/// Cuts after F, W or Y, unless the next residue is P
#[derive(Debug, Clone, Copy, Default)]
pub struct Chymotrypsin;

impl Enzyme for Chymotrypsin {
    fn name(&self) -> &str {
        "Chymotrypsin"
    }

    fn cleaves_after(&self, sequence: &[u8], i: usize) -> bool {
        matches!(sequence[i], b'F' | b'W' | b'Y') && sequence.get(i + 1) != Some(&b'P')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, clap::ValueEnum)]
#[strum(ascii_case_insensitive)]
pub enum EnzymeKind {
    Trypsin,
    Chymotrypsin,
}

impl EnzymeKind {
    pub fn enzyme(&self) -> Box<dyn Enzyme> {
        match self {
            EnzymeKind::Trypsin => Box::new(Trypsin),
            EnzymeKind::Chymotrypsin => Box::new(Chymotrypsin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trypsin() {
        let peptides = Trypsin.digest("MKWVTFISLLFLFSSAYSRGVFRRDAHKPSEVAHR", 0, usize::MAX);
        assert_eq!(
            peptides,
            vec!["MK", "WVTFISLLFLFSSAYSR", "GVFR", "R", "DAHKPSEVAHR"]
        );
    }

    #[test]
    fn test_trypsin_length_bounds() {
        let peptides = Trypsin.digest("MKWVTFISLLFLFSSAYSRGVFRRDAHKPSEVAHR", 4, 12);
        assert_eq!(peptides, vec!["GVFR", "DAHKPSEVAHR"]);
    }

    #[test]
    fn test_trailing_cleavage_site() {
        assert_eq!(Trypsin.digest("AAKBBR", 0, 10), vec!["AAK", "BBR"]);
        assert!(Trypsin.digest("", 0, 10).is_empty());
    }

    #[test]
    fn test_chymotrypsin() {
        assert_eq!(
            EnzymeKind::Chymotrypsin.enzyme().digest("AFPGWKYL", 0, 10),
            vec!["AFPGW", "KY", "L"]
        );
    }
}
