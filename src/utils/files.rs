use std::fs::{File, OpenOptions};
use std::io::{stdout, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Create a BufReader that reads from a file denoted by its PathBuf
pub fn open_read(pb: &PathBuf) -> Result<BufReader<File>> {
    let file = OpenOptions::new()
        .read(true)
        .open(pb)
        .with_context(|| format!("Failed to open file \"{}\" for reading", pb.display()))?;
    Ok(BufReader::new(file))
}

/// Create a BufWriter that writes to a file denoted by its PathBuf,
/// truncating whatever was there before
pub fn open_write(pb: &PathBuf) -> Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(pb)
        .with_context(|| format!("Failed to open file \"{}\" for writing", pb.display()))?;
    Ok(BufWriter::new(file))
}

/// Write to the given file, or to StdOut when no file is given
pub fn open_output(pb: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match pb {
        Some(pb) => Box::new(open_write(pb)?),
        None => Box::new(BufWriter::new(stdout())),
    })
}

/// Read all non-blank lines of a file, trimmed
pub fn read_trimmed_lines(pb: &PathBuf) -> Result<Vec<String>> {
    let reader = open_read(pb)?;
    let mut lines = Vec::new();

    for line in reader.lines() {
        let line = line.with_context(|| format!("Error reading line from \"{}\"", pb.display()))?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_write_then_read_lines() {
        let dir = tempfile::tempdir().unwrap();
        let pb = dir.path().join("peptides.txt");

        {
            let mut writer = open_write(&pb).unwrap();
            writeln!(writer, "PEPTIDE\n\n  LESK  ").unwrap();
        }

        let got = read_trimmed_lines(&pb).unwrap();
        assert_eq!(got, vec!["PEPTIDE".to_string(), "LESK".to_string()]);
    }

    #[test]
    fn test_open_read_missing_file() {
        let pb = PathBuf::from("/definitely/not/here.fasta");
        assert!(open_read(&pb).is_err());
    }
}
