//! Streaming access to whole database files, one entry at a time.
//!
//! Every format implements `DbLoader` on top of a `SourceSlot`, which owns the
//! `LineSource` and enforces the `Unloaded -> Loaded -> Closed` life cycle.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use strum_macros::{Display, EnumString};
use tracing::{debug, trace};

use crate::error::Result;
use crate::filter::Filter;
use crate::protein::Protein;
use crate::utils::line_source::{LineSource, Progress};

pub mod detect;
pub mod fasta;
pub mod source_slot;
pub mod swissprot;

pub use detect::{detect, LoaderRegistry};
pub use fasta::FastaLoader;
pub use source_slot::SourceSlot;
pub use swissprot::SwissProtLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DbFormat {
    #[strum(to_string = "SwissProt")]
    SwissProt,
    #[strum(to_string = "FASTA")]
    Fasta,
}

/// Cooperative cancellation for long scans, checked once per line
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Outcome of `DbLoader::count_entries`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryCount {
    Counted(u64),
    Cancelled,
}

pub trait DbLoader: Send {
    fn db_name(&self) -> &'static str;

    fn format(&self) -> DbFormat;

    fn slot(&self) -> &SourceSlot;

    fn slot_mut(&mut self) -> &mut SourceSlot;

    /// The raw text of the next entry, or None once the file is exhausted
    fn next_raw_entry(&mut self) -> Result<Option<String>>;

    fn raw_to_fasta(&self, raw: &str) -> Result<String>;

    /// Whether `line` marks the start of an entry in this format
    fn is_entry_start(&self, line: &str) -> bool;

    /// Bind to `path`, discarding whatever was loaded before
    fn load(&mut self, path: &Path) -> Result<()> {
        self.slot_mut().load(path)
    }

    /// Sniff the first non-blank line of `path` with a throwaway reader
    fn can_read_file(&self, path: &Path) -> bool {
        match LineSource::first_non_blank_line(path) {
            Ok(Some(line)) => self.is_entry_start(&line),
            Ok(None) => false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Could not sniff file");
                false
            }
        }
    }

    fn next_fasta_entry(&mut self) -> Result<Option<String>> {
        match self.next_raw_entry()? {
            Some(raw) => self.raw_to_fasta(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn next_filtered_raw_entry(&mut self, filter: &dyn Filter<str>) -> Result<Option<String>> {
        while let Some(raw) = self.next_raw_entry()? {
            if filter.passes(&raw) {
                return Ok(Some(raw));
            }
            trace!(db = self.db_name(), "Entry rejected by filter");
        }
        Ok(None)
    }

    /// Like `next_fasta_entry`, with the filter applied to the raw entry
    fn next_filtered_fasta_entry(&mut self, filter: &dyn Filter<str>) -> Result<Option<String>> {
        match self.next_filtered_raw_entry(filter)? {
            Some(raw) => self.raw_to_fasta(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn next_protein(&mut self) -> Result<Option<Protein>> {
        match self.next_fasta_entry()? {
            Some(fasta) => Protein::from_fasta(&fasta).map(Some),
            None => Ok(None),
        }
    }

    fn next_filtered_protein(&mut self, filter: &dyn Filter<str>) -> Result<Option<Protein>> {
        match self.next_filtered_fasta_entry(filter)? {
            Some(fasta) => Protein::from_fasta(&fasta).map(Some),
            None => Ok(None),
        }
    }

    /// Count the entry start lines of the whole file.
    /// The source is reset before and after the scan, so reading resumes at the first entry.
    fn count_entries(&mut self) -> Result<EntryCount> {
        self.reset()?;
        let cancel = self.cancel_handle();
        let mut count = 0u64;
        let mut cancelled = false;

        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let line = match self.slot_mut().source_mut()?.next_line()? {
                Some(line) => line,
                None => break,
            };
            if self.is_entry_start(&line) {
                count += 1;
            }
        }

        self.reset()?;
        if cancelled {
            cancel.clear();
            debug!(db = self.db_name(), counted = count, "Entry count cancelled");
            return Ok(EntryCount::Cancelled);
        }

        debug!(db = self.db_name(), count, "Counted entries");
        Ok(EntryCount::Counted(count))
    }

    /// Reopen the file from its first byte and drop any lookahead
    fn reset(&mut self) -> Result<()> {
        self.slot_mut().reset()
    }

    fn close(&mut self) {
        self.slot_mut().close()
    }

    /// A handle that stops a running `count_entries` from another thread
    fn cancel_handle(&self) -> CancelFlag {
        self.slot().cancel_flag()
    }

    fn progress(&self) -> Progress {
        self.slot().progress()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_db_format_names() {
        assert_eq!(DbFormat::SwissProt.to_string(), "SwissProt");
        assert_eq!(DbFormat::Fasta.to_string(), "FASTA");
        assert_eq!(DbFormat::from_str("fasta").unwrap(), DbFormat::Fasta);
        assert_eq!(DbFormat::from_str("SWISSPROT").unwrap(), DbFormat::SwissProt);
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::default();
        let handle = flag.clone();
        handle.cancel();
        assert!(flag.is_cancelled());
        flag.clear();
        assert!(!handle.is_cancelled());
    }
}
