use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::error::{Error, Result};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZIP_PREALLOC_LIMIT: u64 = 64 * 1024 * 1024;

/// How the bytes of a database file are stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Gzip,
    /// A zip archive holding exactly one file
    Zip,
}

/// Progress counters of a LineSource that can be polled from another thread
#[derive(Debug, Clone, Default)]
pub struct Progress {
    read: Arc<AtomicU64>,
    total: Arc<AtomicU64>,
}

impl Progress {
    pub fn bytes_read(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    pub fn total_bytes(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Fraction of the input consumed so far, in [0, 1]
    pub fn fraction(&self) -> f64 {
        let total = self.total_bytes();
        if total == 0 {
            return 1.0;
        }
        (self.bytes_read() as f64 / total as f64).min(1.0)
    }

    fn rearm(&self, total: u64) {
        self.read.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }
}

/// Counts every byte pulled from the wrapped reader
struct CountingReader<R> {
    inner: R,
    progress: Progress,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.progress.read.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// A resettable line reader over a (possibly compressed) file,
/// with room to push back a single line
pub struct LineSource {
    path: PathBuf,
    transport: Transport,
    reader: Option<Box<dyn BufRead + Send>>,
    pushed_back: Option<String>,
    buffer: Vec<u8>,
    progress: Progress,
}

impl LineSource {
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_progress(path, Progress::default())
    }

    /// Open `path`, reporting into existing progress counters
    pub fn open_with_progress(path: &Path, progress: Progress) -> Result<Self> {
        let (transport, reader) = open_stream(path, &progress)?;
        debug!(path = %path.display(), ?transport, "Opened line source");

        Ok(Self {
            path: path.to_path_buf(),
            transport,
            reader: Some(reader),
            pushed_back: None,
            buffer: Vec::with_capacity(256),
            progress,
        })
    }

    /// Open a throwaway source and return its first line that is not blank
    pub fn first_non_blank_line(path: &Path) -> Result<Option<String>> {
        let mut source = LineSource::open(path)?;
        while let Some(line) = source.next_line()? {
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// The next line without its line terminator, or None at the end of the stream
    pub fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pushed_back.take() {
            return Ok(Some(line));
        }

        let reader = self.reader.as_mut().ok_or(Error::Closed)?;
        self.buffer.clear();
        let n = reader
            .read_until(b'\n', &mut self.buffer)
            .map_err(|e| Error::io(&self.path, e))?;

        if n == 0 {
            return Ok(None);
        }

        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }

        Ok(Some(String::from_utf8_lossy(&self.buffer).into_owned()))
    }

    /// Make `line` the result of the next call to `next_line`.
    /// Only a single line can be pushed back at a time.
    pub fn push_back(&mut self, line: String) {
        debug_assert!(self.pushed_back.is_none(), "push_back called twice in a row");
        self.pushed_back = Some(line);
    }

    /// Reopen the file from its first byte
    pub fn reset(&mut self) -> Result<()> {
        self.close();
        let (transport, reader) = open_stream(&self.path, &self.progress)?;
        self.transport = transport;
        self.reader = Some(reader);
        debug!(path = %self.path.display(), "Reset line source");
        Ok(())
    }

    pub fn close(&mut self) {
        self.reader = None;
        self.pushed_back = None;
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    pub fn bytes_read(&self) -> u64 {
        self.progress.bytes_read()
    }

    pub fn total_bytes(&self) -> u64 {
        self.progress.total_bytes()
    }

    pub fn progress(&self) -> Progress {
        self.progress.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }
}

/// Sniff the leading bytes of a file and build the matching decoding stack
fn open_stream(path: &Path, progress: &Progress) -> Result<(Transport, Box<dyn BufRead + Send>)> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut magic = Vec::with_capacity(ZIP_MAGIC.len());
    file.by_ref()
        .take(ZIP_MAGIC.len() as u64)
        .read_to_end(&mut magic)
        .map_err(|e| Error::io(path, e))?;
    file.seek(SeekFrom::Start(0))
        .map_err(|e| Error::io(path, e))?;

    if magic.starts_with(ZIP_MAGIC) {
        let data = read_single_zip_member(path, file)?;
        progress.rearm(data.len() as u64);
        let reader = CountingReader {
            inner: Cursor::new(data),
            progress: progress.clone(),
        };
        return Ok((Transport::Zip, Box::new(BufReader::new(reader))));
    }

    let total = file.metadata().map_err(|e| Error::io(path, e))?.len();
    progress.rearm(total);
    let counted = CountingReader {
        inner: file,
        progress: progress.clone(),
    };

    if magic.starts_with(GZIP_MAGIC) {
        let mut reader = BufReader::new(MultiGzDecoder::new(counted));
        // Surface a broken gzip header now rather than on the first line
        reader.fill_buf().map_err(|e| Error::Archive {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        return Ok((Transport::Gzip, Box::new(reader)));
    }

    Ok((Transport::Plain, Box::new(BufReader::new(counted))))
}

/// Preallocation for a zip member, capped because the declared size comes from the archive
fn capacity_hint(declared_size: u64) -> usize {
    declared_size.min(ZIP_PREALLOC_LIMIT) as usize
}

fn read_single_zip_member(path: &Path, file: File) -> Result<Vec<u8>> {
    let archive_error = |reason: String| Error::Archive {
        path: path.to_path_buf(),
        reason,
    };

    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(e.to_string()))?;
    if archive.len() != 1 {
        return Err(archive_error(format!(
            "expected exactly one entry in the archive, found {}",
            archive.len()
        )));
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| archive_error(e.to_string()))?;
    if entry.is_dir() {
        return Err(archive_error(format!("entry \"{}\" is a directory", entry.name())));
    }

    let mut data = Vec::with_capacity(capacity_hint(entry.size()));
    entry
        .read_to_end(&mut data)
        .map_err(|e| archive_error(e.to_string()))?;
    Ok(data)
}
