use crossbeam_channel::{bounded, Receiver};
use lazy_static::lazy_static;
use tracing::debug;

use crate::error::Result;
use crate::filter::Filter;
use crate::loader::{DbLoader, SwissProtLoader};
use crate::swissprot::consumer::Consumer;
use crate::swissprot::parser::RecordParser;
use crate::swissprot::producer::Producer;

lazy_static! {
    static ref THREADS: usize = num_cpus::get();
}

/// Converts the entries of a loaded SwissProt file to FASTA on several threads.
/// One producer reads raw entries, the consumers parse and render them.
/// Entries come out in the order they are finished, which is not necessarily file order.
pub struct ThreadedConverter {
    producer: Producer,
    consumers: Vec<Consumer>,
    parser: RecordParser,
    wrap: bool,
    threads: usize,
    r_fasta: Option<Receiver<Result<String>>>,
    started: bool,
}

impl ThreadedConverter {
    /// Passing 0 as the amount of threads uses the amount of available threads on your machine
    pub fn new(
        loader: SwissProtLoader,
        filter: Option<Box<dyn Filter<str>>>,
        mut threads: usize,
    ) -> Result<Self> {
        if threads == 0 {
            threads = (*THREADS).max(1);
        }

        let parser = loader.parser()?;
        let wrap = loader.line_wrapping();
        let consumers = (0..threads).map(|_| Consumer::new()).collect();

        Ok(Self {
            producer: Producer::new(loader, filter),
            consumers,
            parser,
            wrap,
            threads,
            r_fasta: None,
            started: false,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    fn start(&mut self) {
        let (s_raw, r_raw) = bounded::<Result<String>>(self.threads * 2);
        let (s_fasta, r_fasta) = bounded::<Result<String>>(self.threads * 2);

        self.producer.start(s_raw);
        for consumer in &mut self.consumers {
            consumer.start(self.parser.clone(), self.wrap, r_raw.clone(), s_fasta.clone());
        }
        debug!(threads = self.threads, "Started converter threads");

        // Only the threads hold senders now, so the channels disconnect once they are done
        drop(s_fasta);

        self.r_fasta = Some(r_fasta);
        self.started = true;
    }

    fn join(&mut self) {
        self.producer.join();
        for consumer in self.consumers.iter_mut() {
            consumer.join();
        }
    }
}

impl Iterator for ThreadedConverter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.start();
        }

        let receiver = self.r_fasta.as_ref()?;
        match receiver.recv() {
            Ok(fasta) => Some(fasta),
            // The channel disconnects when every consumer has finished
            Err(_) => {
                self.r_fasta = None;
                self.join();
                None
            }
        }
    }
}

impl Drop for ThreadedConverter {
    fn drop(&mut self) {
        // Disconnect first so blocked senders give up, then wait for the threads
        self.r_fasta = None;
        if self.started {
            self.join();
        }
    }
}

/// Converts the entries of a loaded SwissProt file to FASTA on the calling thread, in file order
pub struct SequentialConverter {
    loader: SwissProtLoader,
    filter: Option<Box<dyn Filter<str>>>,
    done: bool,
}

impl SequentialConverter {
    pub fn new(loader: SwissProtLoader, filter: Option<Box<dyn Filter<str>>>) -> Self {
        Self {
            loader,
            filter,
            done: false,
        }
    }
}

impl Iterator for SequentialConverter {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = match &self.filter {
            Some(filter) => self.loader.next_filtered_fasta_entry(&**filter),
            None => self.loader.next_fasta_entry(),
        };

        match next {
            Ok(Some(fasta)) => Some(Ok(fasta)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // A failing source fails again on every read, so report it once
                if !e.is_record_error() {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}

/// Create a SequentialConverter or ThreadedConverter based on the amount of threads passed
pub fn swissprot_to_fasta(
    loader: SwissProtLoader,
    filter: Option<Box<dyn Filter<str>>>,
    threads: usize,
) -> Result<Box<dyn Iterator<Item = Result<String>>>> {
    if threads == 1 {
        Ok(Box::new(SequentialConverter::new(loader, filter)))
    } else {
        Ok(Box::new(ThreadedConverter::new(loader, filter, threads)?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::error::Error;
    use crate::filter::raw::SwissProtTaxonomyFilter;

    fn database(entries: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for i in 0..entries {
            let organism = if i % 2 == 0 { "Homo sapiens" } else { "Mus musculus" };
            write!(
                file,
                "ID   P{i}_TEST   Reviewed;\nAC   P{i:05};\nDE   RecName: Full=Protein {i};\nOS   {organism}.\nSQ   SEQUENCE\n     MKLV\n//\n"
            )
            .unwrap();
        }
        file
    }

    fn loaded(file: &NamedTempFile) -> SwissProtLoader {
        let mut loader = SwissProtLoader::new();
        loader.load(file.path()).unwrap();
        loader
    }

    #[test]
    fn test_threaded_conversion() {
        let file = database(25);
        let converter = ThreadedConverter::new(loaded(&file), None, 4).unwrap();
        assert_eq!(converter.threads(), 4);

        let mut headers: Vec<String> = converter
            .map(|fasta| fasta.unwrap().lines().next().unwrap().to_string())
            .collect();
        headers.sort();

        let mut expected: Vec<String> = (0..25)
            .map(|i| format!(">sw|P{i:05}|P{i}_TEST Protein {i}"))
            .collect();
        expected.sort();
        assert_eq!(headers, expected);
    }

    #[test]
    fn test_threaded_matches_sequential() {
        let file = database(10);
        let human = || -> Option<Box<dyn Filter<str>>> {
            Some(Box::new(SwissProtTaxonomyFilter::new("homo sapiens", false)))
        };

        let mut threaded: Vec<String> = swissprot_to_fasta(loaded(&file), human(), 0)
            .unwrap()
            .map(|fasta| fasta.unwrap())
            .collect();
        let sequential: Vec<String> = swissprot_to_fasta(loaded(&file), human(), 1)
            .unwrap()
            .map(|fasta| fasta.unwrap())
            .collect();

        threaded.sort();
        let mut sorted = sequential.clone();
        sorted.sort();
        assert_eq!(threaded, sorted);
        assert_eq!(sequential.len(), 5);
        assert!(sequential[0].starts_with(">sw|P00000|P0_TEST"));
    }

    #[test]
    fn test_errors_are_forwarded() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ID   BROKEN   Reviewed;\nDE   No accession;\n//\n").unwrap();

        let results: Vec<Result<String>> =
            ThreadedConverter::new(loaded(&file), None, 2).unwrap().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(Error::Parse { .. })));
    }

    #[test]
    fn test_truncated_gzip_ends_the_stream() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        for i in 0..2000 {
            write!(
                encoder,
                "ID   P{i}_TEST   Reviewed;\nAC   P{i:05};\nDE   RecName: Full=Protein {i};\nOS   Homo sapiens.\nSQ   SEQUENCE\n     MKLVAGHTREWQPLMNVCD\n//\n"
            )
            .unwrap();
        }
        let compressed = encoder.finish().unwrap();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&compressed[..compressed.len() / 2]).unwrap();

        for threads in [1, 2] {
            let results: Vec<Result<String>> = swissprot_to_fasta(loaded(&file), None, threads)
                .unwrap()
                .take(10_000)
                .collect();

            assert!(results.len() < 2000);
            let errors: Vec<&Error> = results.iter().filter_map(|r| r.as_ref().err()).collect();
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], Error::Io { .. }));
        }
    }

    #[test]
    fn test_record_errors_do_not_end_the_stream() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ID   BROKEN   Reviewed;\nDE   No accession;\n//\n").unwrap();
        file.write_all(b"ID   FOO_HUMAN   Reviewed;\nAC   P12345;\nDE   RecName: Full=Foo;\nSQ   SEQUENCE\n     MKLV\n//\n").unwrap();

        let results: Vec<Result<String>> = SequentialConverter::new(loaded(&file), None).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(Error::Parse { .. })));
        assert_eq!(results[1].as_deref().ok(), Some(">sw|P12345|FOO_HUMAN Foo\nMKLV\n"));
    }

    #[test]
    fn test_early_drop_does_not_hang() {
        let file = database(100);
        let mut converter = ThreadedConverter::new(loaded(&file), None, 2).unwrap();
        assert!(converter.next().is_some());
        drop(converter);
    }
}
