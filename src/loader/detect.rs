use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::loader::{DbLoader, FastaLoader, SwissProtLoader};
use crate::swissprot::grammar::GrammarTable;

/// Creates a fresh, unloaded loader
pub type LoaderFactory = Box<dyn Fn() -> Box<dyn DbLoader> + Send + Sync>;

pub fn factory<L: DbLoader + Default + 'static>() -> LoaderFactory {
    Box::new(|| Box::new(L::default()) as Box<dyn DbLoader>)
}

/// A SwissProt factory that applies the given grammar and wrapping to every loader it creates
pub fn swissprot_factory(grammar: Option<Arc<GrammarTable>>, wrap: bool) -> LoaderFactory {
    Box::new(move || Box::new(SwissProtLoader::configured(grammar.clone(), wrap)) as Box<dyn DbLoader>)
}

/// Try the candidates in order and return the first loader that can read `path`,
/// already loaded when `eager` is set
pub fn detect<'a, I>(path: &Path, candidates: I, eager: bool) -> Result<Box<dyn DbLoader>>
where
    I: IntoIterator<Item = &'a LoaderFactory>,
{
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    for make_loader in candidates {
        let mut loader = make_loader();
        if !loader.can_read_file(path) {
            continue;
        }

        debug!(path = %path.display(), db = loader.db_name(), "Detected database format");
        if eager {
            loader.load(path)?;
        }
        return Ok(loader);
    }

    Err(Error::UnknownFormat(path.to_path_buf()))
}

/// Loader factories by name, in registration order
pub struct LoaderRegistry {
    factories: Vec<(String, LoaderFactory)>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// SwissProt first, then FASTA
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("SwissProt", factory::<SwissProtLoader>());
        registry.register("FASTA", factory::<FastaLoader>());
        registry
    }

    /// Add a factory at the end, or replace the one registered under the same name in place
    pub fn register(&mut self, name: &str, factory: LoaderFactory) {
        match self.factories.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = factory,
            None => self.factories.push((name.to_string(), factory)),
        }
    }

    /// A fresh loader registered under `name`, ignoring case
    pub fn get(&self, name: &str) -> Option<Box<dyn DbLoader>> {
        self.factories
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, make_loader)| make_loader())
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn detect(&self, path: &Path, eager: bool) -> Result<Box<dyn DbLoader>> {
        detect(path, self.factories.iter().map(|(_, f)| f), eager)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::loader::{DbFormat, SourceSlot};

    /// Claims every file, as a stand-in for an overly lenient format
    #[derive(Default)]
    struct AcceptAllLoader {
        slot: SourceSlot,
    }

    impl DbLoader for AcceptAllLoader {
        fn db_name(&self) -> &'static str {
            "AcceptAll"
        }

        fn format(&self) -> DbFormat {
            DbFormat::Fasta
        }

        fn slot(&self) -> &SourceSlot {
            &self.slot
        }

        fn slot_mut(&mut self) -> &mut SourceSlot {
            &mut self.slot
        }

        fn next_raw_entry(&mut self) -> Result<Option<String>> {
            self.slot.source_mut()?.next_line()
        }

        fn raw_to_fasta(&self, raw: &str) -> Result<String> {
            Ok(format!(">{raw}\n"))
        }

        fn is_entry_start(&self, _line: &str) -> bool {
            true
        }
    }

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const SWISSPROT: &str = "ID   FOO_HUMAN   STANDARD\nAC   P12345;\n//\n";

    #[test]
    fn test_first_match_wins() {
        let file = file_with(SWISSPROT);
        let candidates = vec![factory::<AcceptAllLoader>(), factory::<SwissProtLoader>()];

        let loader = detect(file.path(), &candidates, false).unwrap();
        assert_eq!(loader.db_name(), "AcceptAll");

        let loader = detect(file.path(), candidates.iter().rev(), false).unwrap();
        assert_eq!(loader.db_name(), "SwissProt");
    }

    #[test]
    fn test_only_swissprot_matches() {
        let file = file_with(SWISSPROT);
        let candidates = vec![factory::<FastaLoader>(), factory::<SwissProtLoader>()];

        let mut loader = detect(file.path(), &candidates, true).unwrap();
        assert_eq!(loader.db_name(), "SwissProt");
        assert!(loader.next_raw_entry().unwrap().is_some());
    }

    #[test]
    fn test_lazy_detection_does_not_load() {
        let file = file_with(">P1\nMKL\n");
        let mut loader = LoaderRegistry::with_defaults().detect(file.path(), false).unwrap();
        assert_eq!(loader.db_name(), "FASTA");
        assert!(matches!(loader.next_raw_entry(), Err(Error::NotLoaded)));

        loader.load(file.path()).unwrap();
        assert_eq!(loader.next_raw_entry().unwrap().as_deref(), Some(">P1\nMKL\n"));
    }

    #[test]
    fn test_detection_errors() {
        let registry = LoaderRegistry::with_defaults();

        let unknown = file_with("just some text\n");
        assert!(matches!(
            registry.detect(unknown.path(), true),
            Err(Error::UnknownFormat(p)) if p == unknown.path()
        ));

        let missing = unknown.path().with_extension("missing");
        assert!(matches!(registry.detect(&missing, true), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_configured_swissprot_factory() {
        let file = file_with("ID   FOO_HUMAN   STANDARD\nAC   P12345;\nSQ   SEQUENCE\n     MKLV\n//\n");
        let grammar = GrammarTable::parse("ID,1\nAC,1\nSQ,1\n  ,0\n").unwrap();

        let mut registry = LoaderRegistry::with_defaults();
        registry.register("SwissProt", swissprot_factory(Some(Arc::new(grammar)), false));

        let mut loader = registry.detect(file.path(), true).unwrap();
        assert_eq!(
            loader.next_fasta_entry().unwrap().unwrap(),
            ">sw|P12345|FOO_HUMAN \nMKLV\n"
        );
    }

    #[test]
    fn test_registry() {
        let mut registry = LoaderRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["SwissProt", "FASTA"]);
        assert_eq!(registry.get("fasta").map(|l| l.db_name()), Some("FASTA"));
        assert!(registry.get("embl").is_none());

        registry.register("SwissProt", factory::<AcceptAllLoader>());
        assert_eq!(registry.names(), vec!["SwissProt", "FASTA"]);
        assert_eq!(registry.get("SwissProt").map(|l| l.db_name()), Some("AcceptAll"));
    }
}
