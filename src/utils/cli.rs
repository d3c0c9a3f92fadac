use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::filter::registry::FilterRegistry;
use crate::filter::Filter;
use crate::loader::detect::swissprot_factory;
use crate::loader::{DbFormat, DbLoader, LoaderRegistry};
use crate::swissprot::grammar::GrammarTable;

/// The grammar given on the command line, or None to use the bundled one
pub fn load_grammar(path: Option<&PathBuf>) -> Result<Option<Arc<GrammarTable>>> {
    match path {
        Some(path) => {
            let grammar = GrammarTable::from_path(path)
                .with_context(|| format!("Unable to load grammar \"{}\"", path.display()))?;
            info!(path = %path.display(), "Using custom grammar");
            Ok(Some(Arc::new(grammar)))
        }
        None => Ok(None),
    }
}

/// The default loaders, with the SwissProt loader configured by the command-line options
pub fn loader_registry(grammar: Option<Arc<GrammarTable>>, wrap: bool) -> LoaderRegistry {
    let mut registry = LoaderRegistry::with_defaults();
    registry.register("SwissProt", swissprot_factory(grammar, wrap));
    registry
}

/// Detect the format of `path` and return a loader that is ready to read it
pub fn open_database(registry: &LoaderRegistry, path: &PathBuf) -> Result<Box<dyn DbLoader>> {
    let loader = registry
        .detect(path, true)
        .with_context(|| format!("Unable to open database \"{}\"", path.display()))?;
    info!(path = %path.display(), format = loader.db_name(), "Opened database");
    Ok(loader)
}

/// Build the raw-entry filter named on the command line, if any
pub fn build_filter(
    name: Option<&str>,
    argument: Option<&str>,
    format: DbFormat,
    inverted: bool,
) -> Result<Option<Box<dyn Filter<str>>>> {
    let name = match name {
        Some(name) => name,
        None => return Ok(None),
    };

    let registry = FilterRegistry::with_defaults();
    let filter = registry
        .create(name, format, argument.unwrap_or_default(), inverted)
        .with_context(|| {
            format!(
                "Unable to create filter '{name}', available for {format}: {}",
                registry.names_for(format).join(", ")
            )
        })?;
    Ok(Some(filter))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_load_grammar() {
        assert!(load_grammar(None).unwrap().is_none());

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"ID,1\nAC,-1\n").unwrap();
        let grammar = load_grammar(Some(&file.path().to_path_buf())).unwrap().unwrap();
        assert_eq!(grammar.descriptors().len(), 2);

        let missing = file.path().with_extension("missing");
        assert!(load_grammar(Some(&missing)).is_err());
    }

    #[test]
    fn test_build_filter() {
        assert!(build_filter(None, None, DbFormat::Fasta, false).unwrap().is_none());

        let filter = build_filter(Some("pattern"), Some("MKL"), DbFormat::Fasta, false)
            .unwrap()
            .unwrap();
        assert!(filter.passes(">P1\nMKLV\n"));

        let Err(error) = build_filter(Some("keyword"), Some("x"), DbFormat::Fasta, false) else {
            panic!("keyword filters do not exist for FASTA");
        };
        assert!(error.to_string().contains("pattern, taxonomy"));
    }
}
