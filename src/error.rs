use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the parsing, loading and filtering layers
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file \"{}\" does not exist", .0.display())]
    NotFound(PathBuf),

    /// Decompression failures and zip archives that do not hold exactly one file
    #[error("unreadable archive \"{}\": {reason}", .path.display())]
    Archive { path: PathBuf, reason: String },

    /// The grammar resource is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    #[error("key '{expected}' not found at current position (found '{found}'), even though it was not optional")]
    Parse { expected: String, found: String },

    #[error("not a FASTA entry: {0}")]
    InvalidFasta(String),

    #[error("field '{0}' is missing from the parsed record")]
    MissingField(String),

    #[error("{0} line(s) left unconsumed at the end of the record")]
    TrailingLines(usize),

    #[error("unable to determine the database format of \"{}\"", .0.display())]
    UnknownFormat(PathBuf),

    #[error("no database file has been loaded")]
    NotLoaded,

    #[error("the loader has been closed")]
    Closed,

    #[error("no filter named '{name}' is registered for {format}")]
    UnknownFilter { name: String, format: String },

    #[error("invalid argument for filter '{name}': {reason}")]
    InvalidFilterArgument { name: String, reason: String },
}

impl Error {
    /// Whether the error only concerns the current entry, so reading can carry on with
    /// the next one. Every other error comes from the source itself and repeats.
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. }
                | Error::MissingField(_)
                | Error::TrailingLines(_)
                | Error::InvalidFasta(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors() {
        assert!(Error::MissingField("AC".to_string()).is_record_error());
        assert!(Error::TrailingLines(2).is_record_error());
        assert!(!Error::NotLoaded.is_record_error());
        assert!(!Error::io(
            "db.dat.gz",
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated")
        )
        .is_record_error());
    }
}
