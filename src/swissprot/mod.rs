//! The SwissProt flat file format: its grammar, a parser producing `ParsedRecord`s
//! and the conversion of records to FASTA, sequentially or on a pool of threads.

mod consumer;
pub mod fasta;
pub mod grammar;
pub mod parser;
mod producer;
pub mod record;
pub mod threaded_converter;

pub use fasta::render_fasta;
pub use grammar::GrammarTable;
pub use parser::RecordParser;
pub use record::{FieldValue, ParsedRecord};
pub use threaded_converter::{swissprot_to_fasta, SequentialConverter, ThreadedConverter};
