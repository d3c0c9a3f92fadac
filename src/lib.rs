//! Reading, converting and filtering SwissProt and FASTA protein databases.

pub mod digest;
pub mod error;
pub mod filter;
pub mod loader;
pub mod protein;
pub mod swissprot;
pub mod utils;

pub use error::{Error, Result};
