pub mod cli;
pub mod files;
pub mod line_source;
pub mod logging;
