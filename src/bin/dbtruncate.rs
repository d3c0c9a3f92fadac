use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dbtoolkit::filter::protein::SequenceLengthFilter;
use dbtoolkit::filter::Filter;
use dbtoolkit::utils::cli::{load_grammar, loader_registry, open_database};
use dbtoolkit::utils::files::open_output;
use dbtoolkit::utils::logging::init_logging;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let keep = SequenceLengthFilter::new(args.min_length, None, false);

    let grammar = load_grammar(args.grammar.as_ref())?;
    let registry = loader_registry(grammar, false);
    let mut loader = open_database(&registry, &args.input)?;
    let mut writer = open_output(args.output.as_ref())?;

    let mut written: u64 = 0;
    let mut dropped: u64 = 0;

    while let Some(protein) = loader
        .next_protein()
        .context("Error reading protein from database")?
    {
        if !keep.passes(&protein) {
            dropped += 1;
            continue;
        }

        let truncated = match args.terminus {
            Terminus::N => protein.truncate_n_terminal(args.length),
            Terminus::C => protein.truncate_c_terminal(args.length),
        };
        writer
            .write_all(truncated.to_fasta(args.line_width).as_bytes())
            .context("Error writing protein")?;
        written += 1;
    }
    loader.close();
    writer.flush().context("Error flushing output")?;

    info!(written, dropped, "Truncation finished");

    Ok(())
}

#[derive(Parser, Debug)]
struct Cli {
    /// Database file with the proteins to truncate
    #[clap(long)]
    input: PathBuf,

    /// FASTA output file, StdOut when omitted
    #[clap(long)]
    output: Option<PathBuf>,

    /// Amount of residues to keep
    #[clap(long)]
    length: usize,

    /// Which end of the sequence to keep
    #[clap(value_enum, long, default_value_t = Terminus::N)]
    terminus: Terminus,

    /// Drop proteins shorter than this instead of writing them as they are
    #[clap(long, default_value_t = 0)]
    min_length: usize,

    /// Wrap output sequences every this many residues
    #[clap(long)]
    line_width: Option<usize>,

    /// Grammar file describing the SwissProt record layout
    #[clap(long, env = "DBTOOLKIT_GRAMMAR")]
    grammar: Option<PathBuf>,

    /// Enable verbose mode
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Terminus {
    N,
    C,
}
