use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dbtoolkit::digest::EnzymeKind;
use dbtoolkit::filter::protein::SequencePatternFilter;
use dbtoolkit::filter::Filter;
use dbtoolkit::utils::cli::{load_grammar, loader_registry, open_database};
use dbtoolkit::utils::files::open_output;
use dbtoolkit::utils::logging::init_logging;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let enzyme = args.enzyme.enzyme();
    let pattern = args
        .sequence_pattern
        .as_deref()
        .map(|p| SequencePatternFilter::new(p, false))
        .transpose()
        .context("Invalid sequence pattern")?;

    let grammar = load_grammar(args.grammar.as_ref())?;
    let registry = loader_registry(grammar, false);
    let mut loader = open_database(&registry, &args.input)?;
    let mut writer = open_output(args.output.as_ref())?;

    let mut proteins: u64 = 0;
    let mut peptides: u64 = 0;

    while let Some(protein) = loader
        .next_protein()
        .context("Error reading protein from database")?
    {
        if pattern.as_ref().map_or(false, |p| !p.passes(&protein)) {
            continue;
        }

        proteins += 1;
        let digest = enzyme.digest(&protein.sequence, args.min_length, args.max_length);
        for (i, peptide) in digest.iter().enumerate() {
            writeln!(writer, ">{}|{}\n{}", protein.accession, i + 1, peptide)
                .context("Error writing peptide")?;
            peptides += 1;
        }
    }
    loader.close();
    writer.flush().context("Error flushing output")?;

    info!(enzyme = enzyme.name(), proteins, peptides, "Digest finished");

    Ok(())
}

#[derive(Parser, Debug)]
struct Cli {
    /// Database file with the proteins to digest
    #[clap(long)]
    input: PathBuf,

    /// FASTA output file for the peptides, StdOut when omitted
    #[clap(long)]
    output: Option<PathBuf>,

    /// Enzyme used for the in-silico digest
    #[clap(value_enum, long, default_value_t = EnzymeKind::Trypsin)]
    enzyme: EnzymeKind,

    /// Minimum peptide length
    #[clap(long, default_value_t = 5)]
    min_length: usize,

    /// Maximum peptide length
    #[clap(long, default_value_t = 50)]
    max_length: usize,

    /// Only digest proteins whose sequence matches this regular expression
    #[clap(long)]
    sequence_pattern: Option<String>,

    /// Grammar file describing the SwissProt record layout
    #[clap(long, env = "DBTOOLKIT_GRAMMAR")]
    grammar: Option<PathBuf>,

    /// Enable verbose mode
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
}
