use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dbtoolkit::protein::Protein;
use dbtoolkit::utils::cli::{load_grammar, loader_registry, open_database};
use dbtoolkit::utils::files::open_output;
use dbtoolkit::utils::logging::init_logging;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let grammar = load_grammar(args.grammar.as_ref())?;
    let registry = loader_registry(grammar, false);
    let mut loader = open_database(&registry, &args.input)?;

    // Proteins in input order, plus the index of the first protein seen for each sequence
    let mut proteins: Vec<Protein> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates: u64 = 0;

    while let Some(protein) = loader
        .next_protein()
        .context("Error reading protein from database")?
    {
        match seen.get(&protein.sequence) {
            Some(&idx) => {
                duplicates += 1;
                if args.merge_headers {
                    proteins[idx].merge_header(&protein, &args.separator);
                }
            }
            None => {
                seen.insert(protein.sequence.clone(), proteins.len());
                proteins.push(protein);
            }
        }
    }
    loader.close();

    let mut writer = open_output(args.output.as_ref())?;
    for protein in &proteins {
        writer
            .write_all(protein.to_fasta(args.line_width).as_bytes())
            .context("Error writing protein")?;
    }
    writer.flush().context("Error flushing output")?;

    info!(kept = proteins.len(), duplicates, "Removed redundant proteins");

    Ok(())
}

#[derive(Parser, Debug)]
struct Cli {
    /// Database file to remove redundant sequences from
    #[clap(long)]
    input: PathBuf,

    /// FASTA output file, StdOut when omitted
    #[clap(long)]
    output: Option<PathBuf>,

    /// Append the headers of dropped duplicates to the header of the protein that is kept
    #[clap(long, default_value_t = false)]
    merge_headers: bool,

    /// Text placed between merged headers
    #[clap(long, default_value = " | ")]
    separator: String,

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
