use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use dbtoolkit::utils::cli::{build_filter, load_grammar, loader_registry, open_database};
use dbtoolkit::utils::files::{open_output, read_trimmed_lines};
use dbtoolkit::utils::logging::init_logging;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let peptides: Vec<String> = read_trimmed_lines(&args.peptides)?
        .into_iter()
        .map(|p| normalize(&p, args.equate_il))
        .collect();
    let mut matches: Vec<Vec<String>> = vec![Vec::new(); peptides.len()];

    let grammar = load_grammar(args.grammar.as_ref())?;
    let registry = loader_registry(grammar, false);
    let mut loader = open_database(&registry, &args.input)?;
    let filter = build_filter(
        args.filter.as_deref(),
        args.filter_arg.as_deref(),
        loader.format(),
        args.invert,
    )?;

    let mut proteins: u64 = 0;
    loop {
        let next = match &filter {
            Some(filter) => loader.next_filtered_protein(&**filter),
            None => loader.next_protein(),
        };
        let protein = match next.context("Error reading protein from database")? {
            Some(protein) => protein,
            None => break,
        };

        proteins += 1;
        let sequence = normalize(&protein.sequence, args.equate_il);
        for (peptide, found) in peptides.iter().zip(matches.iter_mut()) {
            if sequence.contains(peptide.as_str()) {
                found.push(protein.accession.clone());
            }
        }
    }
    loader.close();

    let mut writer = open_output(args.output.as_ref())?;
    writeln!(writer, "peptide\tproteins").context("Error writing header")?;
    for (peptide, found) in peptides.iter().zip(matches.iter()) {
        writeln!(writer, "{}\t{}", peptide, found.join(";")).context("Error writing mapping")?;
    }
    writer.flush().context("Error flushing output")?;

    let mapped = matches.iter().filter(|m| !m.is_empty()).count();
    info!(peptides = peptides.len(), mapped, proteins, "Mapping finished");

    Ok(())
}

/// Uppercase the peptide, replacing I by L when the two should be treated as equal
fn normalize(sequence: &str, equate_il: bool) -> String {
    let upper = sequence.to_uppercase();
    if equate_il {
        upper.replace('I', "L")
    } else {
        upper
    }
}

#[derive(Parser, Debug)]
struct Cli {
    /// Database file with the proteins to map onto
    #[clap(long)]
    input: PathBuf,

    /// File with one peptide per line
    #[clap(long)]
    peptides: PathBuf,

    /// TSV output file, StdOut when omitted
    #[clap(long)]
    output: Option<PathBuf>,

    /// Treat isoleucine (I) and leucine (L) as the same amino acid
    #[clap(long, default_value_t = false)]
    equate_il: bool,

    /// Name of the filter selecting the proteins to map onto
    #[clap(long)]
    filter: Option<String>,

    /// Argument passed to the filter
    #[clap(long, requires = "filter")]
    filter_arg: Option<String>,

    /// Map onto the proteins the filter rejects instead
    #[clap(long, default_value_t = false)]
    invert: bool,

    /// Grammar file describing the SwissProt record layout
    #[clap(long, env = "DBTOOLKIT_GRAMMAR")]
    grammar: Option<PathBuf>,

    /// Enable verbose mode
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
}
