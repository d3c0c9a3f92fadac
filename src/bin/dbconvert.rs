use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use dbtoolkit::loader::{DbFormat, DbLoader, LoaderRegistry, SwissProtLoader};
use dbtoolkit::swissprot::swissprot_to_fasta;
use dbtoolkit::utils::cli::{build_filter, load_grammar};
use dbtoolkit::utils::files::open_output;
use dbtoolkit::utils::logging::init_logging;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let open_context = || format!("Unable to open database \"{}\"", args.input.display());

    // Only sniff the format here, the loader that reads the file is set up below
    let mut loader = LoaderRegistry::with_defaults()
        .detect(&args.input, false)
        .with_context(open_context)?;
    let format = loader.format();
    info!(path = %args.input.display(), format = loader.db_name(), "Detected database");

    let filter = build_filter(
        args.filter.as_deref(),
        args.filter_arg.as_deref(),
        format,
        args.invert,
    )?;
    let mut writer = open_output(args.output.as_ref())?;
    let mut stats = Stats::default();

    if format == DbFormat::SwissProt {
        let grammar = load_grammar(args.grammar.as_ref())?;
        let mut swissprot = SwissProtLoader::configured(grammar, args.wrap);
        swissprot.load(&args.input).with_context(open_context)?;

        for fasta in swissprot_to_fasta(swissprot, filter, args.threads)? {
            stats.write(&mut writer, fasta)?;
        }
    } else {
        loader.load(&args.input).with_context(open_context)?;
        loop {
            let next = match &filter {
                Some(filter) => loader.next_filtered_fasta_entry(&**filter),
                None => loader.next_fasta_entry(),
            };

            match next.transpose() {
                Some(fasta) => stats.write(&mut writer, fasta)?,
                None => break,
            }
        }
        loader.close();
    }

    writer.flush().context("Error flushing output")?;
    info!(written = stats.written, skipped = stats.skipped, "Conversion finished");

    Ok(())
}

#[derive(Default)]
struct Stats {
    written: u64,
    skipped: u64,
}

impl Stats {
    /// Write a converted entry. Entries that failed to parse are skipped,
    /// any other error aborts the conversion.
    fn write(&mut self, writer: &mut dyn Write, fasta: dbtoolkit::Result<String>) -> Result<()> {
        match fasta {
            Ok(fasta) => {
                writer.write_all(fasta.as_bytes()).context("Error writing FASTA entry")?;
                self.written += 1;
            }
            Err(e) if e.is_record_error() => {
                warn!(error = %e, "Skipping entry");
                self.skipped += 1;
            }
            Err(e) => return Err(e).context("Error reading database"),
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
struct Cli {
    /// Database file to convert (SwissProt or FASTA, optionally gzip or zip compressed)
    #[clap(long)]
    input: PathBuf,

    /// FASTA output file, StdOut when omitted
    #[clap(long)]
    output: Option<PathBuf>,

    /// Name of the filter to apply to every entry, e.g. taxonomy, keyword or pattern
    #[clap(long)]
    filter: Option<String>,

    /// Argument passed to the filter
    #[clap(long, requires = "filter")]
    filter_arg: Option<String>,

    /// Keep the entries the filter rejects instead
    #[clap(long, default_value_t = false)]
    invert: bool,

    /// Wrap sequences of converted SwissProt entries every 59 residues
    #[clap(long, default_value_t = false)]
    wrap: bool,

    /// Grammar file describing the SwissProt record layout
    #[clap(long, env = "DBTOOLKIT_GRAMMAR")]
    grammar: Option<PathBuf>,

    /// Amount of threads converting SwissProt entries, 0 uses all available threads
    #[clap(long, default_value_t = 1)]
    threads: usize,

    /// Enable verbose mode
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
}
