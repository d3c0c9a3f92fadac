use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use dbtoolkit::loader::{EntryCount, LoaderRegistry};
use dbtoolkit::utils::cli::open_database;
use dbtoolkit::utils::logging::init_logging;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose)?;

    let registry = LoaderRegistry::with_defaults();
    let mut loader = open_database(&registry, &args.input)?;

    let cancel = loader.cancel_handle();
    let progress = loader.progress();
    let db_name = loader.db_name();

    let worker = thread::spawn(move || {
        let count = loader.count_entries();
        loader.close();
        count
    });

    let started = Instant::now();
    let interval = Duration::from_millis(args.interval_ms);
    let mut last_report = started;
    let mut cancelled = false;

    while !worker.is_finished() {
        thread::sleep(POLL_INTERVAL);

        if let Some(max_seconds) = args.max_seconds {
            if !cancelled && started.elapsed() >= Duration::from_secs(max_seconds) {
                warn!(max_seconds, "Time limit reached, cancelling");
                cancel.cancel();
                cancelled = true;
            }
        }

        if last_report.elapsed() >= interval {
            info!(
                bytes_read = progress.bytes_read(),
                total_bytes = progress.total_bytes(),
                "Counting: {:.1}%",
                progress.fraction() * 100.0
            );
            last_report = Instant::now();
        }
    }

    let count = worker
        .join()
        .map_err(|_| anyhow!("Counting thread panicked"))?
        .with_context(|| format!("Error counting entries of \"{}\"", args.input.display()))?;

    match count {
        EntryCount::Counted(n) => {
            println!("{n}");
            info!(entries = n, format = db_name, "Counting finished");
        }
        EntryCount::Cancelled => {
            println!("cancelled");
            warn!("Counting was cancelled before the end of the file");
        }
    }

    Ok(())
}

#[derive(Parser, Debug)]
struct Cli {
    /// Database file to count the entries of
    #[clap(long)]
    input: PathBuf,

    /// Cancel the count after this many seconds
    #[clap(long)]
    max_seconds: Option<u64>,

    /// Milliseconds between progress reports
    #[clap(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Enable verbose mode
    #[clap(short, long, default_value_t = false)]
    verbose: bool,
}
