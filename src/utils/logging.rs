use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding filter directives, e.g. `dbtoolkit=trace`
pub const LOG_ENV_VAR: &str = "DBTOOLKIT_LOG";

/// Install a stderr subscriber for the command-line tools.
/// Directives in `DBTOOLKIT_LOG` take precedence over the `verbose` flag.
/// Stdout is left alone because most tools write their records there.
pub fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install the logging subscriber")?;

    Ok(())
}
