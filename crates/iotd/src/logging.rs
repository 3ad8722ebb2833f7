use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Install the global subscriber. `log` records from the library crates are
/// forwarded through `LogTracer`. Output goes to stderr so dumps on stdout
/// stay machine-readable.
pub fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_log::LogTracer::init()?;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
