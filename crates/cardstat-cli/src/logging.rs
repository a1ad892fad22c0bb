use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding a log filter, e.g. `cardstat_core=debug`.
const LOG_ENV: &str = "CARDSTAT_LOG";

/// Installs the stderr log subscriber.
///
/// A filter in `CARDSTAT_LOG` takes precedence; otherwise `verbose` selects
/// `debug` and the default is `warn`.
pub(crate) fn init(verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}
