//! Tracing subscriber setup for the binary
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to the application.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Build the level filter; `RUST_LOG` wins over `log_level` when set
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", log_level);
            EnvFilter::new("info")
        })
}

/// Install a console subscriber writing to stderr
///
/// Plan output goes to stdout, so logs never mix with `--json` documents.
pub fn init_logging(log_level: &str, json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(log_level))
        .with_writer(std::io::stderr);

    // try_init so tests and embedders that already set a subscriber keep it
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };
    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already initialized, skipping");
    }

    Ok(())
}
