//! Logging setup using the tracing crate
//!
//! Logs go to stderr so stdout stays clean for listings and config values.
//! The level comes from `RUST_LOG`, falling back to `warn`, or `debug` with
//! `--verbose`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "voice_memos=debug,info"
    } else {
        "warn"
    }
}

/// Initialize the global subscriber.
///
/// An unparseable `RUST_LOG` falls back to the default filter. Calling this
/// twice leaves the first subscriber in place.
pub fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new(default_filter(true))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(false)))
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init();

    tracing::debug!(verbose, "Logging initialized");
}
