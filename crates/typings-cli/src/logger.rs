//! Logging setup built on `tracing-subscriber`.
//!
//! `--verbose` enables debug output for the typings crates, `--quiet` keeps
//! errors only, and otherwise `RUST_LOG` is honoured before falling back to
//! info level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "typings_core=debug,typings_compile=debug,typings_config=debug,typings_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "typings_core=info,typings_compile=info,typings_config=info,typings_cli=info";

/// Install the global subscriber. Call once, before any logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = build_filter(verbose, quiet);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A second call (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}

fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
