//! Diagnostic logging to stderr.
//!
//! `RUST_LOG` takes precedence; otherwise only warnings are shown, or debug
//! output for this crate when verbose mode is on.

use tracing_subscriber::EnvFilter;

fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if verbose {
        EnvFilter::new("warn,dcf_val=debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Install the global subscriber. Later calls keep the first subscriber
/// and report the failure on stderr.
pub fn init_logging(verbose: bool) {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
