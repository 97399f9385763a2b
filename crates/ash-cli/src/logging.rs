//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a compact stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug for the ash
/// crates with `--verbose`. Stdout stays reserved for the report.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,ash_core=debug,ash_git=debug,ash_remote=debug,ash_fs=debug,ash_cli=debug"
    } else {
        "warn"
    };
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init();
}
