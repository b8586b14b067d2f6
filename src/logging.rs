// src/logging.rs
// =============================================================================
// Sets up diagnostic output.
//
// Diagnostics go to stderr through `tracing`, so stdout only ever carries the
// report (or the JSON) and can be piped into other tools.
//
// Verbosity:
//   RUST_LOG set   -> used as-is (e.g. RUST_LOG=email_harvester=debug)
//   otherwise      -> warn, info with -v, debug with -vv
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // try_init: a second call (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
