//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter directive forced by `-q`/`-v`, if any.
pub fn flag_directive(quiet: bool, verbose: u8) -> Option<&'static str> {
    match (quiet, verbose) {
        (true, _) => Some("warn"),
        (false, 0) => None,
        (false, 1) => Some("debug"),
        (false, _) => Some("trace"),
    }
}

/// Installs the global fmt subscriber.
///
/// Precedence: `-q`/`-v`, then `RUST_LOG`, then `configured`.
pub fn init(quiet: bool, verbose: u8, configured: &str) {
    let filter = match flag_directive(quiet, verbose) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
