//! Diagnostic channel setup.
//!
//! Diagnostics go to stderr. `RUST_LOG` refines the filter; without it
//! warnings and errors are shown.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Builds the diagnostic filter from `RUST_LOG`-style `directives`.
///
/// Unparseable directives are skipped. Targets not named fall back to
/// `WARN`.
pub fn diagnostic_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}

/// Installs the global stderr subscriber.
pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(diagnostic_filter(&directives))
        .with_writer(std::io::stderr)
        .init();
}
