//! Operator-facing messages on stderr.
//!
//! Event records themselves go to stdout through the sink.

use std::fmt::Write as _;
use std::path::Path;

use socksnoop_pipeline::lifecycle::LifecycleTracker;
use socksnoop_pipeline::metrics::MetricsSnapshot;
use socksnoop_pipeline::pipeline::RunStats;

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Announces the one-time switch to the fallback log file.
pub fn print_fallback_warning(primary: &Path, fallback: &Path) {
    eprintln!(
        "{YELLOW}Warning:{RESET} cannot write to {}; falling back to {}",
        primary.display(),
        fallback.display()
    );
}

/// Startup line naming the active log file.
pub fn print_banner(log_path: &Path) {
    eprintln!(
        "{BOLD}Monitoring socket connections.{RESET} Logging to {}",
        log_path.display()
    );
    eprintln!("  {DIM}Press Ctrl+C to stop.{RESET}");
}

/// Printed once the poll loop has returned.
pub fn print_stopping() {
    eprintln!();
    eprintln!("Stopping monitoring...");
}

/// Lifecycle report followed by final counters.
pub fn print_summary(lifecycles: &LifecycleTracker, metrics: MetricsSnapshot, stats: RunStats) {
    eprint!("{}", summary_text(lifecycles, metrics, stats));
}

/// Completion message after the log handle is released.
pub fn print_done() {
    eprintln!("{GREEN}Monitoring stopped.{RESET}");
}

fn summary_text(lifecycles: &LifecycleTracker, metrics: MetricsSnapshot, stats: RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = write!(out, "{lifecycles}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Metrics: active={} closing={} closed={}",
        metrics.active_connections, metrics.closing_connections, metrics.closed_connections
    );
    let _ = writeln!(
        out,
        "Events: received={} duplicates={} filtered={} emitted={}",
        stats.received, stats.duplicates, stats.filtered, stats.emitted
    );
    out
}
