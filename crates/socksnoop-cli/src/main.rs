//! # socksnoop — socket lifecycle monitor
//!
//! Streams kernel TCP state transitions as a deduplicated, filtered
//! audit log with live connection counters.

mod cli;
mod logging;
mod monitor;
mod output;

use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    logging::init();

    let cli = Cli::parse();
    monitor::execute(&cli)
}
