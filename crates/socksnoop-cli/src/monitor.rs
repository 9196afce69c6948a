//! Monitoring session: startup, poll loop, shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use socksnoop_ebpf::perf::PerfSource;
use socksnoop_ebpf::platform;
use socksnoop_pipeline::pipeline::Pipeline;
use socksnoop_pipeline::sink::{LogTarget, Sink};

use crate::cli::Cli;
use crate::output;

/// Runs the monitor until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the platform is unsupported, the log target or
/// event source cannot be set up, or the interactive channel fails.
pub fn execute(cli: &Cli) -> anyhow::Result<()> {
    platform::ensure_supported()?;

    let config = cli.to_config();
    config.validate()?;

    let target = LogTarget::open(&config.log_file, &config.fallback_log_file)?;
    if target.fell_back() {
        output::print_fallback_warning(&config.log_file, target.path());
    }

    let mut source = PerfSource::attach(&cli.bpf_object)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {e}"))?;

    let sink = Sink::new(std::io::stdout(), target, config.format);
    let mut pipeline = Pipeline::new(&config, sink)?;
    output::print_banner(pipeline.sink().log().path());

    let stats = pipeline.run(&mut source, &shutdown)?;

    output::print_stopping();
    if !cli.no_summary {
        output::print_summary(pipeline.lifecycles(), pipeline.metrics(), stats);
    }
    drop(pipeline);
    output::print_done();

    Ok(())
}
