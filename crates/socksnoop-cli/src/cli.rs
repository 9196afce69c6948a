//! Command-line arguments.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use socksnoop_common::config::{FilterConfig, MonitorConfig, OutputFormat};
use socksnoop_common::constants;

/// socksnoop — real-time socket state monitoring via eBPF.
#[derive(Parser, Debug)]
#[command(name = "socksnoop", version, about, long_about = None)]
pub struct Cli {
    /// Only report events from this process id.
    #[arg(long)]
    pub pid: Option<u32>,

    /// Only report events with this source IPv4 address.
    #[arg(long)]
    pub src_ip: Option<Ipv4Addr>,

    /// Only report events with this destination IPv4 address.
    #[arg(long)]
    pub dst_ip: Option<Ipv4Addr>,

    /// Only report events with this source port.
    #[arg(long)]
    pub src_port: Option<u16>,

    /// Only report events with this destination port.
    #[arg(long)]
    pub dst_port: Option<u16>,

    /// Only report established connections.
    #[arg(long)]
    pub active_only: bool,

    /// Drop events whose source or destination is 0.0.0.0.
    #[arg(long)]
    pub skip_unspecified: bool,

    /// Durable log file.
    #[arg(long, env = constants::LOG_FILE_ENV, default_value = constants::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log file used when --log-file is not writable.
    #[arg(long, default_value = constants::FALLBACK_LOG_FILE)]
    pub fallback_log_file: PathBuf,

    /// Number of recent events remembered for duplicate suppression.
    #[arg(long, default_value_t = constants::DEFAULT_DEDUP_CAPACITY)]
    pub dedup_capacity: usize,

    /// Record format for stdout and the log file.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Compiled tracepoint object to load.
    #[arg(long, env = constants::BPF_OBJECT_ENV, default_value = constants::DEFAULT_BPF_OBJECT)]
    pub bpf_object: PathBuf,

    /// Do not print the connection lifecycle report on exit.
    #[arg(long)]
    pub no_summary: bool,
}

/// Record format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One JSON object per line.
    Json,
    /// Human-readable single line.
    Text,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => Self::Json,
            Format::Text => Self::Text,
        }
    }
}

impl Cli {
    /// Builds the session configuration from the parsed flags.
    pub fn to_config(&self) -> MonitorConfig {
        MonitorConfig {
            log_file: self.log_file.clone(),
            fallback_log_file: self.fallback_log_file.clone(),
            format: self.format.into(),
            dedup_capacity: self.dedup_capacity,
            filter: FilterConfig {
                pid: self.pid,
                src_ip: self.src_ip,
                dst_ip: self.dst_ip,
                src_port: self.src_port,
                dst_port: self.dst_port,
                established_only: self.active_only,
                skip_unspecified: self.skip_unspecified,
            },
            ..MonitorConfig::default()
        }
    }
}
