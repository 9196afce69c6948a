//! Configuration model for a monitoring session.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, SnoopError};

/// Serialization used for both the interactive channel and the durable log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// `<ts> <label>: SRC=a:p DST=a:p PID=n COMM=c STATE=s ID=digest`.
    Text,
}

/// User predicates applied to classified events.
///
/// Every present predicate must match; absent predicates impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Exact process id.
    pub pid: Option<u32>,
    /// Exact source address.
    pub src_ip: Option<Ipv4Addr>,
    /// Exact destination address.
    pub dst_ip: Option<Ipv4Addr>,
    /// Exact source port (host order).
    pub src_port: Option<u16>,
    /// Exact destination port (host order).
    pub dst_port: Option<u16>,
    /// Admit only established connections.
    pub established_only: bool,
    /// Drop events where either address is `0.0.0.0`.
    pub skip_unspecified: bool,
}

/// Root configuration for a monitoring session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Primary durable log target.
    pub log_file: PathBuf,
    /// Secondary target used when the primary is not accessible.
    pub fallback_log_file: PathBuf,
    /// Record serialization.
    pub format: OutputFormat,
    /// Signatures retained by the deduplication window.
    pub dedup_capacity: usize,
    /// Connections retained for the lifecycle report.
    pub lifecycle_capacity: usize,
    /// Event predicates.
    pub filter: FilterConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(constants::DEFAULT_LOG_FILE),
            fallback_log_file: PathBuf::from(constants::FALLBACK_LOG_FILE),
            format: OutputFormat::default(),
            dedup_capacity: constants::DEFAULT_DEDUP_CAPACITY,
            lifecycle_capacity: constants::DEFAULT_LIFECYCLE_CAPACITY,
            filter: FilterConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Checks values that would make the pipeline meaningless.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Config` if a capacity is zero or above
    /// [`constants::MAX_CAPACITY`].
    pub fn validate(&self) -> Result<()> {
        check_capacity("dedup", self.dedup_capacity)?;
        check_capacity("lifecycle", self.lifecycle_capacity)
    }
}

fn check_capacity(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(SnoopError::Config {
            message: format!("{name} capacity must be at least 1"),
        });
    }
    if value > constants::MAX_CAPACITY {
        return Err(SnoopError::Config {
            message: format!(
                "{name} capacity {value} exceeds the maximum of {}",
                constants::MAX_CAPACITY
            ),
        });
    }
    Ok(())
}
