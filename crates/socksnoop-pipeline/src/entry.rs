//! The externally observable record.

use serde::{Deserialize, Serialize};
use socksnoop_common::config::OutputFormat;
use socksnoop_common::constants::{EVENT_LABEL, PROTOCOL_TAG};
use socksnoop_common::error::Result;

use crate::classifier::ClassifiedEvent;
use crate::identity::ConnectionId;
use crate::metrics::MetricsSnapshot;

/// One accepted event as written to the interactive channel and the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local time, millisecond precision.
    pub timestamp: String,
    /// Event kind label.
    pub event: String,
    /// Source address.
    pub src_ip: String,
    /// Destination address.
    pub dst_ip: String,
    /// Source port.
    pub src_port: u16,
    /// Destination port.
    pub dst_port: u16,
    /// Protocol tag.
    pub protocol: String,
    /// Human-readable state label.
    pub state: String,
    /// Four-tuple digest.
    pub connection_id: ConnectionId,
    /// Counters at emission time.
    pub metrics: MetricsSnapshot,
    /// Process id.
    pub pid: u32,
    /// Parent process id.
    pub ppid: u32,
    /// User id.
    pub uid: u32,
    /// Command name.
    pub comm: String,
}

impl LogEntry {
    /// Assembles a record from a classified event.
    #[must_use]
    pub fn new(
        timestamp: String,
        event: &ClassifiedEvent,
        connection_id: ConnectionId,
        metrics: MetricsSnapshot,
    ) -> Self {
        Self {
            timestamp,
            event: EVENT_LABEL.to_string(),
            src_ip: event.src_ip.clone(),
            dst_ip: event.dst_ip.clone(),
            src_port: event.src_port,
            dst_port: event.dst_port,
            protocol: PROTOCOL_TAG.to_string(),
            state: event.state.label().to_string(),
            connection_id,
            metrics,
            pid: event.pid,
            ppid: event.ppid,
            uid: event.uid,
            comm: event.comm.clone(),
        }
    }

    /// Renders the record as a single line.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Serialization` if JSON encoding fails.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string(self)?),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_text(&self) -> String {
        let m = &self.metrics;
        format!(
            "{} {}: SRC={}:{} DST={}:{} PROTO={} PID={} PPID={} UID={} COMM={} STATE={} ID={} \
             ACTIVE={} CLOSING={} CLOSED={}",
            self.timestamp,
            self.event,
            self.src_ip,
            self.src_port,
            self.dst_ip,
            self.dst_port,
            self.protocol,
            self.pid,
            self.ppid,
            self.uid,
            self.comm,
            self.state,
            self.connection_id,
            m.active_connections,
            m.closing_connections,
            m.closed_connections,
        )
    }
}
