//! Domain primitive types used across the socksnoop workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of the kernel command-name buffer (`TASK_COMM_LEN`).
pub const COMM_LEN: usize = 16;

/// One socket state transition as delivered by the event source.
///
/// Addresses are packed most-significant-octet-first; ports are still in
/// network byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    /// Process id of the task that was current when the transition fired.
    pub pid: u32,
    /// Parent process id of that task.
    pub ppid: u32,
    /// Command name, NUL-padded.
    pub comm: [u8; COMM_LEN],
    /// Source IPv4 address.
    pub src_addr: u32,
    /// Destination IPv4 address.
    pub dst_addr: u32,
    /// Source port, network byte order.
    pub src_port: u16,
    /// Destination port, network byte order.
    pub dst_port: u16,
    /// Kernel transition code (`newstate`).
    pub state_code: i32,
    /// Owning user id.
    pub uid: u32,
}

impl RawEvent {
    /// Returns the command name up to the first NUL byte.
    #[must_use]
    pub fn comm_str(&self) -> String {
        let end = self
            .comm
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(COMM_LEN);
        String::from_utf8_lossy(&self.comm[..end]).into_owned()
    }

    /// Packs a command name into a NUL-padded buffer, truncating to fit.
    #[must_use]
    pub fn pack_comm(name: &str) -> [u8; COMM_LEN] {
        let mut comm = [0u8; COMM_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(COMM_LEN - 1);
        comm[..len].copy_from_slice(&bytes[..len]);
        comm
    }
}

/// Semantic connection state derived from a transition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Fully connected.
    Established,
    /// Active open in progress.
    SynSent,
    /// Passive open in progress.
    SynRecv,
    /// Local close started.
    FinWait1,
    /// Local close acknowledged.
    FinWait2,
    /// Waiting out stray segments after close.
    TimeWait,
    /// No connection.
    Closed,
    /// Peer closed, local side still open.
    CloseWait,
    /// Waiting for the final acknowledgement.
    LastAck,
    /// Accepting connections.
    Listen,
    /// Simultaneous close.
    Closing,
    /// Transition code outside the known table.
    Unknown,
}

/// Coarse grouping of [`ConnectionState`] used by the aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatePhase {
    /// The established state.
    Active,
    /// Handshake in progress.
    Opening,
    /// Teardown in progress.
    Closing,
    /// Teardown finished.
    Closed,
    /// Listening socket.
    Listening,
    /// Unmapped code.
    Unknown,
}

impl ConnectionState {
    /// Human-readable label written to every record.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Established => "Connection Established",
            Self::SynSent => "Connection Opening (SYN_SENT)",
            Self::SynRecv => "Connection Opening (SYN_RECV)",
            Self::FinWait1 => "Connection Closing (FIN_WAIT1)",
            Self::FinWait2 => "Connection Closing (FIN_WAIT2)",
            Self::TimeWait => "Connection Closed (TIME_WAIT)",
            Self::Closed => "Connection Closed",
            Self::CloseWait => "Connection Closing (CLOSE_WAIT)",
            Self::LastAck => "Connection Closing (LAST_ACK)",
            Self::Listen => "Listening for Connections",
            Self::Closing => "Connection Closing (CLOSING)",
            Self::Unknown => "UNKNOWN STATE",
        }
    }

    /// Returns the phase this state belongs to.
    #[must_use]
    pub const fn phase(self) -> StatePhase {
        match self {
            Self::Established => StatePhase::Active,
            Self::SynSent | Self::SynRecv => StatePhase::Opening,
            Self::FinWait1 | Self::FinWait2 | Self::CloseWait | Self::LastAck | Self::Closing => {
                StatePhase::Closing
            }
            Self::TimeWait | Self::Closed => StatePhase::Closed,
            Self::Listen => StatePhase::Listening,
            Self::Unknown => StatePhase::Unknown,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
