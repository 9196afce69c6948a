//! Transition code classification and address formatting.

use std::net::Ipv4Addr;

use socksnoop_common::types::{ConnectionState, RawEvent};

use crate::dedup::EventSignature;

/// Maps a kernel transition code to a connection state.
///
/// Total: codes outside the table yield [`ConnectionState::Unknown`].
#[must_use]
pub const fn classify_state(code: i32) -> ConnectionState {
    match code {
        1 => ConnectionState::Established,
        2 => ConnectionState::SynSent,
        3 => ConnectionState::SynRecv,
        4 => ConnectionState::FinWait1,
        5 => ConnectionState::FinWait2,
        6 => ConnectionState::TimeWait,
        7 => ConnectionState::Closed,
        8 => ConnectionState::CloseWait,
        9 => ConnectionState::LastAck,
        10 => ConnectionState::Listen,
        11 => ConnectionState::Closing,
        _ => ConnectionState::Unknown,
    }
}

/// Formats a packed address (first octet in the high byte) as dotted decimal.
#[must_use]
pub fn format_addr(raw: u32) -> String {
    Ipv4Addr::from(raw).to_string()
}

/// Converts a network-order port to host order.
#[must_use]
pub const fn host_port(raw: u16) -> u16 {
    u16::from_be(raw)
}

/// A raw event with its state and endpoints resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    /// Process id.
    pub pid: u32,
    /// Parent process id.
    pub ppid: u32,
    /// Owning user id.
    pub uid: u32,
    /// Command name.
    pub comm: String,
    /// Source address.
    pub src_addr: Ipv4Addr,
    /// Destination address.
    pub dst_addr: Ipv4Addr,
    /// Source address, dotted decimal.
    pub src_ip: String,
    /// Destination address, dotted decimal.
    pub dst_ip: String,
    /// Source port, host order.
    pub src_port: u16,
    /// Destination port, host order.
    pub dst_port: u16,
    /// Transition code as delivered.
    pub state_code: i32,
    /// Classified state.
    pub state: ConnectionState,
}

impl ClassifiedEvent {
    /// Deduplication key for this event.
    #[must_use]
    pub fn signature(&self) -> EventSignature {
        EventSignature {
            src_ip: self.src_ip.clone(),
            src_port: self.src_port,
            dst_ip: self.dst_ip.clone(),
            dst_port: self.dst_port,
            pid: self.pid,
            state_code: self.state_code,
        }
    }

    /// `src:port -> dst:port`, the key used by the lifecycle report.
    #[must_use]
    pub fn endpoints(&self) -> String {
        format!(
            "{}:{} -> {}:{}",
            self.src_ip, self.src_port, self.dst_ip, self.dst_port
        )
    }
}

/// Classifies a raw event.
#[must_use]
pub fn classify(raw: &RawEvent) -> ClassifiedEvent {
    let src_addr = Ipv4Addr::from(raw.src_addr);
    let dst_addr = Ipv4Addr::from(raw.dst_addr);
    ClassifiedEvent {
        pid: raw.pid,
        ppid: raw.ppid,
        uid: raw.uid,
        comm: raw.comm_str(),
        src_addr,
        dst_addr,
        src_ip: format_addr(raw.src_addr),
        dst_ip: format_addr(raw.dst_addr),
        src_port: host_port(raw.src_port),
        dst_port: host_port(raw.dst_port),
        state_code: raw.state_code,
        state: classify_state(raw.state_code),
    }
}
