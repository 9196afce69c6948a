//! Kernel record decoding.
//!
//! The tracepoint program submits a `#[repr(C)]` struct in native byte
//! order:
//!
//! | offset | field      | type       |
//! |--------|------------|------------|
//! | 0      | `pid`      | `u32`      |
//! | 4      | `ppid`     | `u32`      |
//! | 8      | `comm`     | `[u8; 16]` |
//! | 24     | `src_ip`   | `u32`      |
//! | 28     | `dst_ip`   | `u32`      |
//! | 32     | `src_port` | `u16`      |
//! | 34     | `dst_port` | `u16`      |
//! | 36     | `state`    | `i32`      |
//! | 40     | `event`    | `[u8; 16]` |
//! | 56     | `uid`      | `u32`      |
//!
//! Perf samples may carry trailing padding, which is ignored. A record
//! shorter than [`RECORD_SIZE`] means the object and this decoder disagree
//! on the layout, and is rejected.

use socksnoop_common::constants::EVENT_LABEL;
use socksnoop_common::error::{Result, SnoopError};
use socksnoop_common::types::{COMM_LEN, RawEvent};

/// Size in bytes of one kernel record.
pub const RECORD_SIZE: usize = 60;

const PID: usize = 0;
const PPID: usize = 4;
const COMM: usize = 8;
const SRC_IP: usize = 24;
const DST_IP: usize = 28;
const SRC_PORT: usize = 32;
const DST_PORT: usize = 34;
const STATE: usize = 36;
const EVENT: usize = 40;
const UID: usize = 56;

/// Decodes one kernel record.
///
/// # Errors
///
/// Returns `SnoopError::MalformedEvent` if `bytes` is shorter than
/// [`RECORD_SIZE`].
pub fn decode(bytes: &[u8]) -> Result<RawEvent> {
    if bytes.len() < RECORD_SIZE {
        return Err(SnoopError::MalformedEvent {
            expected: RECORD_SIZE,
            actual: bytes.len(),
        });
    }

    let mut comm = [0u8; COMM_LEN];
    comm.copy_from_slice(&bytes[COMM..COMM + COMM_LEN]);

    Ok(RawEvent {
        pid: read_u32(bytes, PID),
        ppid: read_u32(bytes, PPID),
        comm,
        src_addr: read_u32(bytes, SRC_IP),
        dst_addr: read_u32(bytes, DST_IP),
        src_port: read_u16(bytes, SRC_PORT),
        dst_port: read_u16(bytes, DST_PORT),
        state_code: read_i32(bytes, STATE),
        uid: read_u32(bytes, UID),
    })
}

/// Encodes an event in the kernel layout.
///
/// Used to replay captured records through [`decode`].
#[must_use]
pub fn encode(event: &RawEvent) -> Vec<u8> {
    let mut out = vec![0u8; RECORD_SIZE];
    out[PID..PID + 4].copy_from_slice(&event.pid.to_ne_bytes());
    out[PPID..PPID + 4].copy_from_slice(&event.ppid.to_ne_bytes());
    out[COMM..COMM + COMM_LEN].copy_from_slice(&event.comm);
    out[SRC_IP..SRC_IP + 4].copy_from_slice(&event.src_addr.to_ne_bytes());
    out[DST_IP..DST_IP + 4].copy_from_slice(&event.dst_addr.to_ne_bytes());
    out[SRC_PORT..SRC_PORT + 2].copy_from_slice(&event.src_port.to_ne_bytes());
    out[DST_PORT..DST_PORT + 2].copy_from_slice(&event.dst_port.to_ne_bytes());
    out[STATE..STATE + 4].copy_from_slice(&event.state_code.to_ne_bytes());
    let label = EVENT_LABEL.as_bytes();
    out[EVENT..EVENT + label.len()].copy_from_slice(label);
    out[UID..UID + 4].copy_from_slice(&event.uid.to_ne_bytes());
    out
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_ne_bytes(buf)
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_ne_bytes(buf)
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_ne_bytes(buf)
}
