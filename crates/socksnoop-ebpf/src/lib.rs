//! # socksnoop-ebpf
//!
//! Socket state event sources for the socksnoop pipeline.
//!
//! - **Live source**: loads a compiled tracepoint program on
//!   `sock/inet_sock_set_state` and reads one perf buffer per CPU.
//! - **Memory source**: replays pre-built batches deterministically.
//! - **Record decoding**: turns the fixed-shape kernel record into a
//!   [`socksnoop_common::types::RawEvent`].
//!
//! The `ebpf` feature flag must be enabled and the host must support
//! BPF for the live source to attach.

pub mod perf;
pub mod platform;
pub mod programs;
pub mod record;
pub mod source;
