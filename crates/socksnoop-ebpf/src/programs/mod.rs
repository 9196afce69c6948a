//! eBPF program definitions.
//!
//! Names and attachment points of the BPF programs loaded into the
//! kernel by the live event source.

pub mod socket;
