//! Socket state tracepoint program.
//!
//! The compiled object must export a tracepoint program named
//! [`PROGRAM_NAME`] that filters on `AF_INET` and submits one record per
//! transition to the perf event array [`EVENTS_MAP`], laid out as described
//! in [`crate::record`].

/// Name of the tracepoint program inside the object file.
pub const PROGRAM_NAME: &str = "inet_sock_set_state";

/// Tracepoint category.
pub const TRACEPOINT_CATEGORY: &str = "sock";

/// Tracepoint name within [`TRACEPOINT_CATEGORY`].
pub const TRACEPOINT_NAME: &str = "inet_sock_set_state";

/// Perf event array the program submits records to.
pub const EVENTS_MAP: &str = "events";
