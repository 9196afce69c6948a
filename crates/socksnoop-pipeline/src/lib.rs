//! # socksnoop-pipeline
//!
//! Turns raw socket state transitions into a filtered, deduplicated,
//! metrics-annotated audit stream.
//!
//! Each event flows through:
//! 1. [`classifier`]: transition code to [`ConnectionState`], addresses and ports to display form
//! 2. [`identity`]: four-tuple digest for correlation
//! 3. [`dedup`]: bounded FIFO window suppressing repeat deliveries
//! 4. [`metrics`]: active/closing/closed counters, updated for every novel event
//! 5. [`filter`]: user predicates gating delivery
//! 6. [`sink`]: interactive channel plus durable append log
//!
//! [`pipeline::Pipeline`] owns the only long-lived state and drives the
//! poll loop against an [`socksnoop_ebpf::source::EventSource`].
//!
//! [`ConnectionState`]: socksnoop_common::types::ConnectionState

pub mod classifier;
pub mod dedup;
pub mod entry;
pub mod filter;
pub mod identity;
pub mod lifecycle;
pub mod metrics;
pub mod pipeline;
pub mod sink;
