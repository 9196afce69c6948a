//! Event source capability.
//!
//! The pipeline depends only on [`EventSource`]; the live perf-buffer
//! binding and the in-memory feed both implement it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

use socksnoop_common::error::Result;
use socksnoop_common::types::RawEvent;

/// A blocking, cancellable producer of raw socket events.
pub trait EventSource {
    /// Blocks until at least one event is available, the stream ends, or
    /// `shutdown` is raised.
    ///
    /// An empty batch means no further events will be delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails or delivers a
    /// malformed record.
    fn poll(&mut self, shutdown: &AtomicBool) -> Result<Vec<RawEvent>>;
}

/// Deterministic source replaying pre-built batches in order.
#[derive(Debug, Default)]
pub struct MemorySource {
    batches: VecDeque<Vec<RawEvent>>,
}

impl MemorySource {
    /// Creates a source that yields `batches` one per poll.
    #[must_use]
    pub fn new(batches: Vec<Vec<RawEvent>>) -> Self {
        Self {
            batches: batches.into_iter().filter(|b| !b.is_empty()).collect(),
        }
    }

    /// Creates a source that yields each event in its own batch.
    #[must_use]
    pub fn from_events(events: Vec<RawEvent>) -> Self {
        Self::new(events.into_iter().map(|e| vec![e]).collect())
    }

    /// Queues another batch behind the existing ones.
    pub fn push_batch(&mut self, batch: Vec<RawEvent>) {
        if !batch.is_empty() {
            self.batches.push_back(batch);
        }
    }

    /// Number of batches not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl EventSource for MemorySource {
    fn poll(&mut self, shutdown: &AtomicBool) -> Result<Vec<RawEvent>> {
        if shutdown.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}
