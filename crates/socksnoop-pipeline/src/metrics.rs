//! Live connection counters.
//!
//! Updated once per novel classified event, before user filtering.

use serde::{Deserialize, Serialize};
use socksnoop_common::types::{ConnectionState, StatePhase};

/// Point-in-time copy of the aggregate counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Established connections not yet seen closing.
    pub active_connections: u64,
    /// Closing transitions observed.
    pub closing_connections: u64,
    /// Closed transitions observed.
    pub closed_connections: u64,
}

/// Running active/closing/closed counters.
#[derive(Debug, Default)]
pub struct ConnectionMetrics {
    current: MetricsSnapshot,
}

impl ConnectionMetrics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one classified transition.
    pub fn record(&mut self, state: ConnectionState) {
        let counters = &mut self.current;
        match state.phase() {
            StatePhase::Active => counters.active_connections += 1,
            StatePhase::Closing => counters.closing_connections += 1,
            StatePhase::Closed => {
                counters.active_connections = counters.active_connections.saturating_sub(1);
                counters.closed_connections += 1;
            }
            StatePhase::Opening | StatePhase::Listening | StatePhase::Unknown => {}
        }
    }

    /// Returns a copy of the current counters.
    #[must_use]
    pub const fn snapshot(&self) -> MetricsSnapshot {
        self.current
    }
}
