//! Per-connection transition history for the shutdown report.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use socksnoop_common::constants::MAX_TRANSITIONS_PER_CONNECTION;
use socksnoop_common::types::ConnectionState;

/// One reported transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Record timestamp.
    pub timestamp: String,
    /// State entered.
    pub state: ConnectionState,
}

/// Bounded history of emitted transitions, keyed by `src:port -> dst:port`.
///
/// Connections are evicted oldest-first once `capacity` is reached; each
/// keeps its latest [`MAX_TRANSITIONS_PER_CONNECTION`] transitions.
#[derive(Debug)]
pub struct LifecycleTracker {
    capacity: usize,
    histories: HashMap<String, VecDeque<Transition>>,
    order: VecDeque<String>,
}

impl LifecycleTracker {
    /// Creates an empty tracker holding at most `capacity` connections.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            histories: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Appends a transition to the history of `endpoints`.
    pub fn record(&mut self, endpoints: &str, timestamp: &str, state: ConnectionState) {
        if !self.histories.contains_key(endpoints) {
            if self.order.len() == self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    let _ = self.histories.remove(&oldest);
                }
            }
            self.order.push_back(endpoints.to_string());
        }

        let history = self.histories.entry(endpoints.to_string()).or_default();
        if history.len() == MAX_TRANSITIONS_PER_CONNECTION {
            let _ = history.pop_front();
        }
        history.push_back(Transition {
            timestamp: timestamp.to_string(),
            state,
        });
    }

    /// Number of connections tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no transition has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// History of one connection, oldest first.
    pub fn history(&self, endpoints: &str) -> Option<impl Iterator<Item = &Transition>> {
        self.histories.get(endpoints).map(|h| h.iter())
    }
}

impl fmt::Display for LifecycleTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connection Lifecycles:")?;
        for endpoints in &self.order {
            writeln!(f, "Connection: {endpoints}")?;
            if let Some(history) = self.histories.get(endpoints) {
                for t in history {
                    writeln!(f, "  {}: {}", t.timestamp, t.state)?;
                }
            }
        }
        Ok(())
    }
}
