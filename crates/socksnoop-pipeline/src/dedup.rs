//! Bounded suppression of repeated deliveries.
//!
//! The same transition can reach user space more than once, for example
//! once per observing CPU. The window remembers the most recent
//! signatures in insertion order and evicts the oldest once full, so a
//! very old repeat may pass again as novel.

use std::collections::{HashSet, VecDeque};

/// Deduplication key for one logical event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventSignature {
    /// Source address, dotted decimal.
    pub src_ip: String,
    /// Source port, host order.
    pub src_port: u16,
    /// Destination address, dotted decimal.
    pub dst_ip: String,
    /// Destination port, host order.
    pub dst_port: u16,
    /// Process id.
    pub pid: u32,
    /// Raw transition code.
    pub state_code: i32,
}

/// Fixed-capacity FIFO window of recently seen signatures.
#[derive(Debug)]
pub struct Deduplicator {
    capacity: usize,
    seen: HashSet<EventSignature>,
    order: VecDeque<EventSignature>,
}

impl Deduplicator {
    /// Creates an empty window holding at most `capacity` signatures.
    ///
    /// A zero capacity is raised to one. Storage grows with use.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            seen: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// Records `signature`, returning `true` if it was not in the window.
    pub fn observe(&mut self, signature: EventSignature) -> bool {
        if self.seen.contains(&signature) {
            return false;
        }
        self.order.push_back(signature.clone());
        let _ = self.seen.insert(signature);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                let _ = self.seen.remove(&oldest);
            }
        }
        true
    }

    /// Number of signatures currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Maximum number of signatures held.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(src_port: u16) -> EventSignature {
        EventSignature {
            src_ip: "10.0.0.1".into(),
            src_port,
            dst_ip: "10.0.0.2".into(),
            dst_port: 443,
            pid: 500,
            state_code: 4,
        }
    }

    #[test]
    fn repeat_within_window_is_suppressed() {
        let mut dedup = Deduplicator::new(8);
        assert!(dedup.observe(sig(5000)));
        assert!(!dedup.observe(sig(5000)));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn differing_state_is_novel() {
        let mut dedup = Deduplicator::new(8);
        let mut other = sig(5000);
        other.state_code = 5;
        assert!(dedup.observe(sig(5000)));
        assert!(dedup.observe(other));
    }

    #[test]
    fn oldest_signature_is_evicted_first() {
        let capacity = 3;
        let mut dedup = Deduplicator::new(capacity);
        for port in 0..=3 {
            assert!(dedup.observe(sig(port)));
        }
        assert_eq!(dedup.len(), capacity);
        // port 0 was evicted by the fourth insert, port 1 is still held
        assert!(!dedup.observe(sig(1)));
        assert!(dedup.observe(sig(0)));
    }

    #[test]
    fn duplicates_do_not_refresh_position() {
        let mut dedup = Deduplicator::new(2);
        assert!(dedup.observe(sig(1)));
        assert!(dedup.observe(sig(2)));
        assert!(!dedup.observe(sig(1)));
        assert!(dedup.observe(sig(3)));
        assert!(dedup.observe(sig(1)));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut dedup = Deduplicator::new(10);
        for port in 0..100 {
            let _ = dedup.observe(sig(port));
            assert!(dedup.len() <= dedup.capacity());
        }
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut dedup = Deduplicator::new(0);
        assert_eq!(dedup.capacity(), 1);
        assert!(dedup.is_empty());
        assert!(dedup.observe(sig(1)));
        assert!(!dedup.observe(sig(1)));
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut dedup = Deduplicator::new(usize::MAX);
        assert_eq!(dedup.capacity(), usize::MAX);
        assert!(dedup.observe(sig(1)));
        assert!(!dedup.observe(sig(1)));
        assert_eq!(dedup.len(), 1);
    }
}
