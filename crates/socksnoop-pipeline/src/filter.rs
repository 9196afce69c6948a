//! User predicates gating delivery to the sink.

use socksnoop_common::config::FilterConfig;
use socksnoop_common::types::ConnectionState;

use crate::classifier::ClassifiedEvent;

/// Conjunction of the optional predicates in a [`FilterConfig`].
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    config: FilterConfig,
}

impl EventFilter {
    /// Wraps a predicate set.
    #[must_use]
    pub const fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Returns `true` if every present predicate matches `event`.
    #[must_use]
    pub fn matches(&self, event: &ClassifiedEvent) -> bool {
        let c = &self.config;
        c.pid.is_none_or(|pid| event.pid == pid)
            && c.src_ip.is_none_or(|ip| event.src_addr == ip)
            && c.dst_ip.is_none_or(|ip| event.dst_addr == ip)
            && c.src_port.is_none_or(|port| event.src_port == port)
            && c.dst_port.is_none_or(|port| event.dst_port == port)
            && (!c.established_only || event.state == ConnectionState::Established)
            && (!c.skip_unspecified
                || !(event.src_addr.is_unspecified() || event.dst_addr.is_unspecified()))
    }

    /// The predicate set in use.
    #[must_use]
    pub const fn config(&self) -> &FilterConfig {
        &self.config
    }
}
