//! Connection identity derived from the four-tuple.
//!
//! The digest is for correlating records across a log, nothing more.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of `src:sport->dst:dport`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Derives the identity of a connection direction.
    #[must_use]
    pub fn derive(src_ip: &str, src_port: u16, dst_ip: &str, dst_port: u16) -> Self {
        let canonical = format!("{src_ip}:{src_port}->{dst_ip}:{dst_port}");
        let digest = Sha256::digest(canonical.as_bytes());
        Self(format!("{digest:x}"))
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
