//! Unified error types for the socksnoop workspace.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum SnoopError {
    /// An I/O operation on a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// The host operating system cannot run the kernel tracepoint.
    #[error("unsupported operating system: {os} (socket tracing requires Linux with eBPF)")]
    UnsupportedPlatform {
        /// Name of the detected operating system.
        os: &'static str,
    },

    /// The kernel event source could not be loaded or attached.
    #[error("event source attachment failed: {message}")]
    Attach {
        /// Description of the failed step.
        message: String,
    },

    /// The event source failed while delivering events.
    #[error("event source failed: {message}")]
    Source {
        /// Description of the failure.
        message: String,
    },

    /// A raw record did not have the fixed kernel record shape.
    #[error("malformed event record: expected at least {expected} bytes, got {actual}")]
    MalformedEvent {
        /// Minimum record size in bytes.
        expected: usize,
        /// Size of the record actually delivered.
        actual: usize,
    },

    /// Writing to the interactive output channel failed.
    #[error("interactive output failed: {source}")]
    Output {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, SnoopError>;
