//! Host platform detection.

use socksnoop_common::error::Result;

/// Verifies that the host can run socket state tracing.
///
/// # Errors
///
/// Returns `SnoopError::UnsupportedPlatform` on anything but Linux.
#[cfg(target_os = "linux")]
pub const fn ensure_supported() -> Result<()> {
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — the tracepoint requires Linux.
#[cfg(not(target_os = "linux"))]
pub const fn ensure_supported() -> Result<()> {
    Err(socksnoop_common::error::SnoopError::UnsupportedPlatform {
        os: std::env::consts::OS,
    })
}
