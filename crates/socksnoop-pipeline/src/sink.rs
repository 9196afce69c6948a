//! Delivery of accepted events.
//!
//! Every record goes to an interactive writer (normally stdout) and is
//! appended to a durable log file. The interactive write must succeed;
//! log appends are best-effort.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use socksnoop_common::config::OutputFormat;
use socksnoop_common::constants::{LOG_HEADER_RULE_WIDTH, LOG_HEADER_TITLE};
use socksnoop_common::error::{Result, SnoopError};

use crate::entry::LogEntry;

/// Returns `true` if `err` means the path is not writable by us.
#[must_use]
pub fn is_access_failure(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem
    )
}

/// An open append-only log file.
#[derive(Debug)]
pub struct LogTarget {
    path: PathBuf,
    file: File,
    fell_back: bool,
}

impl LogTarget {
    /// Opens `primary`, substituting `fallback` if `primary` is not writable.
    ///
    /// A newly created file receives the two-line header.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Io` if `primary` fails for a reason other than
    /// access, or if `fallback` cannot be opened either.
    pub fn open(primary: &Path, fallback: &Path) -> Result<Self> {
        match open_append(primary) {
            Ok(file) => Ok(Self {
                path: primary.to_path_buf(),
                file,
                fell_back: false,
            }),
            Err(e) => Self::recover(primary, fallback, e),
        }
    }

    /// Decides what to do after opening `primary` failed with `err`.
    ///
    /// Access failures switch to `fallback`; anything else is fatal.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Io` for `primary` if `err` is not an access
    /// failure, or for `fallback` if it cannot be opened.
    pub fn recover(primary: &Path, fallback: &Path, err: io::Error) -> Result<Self> {
        if !is_access_failure(&err) {
            return Err(SnoopError::Io {
                path: primary.to_path_buf(),
                source: err,
            });
        }
        tracing::warn!(
            primary = %primary.display(),
            fallback = %fallback.display(),
            error = %err,
            "log target not writable, falling back"
        );
        let file = open_append(fallback).map_err(|source| SnoopError::Io {
            path: fallback.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: fallback.to_path_buf(),
            file,
            fell_back: true,
        })
    }

    /// Path of the file actually in use.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the fallback target is in use.
    #[must_use]
    pub const fn fell_back(&self) -> bool {
        self.fell_back
    }

    /// Appends one line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write fails.
    pub fn append(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.file, "{line}")
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    match OpenOptions::new().append(true).create_new(true).open(path) {
        Ok(mut file) => {
            writeln!(file, "{LOG_HEADER_TITLE}")?;
            writeln!(file, "{}", "=".repeat(LOG_HEADER_RULE_WIDTH))?;
            tracing::debug!(path = %path.display(), "created log file");
            Ok(file)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            OpenOptions::new().append(true).open(path)
        }
        Err(e) => Err(e),
    }
}

/// Fan-out of accepted records.
#[derive(Debug)]
pub struct Sink<W: Write> {
    interactive: W,
    log: LogTarget,
    format: OutputFormat,
    append_failures: u64,
}

impl<W: Write> Sink<W> {
    /// Creates a sink writing `format` records to both channels.
    pub const fn new(interactive: W, log: LogTarget, format: OutputFormat) -> Self {
        Self {
            interactive,
            log,
            format,
            append_failures: 0,
        }
    }

    /// Delivers one record.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Output` if the interactive write fails. Log
    /// append failures are reported and skipped.
    pub fn emit(&mut self, entry: &LogEntry) -> Result<()> {
        let line = entry.render(self.format)?;

        writeln!(self.interactive, "{line}")
            .and_then(|()| self.interactive.flush())
            .map_err(|source| SnoopError::Output { source })?;

        if let Err(e) = self.log.append(&line) {
            self.append_failures += 1;
            tracing::error!(
                path = %self.log.path().display(),
                error = %e,
                failures = self.append_failures,
                "log write failed"
            );
        }
        Ok(())
    }

    /// The durable log target.
    pub const fn log(&self) -> &LogTarget {
        &self.log
    }

    /// Number of log appends that failed so far.
    pub const fn append_failures(&self) -> u64 {
        self.append_failures
    }

    /// Consumes the sink, releasing the log handle.
    pub fn into_interactive(self) -> W {
        self.interactive
    }
}
