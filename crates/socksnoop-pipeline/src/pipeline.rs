//! Pipeline instance and poll loop.
//!
//! One `Pipeline` owns the dedup window, the counters and the open log
//! handle. Events are processed one at a time to completion, so the
//! instance needs no locking; share it across threads only behind a
//! single mutex.

use std::io::Write;
use std::sync::atomic::AtomicBool;

use socksnoop_common::config::MonitorConfig;
use socksnoop_common::constants::TIMESTAMP_FORMAT;
use socksnoop_common::error::Result;
use socksnoop_common::types::RawEvent;
use socksnoop_ebpf::source::EventSource;

use crate::classifier;
use crate::dedup::Deduplicator;
use crate::entry::LogEntry;
use crate::filter::EventFilter;
use crate::identity::ConnectionId;
use crate::lifecycle::LifecycleTracker;
use crate::metrics::{ConnectionMetrics, MetricsSnapshot};
use crate::sink::Sink;

/// What happened to one raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Same signature already in the dedup window.
    Duplicate,
    /// Counted, but rejected by the user filter.
    Filtered,
    /// Counted and delivered.
    Emitted(Box<LogEntry>),
}

/// Per-run counts of event outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Raw events received from the source.
    pub received: u64,
    /// Events suppressed as duplicates.
    pub duplicates: u64,
    /// Events rejected by the filter.
    pub filtered: u64,
    /// Events delivered to the sink.
    pub emitted: u64,
}

/// The event-processing pipeline.
#[derive(Debug)]
pub struct Pipeline<W: Write> {
    dedup: Deduplicator,
    metrics: ConnectionMetrics,
    filter: EventFilter,
    sink: Sink<W>,
    lifecycles: LifecycleTracker,
    stats: RunStats,
}

impl<W: Write> Pipeline<W> {
    /// Builds a pipeline from a validated configuration and an open sink.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Config` if the configuration is invalid.
    pub fn new(config: &MonitorConfig, sink: Sink<W>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dedup: Deduplicator::new(config.dedup_capacity),
            metrics: ConnectionMetrics::new(),
            filter: EventFilter::new(config.filter.clone()),
            sink,
            lifecycles: LifecycleTracker::new(config.lifecycle_capacity),
            stats: RunStats::default(),
        })
    }

    /// Classifies, deduplicates, counts, filters and delivers one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the interactive channel cannot be written.
    pub fn process(&mut self, raw: &RawEvent) -> Result<Disposition> {
        self.stats.received += 1;
        let event = classifier::classify(raw);
        let connection_id =
            ConnectionId::derive(&event.src_ip, event.src_port, &event.dst_ip, event.dst_port);

        if !self.dedup.observe(event.signature()) {
            self.stats.duplicates += 1;
            tracing::trace!(pid = event.pid, state = %event.state, "duplicate suppressed");
            return Ok(Disposition::Duplicate);
        }

        self.metrics.record(event.state);

        if !self.filter.matches(&event) {
            self.stats.filtered += 1;
            return Ok(Disposition::Filtered);
        }

        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let entry = LogEntry::new(timestamp, &event, connection_id, self.metrics.snapshot());
        self.sink.emit(&entry)?;
        self.lifecycles
            .record(&event.endpoints(), &entry.timestamp, event.state);
        self.stats.emitted += 1;

        Ok(Disposition::Emitted(Box::new(entry)))
    }

    /// Polls `source` and processes every event until it yields an empty
    /// batch.
    ///
    /// A batch already received is processed in full even if `shutdown`
    /// is raised meanwhile.
    ///
    /// # Errors
    ///
    /// Returns an error if the source fails or the interactive channel
    /// cannot be written.
    pub fn run<S: EventSource + ?Sized>(
        &mut self,
        source: &mut S,
        shutdown: &AtomicBool,
    ) -> Result<RunStats> {
        loop {
            let batch = source.poll(shutdown)?;
            if batch.is_empty() {
                break;
            }
            for raw in &batch {
                let _ = self.process(raw)?;
            }
        }
        tracing::info!(
            received = self.stats.received,
            duplicates = self.stats.duplicates,
            filtered = self.stats.filtered,
            emitted = self.stats.emitted,
            "poll loop finished"
        );
        Ok(self.stats)
    }

    /// Current counters.
    pub const fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Outcome counts so far.
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Transition history of emitted events.
    pub const fn lifecycles(&self) -> &LifecycleTracker {
        &self.lifecycles
    }

    /// The sink in use.
    pub const fn sink(&self) -> &Sink<W> {
        &self.sink
    }

    /// Consumes the pipeline, closing the log file.
    pub fn into_sink(self) -> Sink<W> {
        self.sink
    }
}
