//! End-to-end tests for the socket lifecycle pipeline.
//!
//! Events are replayed through a `MemorySource`, interactive output is
//! captured in memory, and the durable log lives in a temp directory.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use socksnoop_common::config::{FilterConfig, MonitorConfig, OutputFormat};
use socksnoop_common::types::RawEvent;
use socksnoop_ebpf::record;
use socksnoop_ebpf::source::MemorySource;
use socksnoop_pipeline::entry::LogEntry;
use socksnoop_pipeline::metrics::MetricsSnapshot;
use socksnoop_pipeline::pipeline::{Disposition, Pipeline};
use socksnoop_pipeline::sink::{LogTarget, Sink};

// ── Helpers ──────────────────────────────────────────────────────────

fn raw(pid: u32, state_code: i32, src: (Ipv4Addr, u16), dst: (Ipv4Addr, u16)) -> RawEvent {
    RawEvent {
        pid,
        ppid: 1,
        comm: RawEvent::pack_comm("curl"),
        src_addr: u32::from(src.0),
        dst_addr: u32::from(dst.0),
        src_port: src.1.to_be(),
        dst_port: dst.1.to_be(),
        state_code,
        uid: 1000,
    }
}

fn conn(pid: u32, state_code: i32) -> RawEvent {
    raw(
        pid,
        state_code,
        (Ipv4Addr::new(10, 0, 0, 1), 5000),
        (Ipv4Addr::new(10, 0, 0, 2), 443),
    )
}

fn build(dir: &Path, config: MonitorConfig) -> Pipeline<Vec<u8>> {
    let target = LogTarget::open(&config.log_file, &config.fallback_log_file).expect("open log");
    assert!(target.path().starts_with(dir));
    let sink = Sink::new(Vec::new(), target, config.format);
    Pipeline::new(&config, sink).expect("pipeline")
}

fn config_in(dir: &Path) -> MonitorConfig {
    MonitorConfig {
        log_file: dir.join("socket_monitor.log"),
        fallback_log_file: dir.join("fallback.log"),
        ..MonitorConfig::default()
    }
}

fn run_all(pipeline: &mut Pipeline<Vec<u8>>, events: Vec<RawEvent>) {
    let mut source = MemorySource::from_events(events);
    let _ = pipeline
        .run(&mut source, &AtomicBool::new(false))
        .expect("run");
}

fn emitted(pipeline: Pipeline<Vec<u8>>) -> Vec<LogEntry> {
    let out = String::from_utf8(pipeline.into_sink().into_interactive()).expect("utf8");
    out.lines()
        .map(|l| serde_json::from_str(l).expect("json line"))
        .collect()
}

fn log_records(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("read log")
        .lines()
        .skip(2)
        .map(str::to_string)
        .collect()
}

// ── Scenarios ────────────────────────────────────────────────────────

#[test]
fn established_event_is_counted_and_logged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let log_file = config.log_file.clone();
    let mut pipeline = build(dir.path(), config);

    run_all(&mut pipeline, vec![conn(500, 1)]);
    assert_eq!(pipeline.metrics().active_connections, 1);

    let entries = emitted(pipeline);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].state, "Connection Established");
    assert_eq!(entries[0].src_ip, "10.0.0.1");
    assert_eq!(entries[0].src_port, 5000);
    assert_eq!(entries[0].dst_port, 443);
    assert_eq!(entries[0].pid, 500);
    assert_eq!(entries[0].metrics.active_connections, 1);
    assert_eq!(log_records(&log_file).len(), 1);
}

#[test]
fn duplicate_fin_wait1_is_emitted_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let log_file = config.log_file.clone();
    let mut pipeline = build(dir.path(), config);

    run_all(&mut pipeline, vec![conn(500, 4), conn(500, 4)]);
    assert_eq!(pipeline.metrics().closing_connections, 1);
    assert_eq!(pipeline.stats().duplicates, 1);

    let entries = emitted(pipeline);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].state, "Connection Closing (FIN_WAIT1)");
    assert_eq!(log_records(&log_file).len(), 1);
}

#[test]
fn unknown_state_is_emitted_without_touching_metrics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pipeline = build(dir.path(), config_in(dir.path()));

    let disposition = pipeline.process(&conn(500, 99)).expect("process");
    let Disposition::Emitted(entry) = disposition else {
        panic!("unknown state should still be emitted");
    };
    assert_eq!(entry.state, "UNKNOWN STATE");
    assert_eq!(pipeline.metrics(), MetricsSnapshot::default());
}

#[test]
fn read_only_primary_falls_back_to_secondary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = MonitorConfig {
        log_file: dir.path().join("locked").join("socket_monitor.log"),
        fallback_log_file: dir.path().join("socket_monitor.log"),
        ..MonitorConfig::default()
    };
    let target = LogTarget::recover(
        &config.log_file,
        &config.fallback_log_file,
        io::Error::from(io::ErrorKind::ReadOnlyFilesystem),
    )
    .expect("fallback");
    assert!(target.fell_back());
    assert_eq!(target.path(), config.fallback_log_file);

    let mut pipeline =
        Pipeline::new(&config, Sink::new(Vec::new(), target, OutputFormat::Json)).expect("new");
    run_all(&mut pipeline, vec![conn(500, 1), conn(500, 7)]);
    assert_eq!(pipeline.sink().append_failures(), 0);
    drop(pipeline);

    assert_eq!(log_records(&config.fallback_log_file).len(), 2);
    assert!(!config.log_file.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn failing_log_appends_do_not_stop_delivery_or_counting() {
    let events = vec![conn(500, 1), conn(500, 4), conn(501, 1), conn(500, 7)];

    let dir = tempfile::tempdir().expect("tempdir");
    let mut healthy = build(dir.path(), config_in(dir.path()));
    run_all(&mut healthy, events.clone());

    let config = MonitorConfig {
        log_file: "/dev/full".into(),
        ..config_in(dir.path())
    };
    let target = LogTarget::open(&config.log_file, &config.fallback_log_file).expect("open");
    assert!(!target.fell_back());
    let mut full =
        Pipeline::new(&config, Sink::new(Vec::new(), target, OutputFormat::Json)).expect("new");

    let _ = full.process(&events[0]).expect("process");
    assert_eq!(full.sink().append_failures(), 1);
    run_all(&mut full, events[1..].to_vec());

    assert_eq!(full.sink().append_failures(), 4);
    assert_eq!(full.stats().emitted, 4);
    assert_eq!(full.metrics(), healthy.metrics());

    let observed: Vec<_> = emitted(full).into_iter().map(|e| (e.state, e.metrics)).collect();
    let expected: Vec<_> = emitted(healthy).into_iter().map(|e| (e.state, e.metrics)).collect();
    assert_eq!(observed, expected);
}

// ── Properties ───────────────────────────────────────────────────────

#[test]
fn counters_never_go_negative_for_arbitrary_orderings() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pipeline = build(dir.path(), config_in(dir.path()));

    // closes before any establish, interleaved with unknown codes
    let codes = [7, 6, 7, 1, 6, 6, 99, 4, 7, 1, 1, 0, 11, 7, 7, 7];
    let mut last = MetricsSnapshot::default();
    for (i, code) in codes.iter().enumerate() {
        let port = u16::try_from(i).unwrap() + 1000;
        let event = raw(
            42,
            *code,
            (Ipv4Addr::new(192, 168, 1, 1), port),
            (Ipv4Addr::new(192, 168, 1, 2), 80),
        );
        let _ = pipeline.process(&event).expect("process");
        let now = pipeline.metrics();
        assert!(now.closing_connections >= last.closing_connections);
        assert!(now.closed_connections >= last.closed_connections);
        last = now;
    }
    assert_eq!(last.active_connections, 0);
    assert_eq!(last.closed_connections, 9);
}

#[test]
fn evicted_signature_is_accepted_again() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = MonitorConfig {
        dedup_capacity: 3,
        ..config_in(dir.path())
    };
    let mut pipeline = build(dir.path(), config);

    let events: Vec<_> = (0..4).map(|pid| conn(pid, 1)).collect();
    run_all(&mut pipeline, events);
    assert_eq!(pipeline.stats().emitted, 4);

    assert!(matches!(
        pipeline.process(&conn(0, 1)).expect("process"),
        Disposition::Emitted(_)
    ));
    assert_eq!(
        pipeline.process(&conn(3, 1)).expect("process"),
        Disposition::Duplicate
    );
}

#[test]
fn filters_gate_delivery_but_not_metrics() {
    let events = vec![conn(100, 1), conn(100, 4), conn(200, 1), conn(200, 7)];

    let dir = tempfile::tempdir().expect("tempdir");
    let mut unfiltered = build(dir.path(), config_in(dir.path()));
    run_all(&mut unfiltered, events.clone());

    let dir2 = tempfile::tempdir().expect("tempdir");
    let config = MonitorConfig {
        filter: FilterConfig {
            pid: Some(100),
            established_only: true,
            ..FilterConfig::default()
        },
        ..config_in(dir2.path())
    };
    let mut filtered = build(dir2.path(), config);
    run_all(&mut filtered, events);

    assert_eq!(unfiltered.metrics(), filtered.metrics());
    assert_eq!(filtered.stats().filtered, 3);

    let entries = emitted(filtered);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].pid, 100);
    assert_eq!(entries[0].state, "Connection Established");
}

#[test]
fn same_tuple_shares_connection_id_across_states() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pipeline = build(dir.path(), config_in(dir.path()));
    run_all(
        &mut pipeline,
        vec![
            conn(500, 1),
            conn(500, 4),
            raw(
                500,
                1,
                (Ipv4Addr::new(10, 0, 0, 1), 5001),
                (Ipv4Addr::new(10, 0, 0, 2), 443),
            ),
        ],
    );
    let entries = emitted(pipeline);
    assert_eq!(entries[0].connection_id, entries[1].connection_id);
    assert_ne!(entries[0].connection_id, entries[2].connection_id);
}

#[test]
fn lifecycle_report_tracks_emitted_transitions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pipeline = build(dir.path(), config_in(dir.path()));
    run_all(&mut pipeline, vec![conn(0, 8), conn(43190, 9), conn(0, 7)]);

    let report = pipeline.lifecycles().to_string();
    assert!(report.contains("Connection: 10.0.0.1:5000 -> 10.0.0.2:443"));
    let states: Vec<_> = pipeline
        .lifecycles()
        .history("10.0.0.1:5000 -> 10.0.0.2:443")
        .expect("tracked")
        .map(|t| t.state.label())
        .collect();
    assert_eq!(
        states,
        vec![
            "Connection Closing (CLOSE_WAIT)",
            "Connection Closing (LAST_ACK)",
            "Connection Closed",
        ]
    );
}

#[test]
fn text_format_reaches_the_log() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = MonitorConfig {
        format: OutputFormat::Text,
        ..config_in(dir.path())
    };
    let log_file = config.log_file.clone();
    let mut pipeline = build(dir.path(), config);
    run_all(&mut pipeline, vec![conn(500, 2)]);
    drop(pipeline);

    let records = log_records(&log_file);
    assert_eq!(records.len(), 1);
    assert!(records[0].contains(" State Change: SRC=10.0.0.1:5000 DST=10.0.0.2:443 "));
    assert!(records[0].contains("STATE=Connection Opening (SYN_SENT)"));
}

#[test]
fn decoded_kernel_records_flow_through_the_pipeline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pipeline = build(dir.path(), config_in(dir.path()));

    let bytes = record::encode(&conn(500, 1));
    let decoded = record::decode(&bytes).expect("decode");
    run_all(&mut pipeline, vec![decoded]);

    let entries = emitted(pipeline);
    assert_eq!(entries[0].comm, "curl");
    assert_eq!(entries[0].dst_ip, "10.0.0.2");
}

#[test]
fn shutdown_stops_the_loop_before_pending_batches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut pipeline = build(dir.path(), config_in(dir.path()));
    let mut source = MemorySource::from_events(vec![conn(1, 1), conn(2, 1)]);

    let stats = pipeline
        .run(&mut source, &AtomicBool::new(true))
        .expect("run");
    assert_eq!(stats.received, 0);
    assert_eq!(source.remaining(), 2);
}
