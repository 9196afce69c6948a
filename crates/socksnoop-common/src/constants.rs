//! System-wide constants and default paths.

/// Fixed system path of the durable log when no override is supplied.
pub const DEFAULT_LOG_FILE: &str = "/var/log/socket_monitor.log";

/// Environment variable that overrides [`DEFAULT_LOG_FILE`].
pub const LOG_FILE_ENV: &str = "SOCKET_SNOOP_LOG";

/// Secondary log target, relative to the current working directory.
pub const FALLBACK_LOG_FILE: &str = "./socket_monitor.log";

/// Default location of the compiled tracepoint object.
pub const DEFAULT_BPF_OBJECT: &str = "/usr/lib/socksnoop/socksnoop.bpf.o";

/// Environment variable that overrides [`DEFAULT_BPF_OBJECT`].
pub const BPF_OBJECT_ENV: &str = "SOCKSNOOP_BPF_OBJECT";

/// Default number of signatures held by the deduplication window.
pub const DEFAULT_DEDUP_CAPACITY: usize = 2000;

/// Largest accepted deduplication or lifecycle capacity.
pub const MAX_CAPACITY: usize = 1_000_000;

/// Default number of connections retained for the shutdown lifecycle report.
pub const DEFAULT_LIFECYCLE_CAPACITY: usize = 2000;

/// Transitions kept per connection in the lifecycle report.
pub const MAX_TRANSITIONS_PER_CONNECTION: usize = 32;

/// First header line written to a newly created log file.
pub const LOG_HEADER_TITLE: &str = "Enhanced Socket Monitoring Log";

/// Width of the `=` rule written under [`LOG_HEADER_TITLE`].
pub const LOG_HEADER_RULE_WIDTH: usize = 60;

/// `chrono` format string for record timestamps (millisecond precision).
pub const TIMESTAMP_FORMAT: &str = "%b %d %Y %H:%M:%S%.3f";

/// Label attached to every socket state record.
pub const EVENT_LABEL: &str = "State Change";

/// Protocol tag attached to every record.
pub const PROTOCOL_TAG: &str = "TCP";

/// Application name used in CLI output.
pub const APP_NAME: &str = "socksnoop";
