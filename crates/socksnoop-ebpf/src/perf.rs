//! Live event source backed by per-CPU perf buffers.
//!
//! Loads the compiled tracepoint object, attaches it to
//! `sock/inet_sock_set_state`, and blocks in `poll(2)` on one perf
//! buffer per online CPU. The same transition may surface on more than
//! one CPU; suppressing those repeats is the pipeline's job.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use socksnoop_common::error::Result;
use socksnoop_common::types::RawEvent;

use crate::source::EventSource;

/// Interval between shutdown checks while waiting for records.
pub const POLL_TICK_MS: u16 = 250;

#[cfg(all(target_os = "linux", feature = "ebpf"))]
mod live {
    use std::os::fd::AsFd;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};

    use aya::Ebpf;
    use aya::maps::MapData;
    use aya::maps::perf::{PerfEventArray, PerfEventArrayBuffer};
    use aya::programs::TracePoint;
    use aya::util::online_cpus;
    use bytes::BytesMut;
    use nix::errno::Errno;
    use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
    use socksnoop_common::error::{Result, SnoopError};
    use socksnoop_common::types::RawEvent;

    use crate::programs::socket;
    use crate::record;

    const READ_BATCH: usize = 16;
    const READ_BUFFER_BYTES: usize = 256;

    struct CpuBuffer {
        cpu: u32,
        buffer: PerfEventArrayBuffer<MapData>,
    }

    /// Attached tracepoint plus its per-CPU buffers.
    pub struct LiveSource {
        // Dropping the loaded object detaches the tracepoint.
        _ebpf: Ebpf,
        buffers: Vec<CpuBuffer>,
        scratch: Vec<BytesMut>,
    }

    fn attach_error(message: String) -> SnoopError {
        SnoopError::Attach { message }
    }

    fn bump_memlock_rlimit() {
        let rlim = libc::rlimit {
            rlim_cur: libc::RLIM_INFINITY,
            rlim_max: libc::RLIM_INFINITY,
        };
        // SAFETY: `rlim` is a fully initialised rlimit that outlives the call.
        let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlim) };
        if ret != 0 {
            tracing::warn!("failed to raise RLIMIT_MEMLOCK");
        }
    }

    impl LiveSource {
        pub fn attach(object: &Path) -> Result<Self> {
            bump_memlock_rlimit();

            let mut ebpf = Ebpf::load_file(object)
                .map_err(|e| attach_error(format!("loading {}: {e}", object.display())))?;

            let program: &mut TracePoint = ebpf
                .program_mut(socket::PROGRAM_NAME)
                .ok_or_else(|| {
                    attach_error(format!("program {} not found in object", socket::PROGRAM_NAME))
                })?
                .try_into()
                .map_err(|e| attach_error(format!("{}: {e}", socket::PROGRAM_NAME)))?;
            program
                .load()
                .map_err(|e| attach_error(format!("verifier rejected program: {e}")))?;
            let _link = program
                .attach(socket::TRACEPOINT_CATEGORY, socket::TRACEPOINT_NAME)
                .map_err(|e| {
                    attach_error(format!(
                        "attaching {}/{}: {e}",
                        socket::TRACEPOINT_CATEGORY,
                        socket::TRACEPOINT_NAME
                    ))
                })?;
            tracing::info!(
                category = socket::TRACEPOINT_CATEGORY,
                name = socket::TRACEPOINT_NAME,
                "tracepoint attached"
            );

            let map = ebpf
                .take_map(socket::EVENTS_MAP)
                .ok_or_else(|| attach_error(format!("map {} not found", socket::EVENTS_MAP)))?;
            let mut array = PerfEventArray::try_from(map)
                .map_err(|e| attach_error(format!("map {}: {e}", socket::EVENTS_MAP)))?;

            let cpus = online_cpus()
                .map_err(|e| attach_error(format!("listing online CPUs: {e:?}")))?;
            let mut buffers = Vec::with_capacity(cpus.len());
            for cpu in cpus {
                let buffer = array
                    .open(cpu, None)
                    .map_err(|e| attach_error(format!("opening perf buffer on cpu {cpu}: {e}")))?;
                buffers.push(CpuBuffer { cpu, buffer });
            }
            tracing::debug!(cpus = buffers.len(), "perf buffers opened");

            Ok(Self {
                _ebpf: ebpf,
                buffers,
                scratch: (0..READ_BATCH)
                    .map(|_| BytesMut::with_capacity(READ_BUFFER_BYTES))
                    .collect(),
            })
        }

        fn wait_readable(&self) -> Result<Vec<usize>> {
            let mut fds: Vec<PollFd<'_>> = self
                .buffers
                .iter()
                .map(|b| PollFd::new(b.buffer.as_fd(), PollFlags::POLLIN))
                .collect();

            match poll(&mut fds, PollTimeout::from(super::POLL_TICK_MS)) {
                Ok(0) | Err(Errno::EINTR) => Ok(Vec::new()),
                Ok(_) => Ok(fds
                    .iter()
                    .enumerate()
                    .filter(|(_, fd)| fd.revents().is_some_and(|r| r.contains(PollFlags::POLLIN)))
                    .map(|(idx, _)| idx)
                    .collect()),
                Err(e) => Err(SnoopError::Source {
                    message: format!("poll on perf buffers failed: {e}"),
                }),
            }
        }

        fn drain(&mut self, idx: usize, out: &mut Vec<RawEvent>) -> Result<()> {
            let Self {
                buffers, scratch, ..
            } = self;
            let cpu = &mut buffers[idx];
            while cpu.buffer.readable() {
                let events = cpu.buffer.read_events(scratch).map_err(|e| SnoopError::Source {
                    message: format!("reading perf buffer on cpu {}: {e}", cpu.cpu),
                })?;
                if events.lost > 0 {
                    tracing::warn!(cpu = cpu.cpu, lost = events.lost, "perf buffer dropped samples");
                }
                for buf in scratch.iter().take(events.read) {
                    out.push(record::decode(buf)?);
                }
                if events.read == 0 {
                    break;
                }
            }
            Ok(())
        }

        pub fn poll(&mut self, shutdown: &AtomicBool) -> Result<Vec<RawEvent>> {
            let mut out = Vec::new();
            while out.is_empty() {
                if shutdown.load(Ordering::SeqCst) {
                    return Ok(Vec::new());
                }
                for idx in self.wait_readable()? {
                    self.drain(idx, &mut out)?;
                }
            }
            Ok(out)
        }
    }
}

/// Event source reading the kernel tracepoint through perf buffers.
pub struct PerfSource {
    #[cfg(all(target_os = "linux", feature = "ebpf"))]
    inner: live::LiveSource,
}

impl PerfSource {
    /// Loads `object`, attaches its tracepoint, and opens per-CPU buffers.
    ///
    /// # Errors
    ///
    /// Returns `SnoopError::Attach` if the object cannot be loaded, the
    /// verifier rejects the program, or attachment fails.
    #[cfg(all(target_os = "linux", feature = "ebpf"))]
    pub fn attach(object: &Path) -> Result<Self> {
        tracing::info!(object = %object.display(), "loading socket tracepoint");
        Ok(Self {
            inner: live::LiveSource::attach(object)?,
        })
    }

    /// Stub for builds without eBPF support.
    ///
    /// # Errors
    ///
    /// Always returns an error — the live source needs Linux and the
    /// `ebpf` feature.
    #[cfg(not(all(target_os = "linux", feature = "ebpf")))]
    pub fn attach(object: &Path) -> Result<Self> {
        Err(socksnoop_common::error::SnoopError::Attach {
            message: format!(
                "cannot load {}: built without eBPF support",
                object.display()
            ),
        })
    }
}

impl EventSource for PerfSource {
    #[cfg(all(target_os = "linux", feature = "ebpf"))]
    fn poll(&mut self, shutdown: &AtomicBool) -> Result<Vec<RawEvent>> {
        self.inner.poll(shutdown)
    }

    #[cfg(not(all(target_os = "linux", feature = "ebpf")))]
    fn poll(&mut self, _shutdown: &AtomicBool) -> Result<Vec<RawEvent>> {
        Ok(Vec::new())
    }
}
