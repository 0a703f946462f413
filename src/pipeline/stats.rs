use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    Idle = 0,
    Running = 1,
    Draining = 2,
    Done = 3,
}

impl Phase {
    fn from_u8(value: u8) -> Phase {
        match value {
            1 => Phase::Running,
            2 => Phase::Draining,
            3 => Phase::Done,
            _ => Phase::Idle,
        }
    }
}

/// Counters shared by every stage of a run.
///
/// Stages only ever add; the monitor reads each counter independently and
/// does not need a consistent view across them.
#[derive(Debug)]
pub struct Stats {
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    records: AtomicU64,
    items: AtomicU64,
    phase: AtomicU8,
    aborted: AtomicBool,
}

/// Point-in-time copy of [`Stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// Input records decoded, not lines emitted.
    pub records: u64,
    pub items: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            bytes_read: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            records: AtomicU64::new(0),
            items: AtomicU64::new(0),
            phase: AtomicU8::new(Phase::Idle as u8),
            aborted: AtomicBool::new(false),
        }
    }
}

impl Stats {
    pub fn new() -> Arc<Stats> {
        Arc::new(Stats::default())
    }

    pub fn add_read(&self, bytes: u64) {
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
        self.items.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decoded(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            records: self.records.load(Ordering::Relaxed),
            items: self.items.load(Ordering::Relaxed),
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }
}
