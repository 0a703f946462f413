//! The decode pipeline: one loader thread, `parallel` decode workers, one
//! writer and a progress monitor, joined by two bounded queues.

mod monitor;
pub mod stats;
mod worker;
mod writer;

pub use self::monitor::status_line;
pub use self::stats::{Phase, Snapshot, Stats};

use crossbeam_channel::{bounded, Sender};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::decoder::ValueDecoder;
use crate::filter::Filter;
use crate::loader::Loader;
use crate::types::{InputRecord, RdbError, RdbOk, RdbResult};

/// Records per worker the queues can hold before the producer blocks.
const QUEUE_DEPTH_PER_WORKER: usize = 32;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of decode workers, at least 1.
    pub parallel: usize,
    /// Input size in bytes, when known, for the progress percentage.
    pub total_size: Option<u64>,
    pub progress_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            parallel: 1,
            total_size: None,
            progress_interval: Duration::from_secs(1),
        }
    }
}

impl PipelineConfig {
    pub fn workers(&self) -> usize {
        self.parallel.max(1)
    }

    /// Capacity of both the record queue and the line queue.
    pub fn queue_capacity(&self) -> usize {
        self.workers() * QUEUE_DEPTH_PER_WORKER
    }
}

/// Final counters of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// Input records decoded.
    pub records: u64,
    /// Lines written.
    pub items: u64,
}

impl From<Snapshot> for Summary {
    fn from(snapshot: Snapshot) -> Self {
        Summary {
            bytes_read: snapshot.bytes_read,
            bytes_written: snapshot.bytes_written,
            records: snapshot.records,
            items: snapshot.items,
        }
    }
}

/// Keeps the first real error of a run and raises the abort flag.
///
/// `Aborted` only says a stage stopped because another one failed, so it
/// never replaces an error already recorded.
struct Failure<'a> {
    stats: &'a Stats,
    first: Mutex<Option<RdbError>>,
}

impl<'a> Failure<'a> {
    fn new(stats: &'a Stats) -> Self {
        Failure {
            stats,
            first: Mutex::new(None),
        }
    }

    fn record(&self, error: RdbError) {
        let mut slot = self.first.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(*slot, None | Some(RdbError::Aborted)) {
            if !matches!(error, RdbError::Aborted) {
                log::debug!("aborting run: {}", error);
            }
            *slot = Some(error);
        }
        drop(slot);
        self.stats.abort();
    }

    fn check(&self, result: RdbOk) {
        if let Err(error) = result {
            self.record(error);
        }
    }

    fn joined(&self, stage: &'static str, outcome: thread::Result<()>) {
        if outcome.is_err() {
            self.record(RdbError::Panicked(stage));
        }
    }

    fn into_result(self) -> RdbOk {
        match self
            .first
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Runs a whole decode from `input` to `output`.
///
/// Every stage stops at the first fatal error; the error returned is the
/// first one recorded. `stats` can be shared with an observer to watch the
/// counters and [`Phase`] while the run is in progress.
pub fn run<R, W, F, D>(
    input: R,
    output: W,
    filter: F,
    decoder: &D,
    config: &PipelineConfig,
    stats: Arc<Stats>,
) -> RdbResult<Summary>
where
    R: Read + Send,
    W: Write + Send,
    F: Filter + Send,
    D: ValueDecoder + ?Sized,
{
    let capacity = config.queue_capacity();
    let (record_tx, record_rx) = bounded::<InputRecord>(capacity);
    let (line_tx, line_rx) = bounded::<String>(capacity);
    let (done_tx, done_rx) = bounded::<()>(1);

    let stats_ref: &Stats = &stats;
    let failure = Failure::new(stats_ref);
    let failure_ref = &failure;

    thread::scope(|scope| {
        let monitor = scope.spawn(move || {
            monitor::run(
                stats_ref,
                config.total_size,
                config.progress_interval,
                done_rx,
            )
        });

        // Senders outlive the error check, so a queue never closes on a
        // failure before the abort flag is up.
        let loader = scope.spawn(move || {
            failure_ref.check(load(input, filter, &record_tx, stats_ref));
        });

        let workers: Vec<_> = (0..config.workers())
            .map(|_| {
                let records = record_rx.clone();
                let lines = line_tx.clone();
                scope.spawn(move || {
                    failure_ref.check(worker::run(records, &lines, decoder, stats_ref));
                })
            })
            .collect();
        // The line queue closes once the last worker drops its sender.
        drop(record_rx);
        drop(line_tx);

        let writer = scope.spawn(move || {
            let _done = done_tx;
            failure_ref.check(writer::run(line_rx, output, stats_ref));
        });

        failure.joined("loader", loader.join());
        for handle in workers {
            failure.joined("worker", handle.join());
        }
        failure.joined("writer", writer.join());
        failure.joined("monitor", monitor.join());
    });

    failure.into_result()?;
    Ok(stats.snapshot().into())
}

/// Loader stage: frames records and feeds the worker queue.
///
/// Consumed bytes are reported once per record, not per read.
fn load<R: Read, F: Filter>(
    reader: R,
    filter: F,
    records: &Sender<InputRecord>,
    stats: &Stats,
) -> RdbOk {
    stats.set_phase(Phase::Running);
    let mut loader = Loader::new(reader, filter)?;
    let mut reported = 0;

    while let Some(record) = loader.next() {
        stats.add_read(loader.position() - reported);
        reported = loader.position();

        let record = record?;
        if stats.is_aborted() {
            return Err(RdbError::Aborted);
        }
        // Every worker is gone, so someone else already failed.
        records.send(record).map_err(|_| RdbError::Aborted)?;
    }
    stats.add_read(loader.position() - reported);

    stats.set_phase(Phase::Draining);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::RdbValueDecoder;
    use crate::filter::Simple;
    use crossbeam_channel::Receiver;
    use pretty_assertions::assert_eq;
    use std::io::{self, Cursor};

    #[test]
    fn test_queue_capacity() {
        let config = PipelineConfig {
            parallel: 4,
            ..Default::default()
        };
        assert_eq!(128, config.queue_capacity());

        let config = PipelineConfig {
            parallel: 0,
            ..Default::default()
        };
        assert_eq!(1, config.workers());
        assert_eq!(32, config.queue_capacity());
    }

    #[test]
    fn test_failure_keeps_first_real_error() {
        let stats = Stats::default();
        let failure = Failure::new(&stats);

        failure.record(RdbError::Aborted);
        failure.record(RdbError::MissingValue("first"));
        failure.record(RdbError::MissingValue("second"));
        failure.record(RdbError::Aborted);

        assert!(stats.is_aborted());
        assert!(matches!(
            failure.into_result(),
            Err(RdbError::MissingValue("first"))
        ));
    }

    #[test]
    fn test_empty_dump() {
        let mut data = b"REDIS0009".to_vec();
        data.push(0xFF);
        data.extend_from_slice(&[0u8; 8]);

        let stats = Stats::new();
        let mut output = Vec::new();
        let summary = run(
            data.as_slice(),
            &mut output,
            Simple::new(),
            &RdbValueDecoder,
            &PipelineConfig::default(),
            Arc::clone(&stats),
        )
        .unwrap();

        assert!(output.is_empty());
        assert_eq!(0, summary.records);
        assert_eq!(18, summary.bytes_read);
        assert_eq!(Phase::Done, stats.phase());
    }

    /// Output that blocks every write until the gate sender is dropped.
    struct GatedWriter {
        gate: Receiver<()>,
        written: Vec<u8>,
    }

    impl Write for GatedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _ = self.gate.recv();
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// `count` string records of 8 bytes each after a 9-byte header.
    fn string_dump(count: usize) -> Vec<u8> {
        let mut data = b"REDIS0009".to_vec();
        for i in 0..count {
            data.extend_from_slice(&[0, 4]);
            data.extend_from_slice(format!("k{:03}", i).as_bytes());
            data.extend_from_slice(&[1, b'v']);
        }
        data.push(0xFF);
        data.extend_from_slice(&[0u8; 8]);
        data
    }

    #[test]
    fn test_stalled_writer_holds_back_loader() {
        let data = string_dump(500);
        let total = data.len() as u64;
        let config = PipelineConfig::default();
        let capacity = config.queue_capacity() as u64;

        let (gate_tx, gate_rx) = bounded::<()>(0);
        let stats = Stats::new();
        let observed = Arc::clone(&stats);
        let handle = thread::spawn(move || {
            let output = GatedWriter {
                gate: gate_rx,
                written: Vec::new(),
            };
            run(
                Cursor::new(data),
                output,
                Simple::new(),
                &RdbValueDecoder,
                &config,
                observed,
            )
        });

        thread::sleep(Duration::from_millis(300));
        let stalled = stats.snapshot();
        // One record in the writer, one per queue slot, one in the worker
        // and one blocked in the loader.
        let framed = (stalled.bytes_read - 9) / 8;
        assert!(framed <= 2 * capacity + 3, "framed {} records", framed);
        assert!(stalled.bytes_read < total);
        assert!(stalled.records <= capacity + 1);
        assert_eq!(Phase::Running, stats.phase());

        drop(gate_tx);
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(500, summary.records);
        assert_eq!(total, summary.bytes_read);
        assert_eq!(Phase::Done, stats.phase());
    }

    #[test]
    fn test_bad_header_fails_run() {
        let mut output = Vec::new();
        let result = run(
            &b"NOTRDB"[..],
            &mut output,
            Simple::new(),
            &RdbValueDecoder,
            &PipelineConfig::default(),
            Stats::new(),
        );
        assert!(matches!(result, Err(RdbError::Framing { .. })));
    }
}
