use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::pipeline::stats::{Snapshot, Stats};

/// Formats one progress line. The percentage is only shown when the input
/// size is known.
pub fn status_line(snapshot: &Snapshot, total_size: Option<u64>) -> String {
    let mut line = String::from("decode: ");
    match total_size {
        Some(size) if size != 0 => {
            let percent = snapshot.bytes_read.saturating_mul(100) / size;
            line.push_str(&format!(
                "total = {} - {:>12} [{:>3}%]",
                size, snapshot.bytes_read, percent
            ));
        }
        _ => line.push_str(&format!("total = {:>12}", snapshot.bytes_read)),
    }
    line.push_str(&format!("  write={:<12}", snapshot.bytes_written));
    line.push_str(&format!("  entry={:<12}", snapshot.records));
    line
}

/// Logs a status line every `interval` until `done` fires or disconnects,
/// then logs a last one.
pub(crate) fn run(stats: &Stats, total_size: Option<u64>, interval: Duration, done: Receiver<()>) {
    loop {
        let finished = !matches!(done.recv_timeout(interval), Err(RecvTimeoutError::Timeout));
        log::info!("{}", status_line(&stats.snapshot(), total_size));
        if finished {
            break;
        }
    }

    if !stats.is_aborted() {
        log::info!("decode: done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::time::Instant;

    fn snapshot() -> Snapshot {
        Snapshot {
            bytes_read: 250,
            bytes_written: 1024,
            records: 7,
            items: 9,
        }
    }

    #[rstest]
    #[case(Some(1000), "decode: total = 1000 -          250 [ 25%]  write=1024          entry=7           ")]
    #[case(None, "decode: total =          250  write=1024          entry=7           ")]
    #[case(Some(0), "decode: total =          250  write=1024          entry=7           ")]
    fn test_status_line(#[case] total_size: Option<u64>, #[case] expected: &str) {
        assert_eq!(expected, status_line(&snapshot(), total_size));
    }

    #[test]
    fn test_returns_when_done_disconnects() {
        let stats = Stats::new();
        let (done_tx, done_rx) = bounded::<()>(1);
        drop(done_tx);

        let started = Instant::now();
        run(&stats, None, Duration::from_secs(30), done_rx);
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
