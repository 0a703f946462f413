use crossbeam_channel::Receiver;
use std::io::Write;

use crate::pipeline::stats::{Phase, Stats};
use crate::types::{RdbError, RdbOk};

/// Drains the line queue into `output`, flushing after every line.
///
/// A queue closed by an aborted run is not a clean end, so the run is only
/// marked [`Phase::Done`] when nothing failed upstream.
pub(crate) fn run<W: Write>(lines: Receiver<String>, mut output: W, stats: &Stats) -> RdbOk {
    for line in lines.iter() {
        if stats.is_aborted() {
            return Err(RdbError::Aborted);
        }

        output
            .write_all(line.as_bytes())
            .and_then(|_| output.flush())
            .map_err(RdbError::Write)?;
        stats.add_written(line.len() as u64);
    }

    output.flush().map_err(RdbError::Write)?;
    if stats.is_aborted() {
        return Err(RdbError::Aborted);
    }
    stats.set_phase(Phase::Done);
    Ok(())
}
