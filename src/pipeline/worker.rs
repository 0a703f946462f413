use crossbeam_channel::{Receiver, Sender};

use crate::decoder::ValueDecoder;
use crate::formatter::{flatten, to_text};
use crate::pipeline::stats::Stats;
use crate::types::{InputRecord, RdbError, RdbOk};

/// Decode loop of one worker. Returns once the record queue is closed and
/// drained, or with the first error this worker hits.
pub(crate) fn run<D: ValueDecoder + ?Sized>(
    records: Receiver<InputRecord>,
    lines: &Sender<String>,
    decoder: &D,
    stats: &Stats,
) -> RdbOk {
    for record in records.iter() {
        if stats.is_aborted() {
            return Err(RdbError::Aborted);
        }

        let value = decoder
            .decode(&record.raw_value)
            .map_err(|source| RdbError::Decode {
                db: record.db,
                key: to_text(&record.key),
                source: Box::new(source),
            })?;

        for line in flatten(&record, &value)? {
            // The writer is gone, so someone else already failed.
            lines.send(line).map_err(|_| RdbError::Aborted)?;
        }
        stats.record_decoded();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::encoding_type;
    use crate::decoder::RdbValueDecoder;
    use crossbeam_channel::{bounded, unbounded};
    use pretty_assertions::assert_eq;

    fn string_record(key: &[u8], value: &[u8]) -> InputRecord {
        let mut raw_value = vec![encoding_type::STRING, value.len() as u8];
        raw_value.extend_from_slice(value);
        InputRecord {
            db: 0,
            key: key.to_vec(),
            expire_at: 0,
            raw_value,
        }
    }

    #[test]
    fn test_decodes_until_queue_closed() {
        let stats = Stats::new();
        let (record_tx, record_rx) = bounded(4);
        let (line_tx, line_rx) = unbounded();

        record_tx.send(string_record(b"a", b"1")).unwrap();
        record_tx.send(string_record(b"b", b"2")).unwrap();
        drop(record_tx);

        run(record_rx, &line_tx, &RdbValueDecoder, &stats).unwrap();
        drop(line_tx);

        let lines: Vec<String> = line_rx.iter().collect();
        assert_eq!(2, lines.len());
        assert!(lines[0].contains(r#""key":"a""#));
        assert_eq!(2, stats.snapshot().records);
    }

    #[test]
    fn test_decode_failure_names_record() {
        let stats = Stats::new();
        let (record_tx, record_rx) = bounded(4);
        let (line_tx, _line_rx) = unbounded();

        let mut broken = string_record(b"bad\x00key", b"x");
        broken.raw_value = vec![encoding_type::SET_INTSET, 2, 3, 4];
        broken.db = 5;
        record_tx.send(broken).unwrap();
        drop(record_tx);

        match run(record_rx, &line_tx, &RdbValueDecoder, &stats) {
            Err(RdbError::Decode { db, key, .. }) => {
                assert_eq!(5, db);
                assert_eq!("bad.key", key);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(0, stats.snapshot().records);
    }

    #[test]
    fn test_stops_when_aborted() {
        let stats = Stats::new();
        let (record_tx, record_rx) = bounded(4);
        let (line_tx, line_rx) = unbounded();

        record_tx.send(string_record(b"a", b"1")).unwrap();
        drop(record_tx);
        stats.abort();

        assert!(matches!(
            run(record_rx, &line_tx, &RdbValueDecoder, &stats),
            Err(RdbError::Aborted)
        ));
        drop(line_tx);
        assert_eq!(0, line_rx.iter().count());
    }
}
