//! Record framing: walks an RDB stream and yields one [`InputRecord`] per key,
//! leaving the value body undecoded.

mod skim;

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use self::skim::skim_value;
use crate::constants::{op_code, version};
use crate::decoder::common::utils::{
    read_blob, read_length, skip_blob, verify_magic, verify_version,
};
use crate::filter::Filter;
use crate::types::{InputRecord, RdbError, RdbResult};

/// Tracks the stream position and, while a value is being framed, keeps a
/// copy of every byte read.
struct Tap<R> {
    inner: R,
    position: u64,
    capture: Option<Vec<u8>>,
}

impl<R: Read> Tap<R> {
    fn start_capture(&mut self, prefix: u8) {
        self.capture = Some(vec![prefix]);
    }

    fn finish_capture(&mut self) -> Vec<u8> {
        self.capture.take().unwrap_or_default()
    }
}

impl<R: Read> Read for Tap<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.position += n as u64;
        if let Some(capture) = self.capture.as_mut() {
            capture.extend_from_slice(&buf[..n]);
        }
        Ok(n)
    }
}

/// Lazy, finite sequence of records read from an RDB stream.
///
/// Any framing problem ends the sequence with a single
/// [`RdbError::Framing`] item.
pub struct Loader<R: Read, F: Filter> {
    input: Tap<R>,
    filter: F,
    version: u32,
    current_database: u32,
    pending_expiry: Option<u64>,
    finished: bool,
}

impl<R: Read, F: Filter> Loader<R, F> {
    pub fn new(reader: R, filter: F) -> RdbResult<Self> {
        let mut input = Tap {
            inner: reader,
            position: 0,
            capture: None,
        };

        let version = verify_magic(&mut input)
            .and_then(|_| verify_version(&mut input))
            .map_err(|source| RdbError::Framing {
                offset: input.position,
                source: Box::new(source),
            })?;
        log::debug!("rdb version {}", version);

        Ok(Loader {
            input,
            filter,
            version,
            current_database: 0,
            pending_expiry: None,
            finished: false,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Bytes consumed from the underlying reader so far.
    pub fn position(&self) -> u64 {
        self.input.position
    }

    fn read_record(&mut self) -> RdbResult<Option<InputRecord>> {
        loop {
            let next_op = match self.input.read_u8() {
                Ok(op) => op,
                Err(e)
                    if e.kind() == io::ErrorKind::UnexpectedEof
                        && self.pending_expiry.is_none() =>
                {
                    log::debug!("input ended without EOF marker");
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            match next_op {
                op_code::EOF => {
                    if self.version >= version::CHECKSUM_SINCE {
                        let checksum = self.input.read_u64::<LittleEndian>()?;
                        log::debug!("reached EOF, checksum {:#018x}", checksum);
                    }
                    return Ok(None);
                }
                op_code::SELECTDB => {
                    self.current_database = read_length(&mut self.input)?;
                }
                op_code::EXPIRETIME_MS => {
                    self.pending_expiry = Some(self.input.read_u64::<LittleEndian>()?);
                }
                op_code::EXPIRETIME => {
                    self.pending_expiry =
                        Some(self.input.read_u32::<LittleEndian>()? as u64 * 1000);
                }
                op_code::RESIZEDB => {
                    let db_size = read_length(&mut self.input)?;
                    let expires_size = read_length(&mut self.input)?;
                    log::debug!(
                        "db {} sized {} keys, {} with expiry",
                        self.current_database,
                        db_size,
                        expires_size
                    );
                }
                op_code::AUX => {
                    let key = read_blob(&mut self.input)?;
                    let value = read_blob(&mut self.input)?;
                    log::debug!(
                        "aux {} = {}",
                        String::from_utf8_lossy(&key),
                        String::from_utf8_lossy(&value)
                    );
                }
                op_code::FREQ => {
                    let _freq = self.input.read_u8()?;
                }
                op_code::IDLE => {
                    let _idle = read_length(&mut self.input)?;
                }
                op_code::FUNCTION2 => {
                    skip_blob(&mut self.input)?;
                }
                op_code::SLOT_INFO => {
                    for _ in 0..3 {
                        read_length(&mut self.input)?;
                    }
                }
                op_code::MODULE_AUX | op_code::FUNCTION_PRE_GA => {
                    return Err(RdbError::ParsingError {
                        context: "loader",
                        message: format!("unsupported opcode {}", next_op),
                    });
                }
                value_type => {
                    if let Some(record) = self.read_entry(value_type)? {
                        return Ok(Some(record));
                    }
                }
            }
        }
    }

    fn read_entry(&mut self, value_type: u8) -> RdbResult<Option<InputRecord>> {
        let db = self.current_database;
        let expire_at = self.pending_expiry.take().unwrap_or(0);
        let key = read_blob(&mut self.input)?;

        let wanted = self.filter.matches_db(db)
            && self.filter.matches_type(value_type)
            && self.filter.matches_key(&key);

        if !wanted {
            skim_value(&mut self.input, value_type)?;
            return Ok(None);
        }

        self.input.start_capture(value_type);
        let skimmed = skim_value(&mut self.input, value_type);
        let raw_value = self.input.finish_capture();
        skimmed?;

        Ok(Some(InputRecord {
            db,
            key,
            expire_at,
            raw_value,
        }))
    }
}

impl<R: Read, F: Filter> Iterator for Loader<R, F> {
    type Item = RdbResult<InputRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(source) => {
                self.finished = true;
                Some(Err(RdbError::Framing {
                    offset: self.input.position,
                    source: Box::new(source),
                }))
            }
        }
    }
}
