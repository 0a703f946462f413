use std::io::{Cursor, Read};

use super::utils::read_exact;
use crate::types::{RdbError, RdbResult};
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

const ZIPLIST_END: u8 = 0xFF;
const ZIPLIST_BIG_PREVLEN: u8 = 254;

#[derive(Debug, Clone)]
pub enum ZiplistEntry {
    String(Vec<u8>),
    Number(i64),
}

pub fn read_ziplist_metadata<T: Read>(input: &mut T) -> RdbResult<(u32, u32, u16)> {
    let zlbytes = input.read_u32::<LittleEndian>()?;
    let zltail = input.read_u32::<LittleEndian>()?;
    let zllen = input.read_u16::<LittleEndian>()?;

    Ok((zlbytes, zltail, zllen))
}

/// Reads every entry of a serialized ziplist, integers rendered as decimal text.
pub fn read_ziplist_entries(ziplist: &[u8], context: &'static str) -> RdbResult<Vec<Vec<u8>>> {
    let mut reader = Cursor::new(ziplist);
    let (_zlbytes, _zltail, zllen) = read_ziplist_metadata(&mut reader)?;

    let mut values = Vec::with_capacity(zllen as usize);
    loop {
        let position = reader.position() as usize;
        match ziplist.get(position) {
            Some(&ZIPLIST_END) => break,
            Some(_) => values.push(read_ziplist_entry_string(&mut reader)?),
            None => return Err(RdbError::MissingValue("ziplist end marker")),
        }
    }

    // u16::MAX means the header count overflowed and only a walk can tell
    if zllen != u16::MAX && values.len() != zllen as usize {
        return Err(RdbError::parsing(
            context,
            format!("ziplist header announced {} entries, found {}", zllen, values.len()),
        ));
    }

    Ok(values)
}

pub fn read_ziplist_entry_string<R: Read>(input: &mut R) -> RdbResult<Vec<u8>> {
    let entry = read_ziplist_entry(input)?;
    match entry {
        ZiplistEntry::String(val) => Ok(val),
        ZiplistEntry::Number(val) => Ok(val.to_string().into_bytes()),
    }
}

fn read_ziplist_entry<R: Read>(input: &mut R) -> RdbResult<ZiplistEntry> {
    // 1. 1 or 5 bytes length of previous entry
    let byte = input.read_u8()?;
    if byte == ZIPLIST_BIG_PREVLEN {
        let _prevlen = input.read_u32::<LittleEndian>()?;
    }

    // 2. Read flag or number value
    let flag = input.read_u8()?;

    let length: u64 = match (flag & 0xC0) >> 6 {
        0 => (flag & 0x3F) as u64,
        1 => {
            let next_byte = input.read_u8()?;
            (((flag & 0x3F) as u64) << 8) | next_byte as u64
        }
        2 => input.read_u32::<BigEndian>()? as u64,
        _ => {
            let number_value = match flag {
                0xC0 => input.read_i16::<LittleEndian>()? as i64,
                0xD0 => input.read_i32::<LittleEndian>()? as i64,
                0xE0 => input.read_i64::<LittleEndian>()?,
                0xF0 => {
                    let mut bytes = [0u8; 4];
                    input.read_exact(&mut bytes[1..])?;
                    (i32::from_le_bytes(bytes) >> 8) as i64
                }
                0xFE => input.read_i8()? as i64,
                0xF1..=0xFD => (flag & 0x0F) as i64 - 1,
                _ => return Err(RdbError::UnknownEncoding(flag)),
            };

            return Ok(ZiplistEntry::Number(number_value));
        }
    };

    // 3. Read value
    let rawval = read_exact(input, length as usize)?;
    Ok(ZiplistEntry::String(rawval))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ziplist(entries: &[&[u8]], count: u16) -> Vec<u8> {
        let mut body = Vec::new();
        for entry in entries {
            body.extend_from_slice(entry);
        }
        let mut out = Vec::new();
        out.extend_from_slice(&((body.len() + 11) as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&body);
        out.push(ZIPLIST_END);
        out
    }

    #[rstest]
    #[case(&[0x00, 0x03, b'f', b'o', b'o'], b"foo")]
    #[case(&[0x00, 0xC0, 0x39, 0x30], b"12345")]
    #[case(&[0x00, 0xF0, 0xFF, 0xFF, 0xFF], b"-1")]
    #[case(&[0x00, 0xF0, 0x00, 0x00, 0x80], b"-8388608")]
    #[case(&[0x00, 0xFE, 0x80], b"-128")]
    #[case(&[0x00, 0xF1], b"0")]
    #[case(&[0x00, 0xFD], b"12")]
    #[case(&[0xFE, 0x01, 0x00, 0x00, 0x00, 0x01, b'x'], b"x")]
    fn test_read_ziplist_entry(#[case] input: &[u8], #[case] expected: &[u8]) {
        let mut cursor = Cursor::new(input.to_vec());
        assert_eq!(expected.to_vec(), read_ziplist_entry_string(&mut cursor).unwrap());
        assert_eq!(input.len() as u64, cursor.position());
    }

    #[test]
    fn test_read_ziplist_entries() {
        let data = ziplist(&[&[0x00, 0x01, b'a'], &[0x03, 0xF3]], 2);
        assert_eq!(
            vec![b"a".to_vec(), b"2".to_vec()],
            read_ziplist_entries(&data, "test").unwrap()
        );
    }

    #[test]
    fn test_read_ziplist_entries_count_mismatch() {
        let data = ziplist(&[&[0x00, 0x01, b'a']], 2);
        assert!(read_ziplist_entries(&data, "test").is_err());
    }

    #[test]
    fn test_read_ziplist_entries_missing_end() {
        let mut data = ziplist(&[&[0x00, 0x01, b'a']], 1);
        data.pop();
        assert!(read_ziplist_entries(&data, "test").is_err());
    }
}
