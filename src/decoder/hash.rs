use super::common::utils::{read_blob, read_exact, read_length, skip};
use super::common::{read_list_pack_entries, read_ziplist_entries};
use crate::types::{DecodedValue, RdbError, RdbResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

const ZIPMAP_BIGLEN: u8 = 254;
const ZIPMAP_END: u8 = 255;

pub fn read_hash<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let hash_items = read_length(input)?;
    let mut values = Vec::with_capacity((hash_items as usize).min(4096));

    for _ in 0..hash_items {
        let field = read_blob(input)?;
        let val = read_blob(input)?;
        values.push((field, val));
    }

    Ok(DecodedValue::Hash(values))
}

pub fn read_hash_ziplist<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let ziplist = read_blob(input)?;
    let entries = read_ziplist_entries(&ziplist, "read_hash_ziplist")?;
    Ok(DecodedValue::Hash(pair_up(entries, "read_hash_ziplist")?))
}

pub fn read_hash_list_pack<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let listpack = read_blob(input)?;
    let entries = read_list_pack_entries(&listpack, "read_hash_list_pack")?;
    Ok(DecodedValue::Hash(pair_up(entries, "read_hash_list_pack")?))
}

fn pair_up(
    entries: Vec<Vec<u8>>,
    context: &'static str,
) -> RdbResult<Vec<(Vec<u8>, Vec<u8>)>> {
    if entries.len() % 2 != 0 {
        return Err(RdbError::ParsingError {
            context,
            message: format!("odd number of entries: {}", entries.len()),
        });
    }

    let mut values = Vec::with_capacity(entries.len() / 2);
    let mut entries = entries.into_iter();
    while let (Some(field), Some(value)) = (entries.next(), entries.next()) {
        values.push((field, value));
    }
    Ok(values)
}

pub fn read_hash_zipmap<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let zipmap = read_blob(input)?;
    let mut reader = Cursor::new(zipmap);

    // zmlen is only a hint, the end marker is authoritative
    let _zmlen = reader.read_u8()?;
    let mut values = Vec::new();

    loop {
        let next_byte = reader.read_u8()?;
        if next_byte == ZIPMAP_END {
            break;
        }

        let field = read_zipmap_entry(next_byte, &mut reader)?;

        let next_byte = reader.read_u8()?;
        let free = reader.read_u8()?;
        let value = read_zipmap_entry(next_byte, &mut reader)?;
        skip(&mut reader, free as u64)?;

        values.push((field, value));
    }

    if reader.position() != reader.get_ref().len() as u64 {
        return Err(RdbError::ParsingError {
            context: "read_hash_zipmap",
            message: "trailing bytes after end marker".to_string(),
        });
    }

    Ok(DecodedValue::Hash(values))
}

fn read_zipmap_entry<T: Read>(next_byte: u8, zipmap: &mut T) -> RdbResult<Vec<u8>> {
    let elem_len = match next_byte {
        ZIPMAP_BIGLEN => zipmap.read_u32::<LittleEndian>()?,
        ZIPMAP_END => {
            return Err(RdbError::ParsingError {
                context: "read_zipmap_entry",
                message: format!("Unknown encoding value: {}", next_byte),
            });
        }
        _ => next_byte as u32,
    };

    read_exact(zipmap, elem_len as usize)
}
