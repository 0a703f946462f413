//! Value payload decoding: turns the raw bytes captured by the loader into a
//! [`DecodedValue`].

pub(crate) mod common;
mod hash;
mod list;
mod set;
mod sorted_set;

use std::io::Cursor;

use self::common::utils::read_blob;
use crate::constants::encoding_type;
use crate::types::{DecodedValue, RdbError, RdbResult};

/// Decodes a value payload: one type byte followed by the value body.
pub trait ValueDecoder: Sync {
    fn decode(&self, raw: &[u8]) -> RdbResult<DecodedValue>;
}

/// Decoder for the value encodings Redis writes into RDB files.
#[derive(Debug, Default, Clone, Copy)]
pub struct RdbValueDecoder;

impl ValueDecoder for RdbValueDecoder {
    fn decode(&self, raw: &[u8]) -> RdbResult<DecodedValue> {
        decode_value(raw)
    }
}

pub fn decode_value(raw: &[u8]) -> RdbResult<DecodedValue> {
    let (&value_type, body) = raw
        .split_first()
        .ok_or(RdbError::MissingValue("value type"))?;
    let mut input = Cursor::new(body);

    let value = match value_type {
        encoding_type::STRING => DecodedValue::Scalar(read_blob(&mut input)?),
        encoding_type::LIST => list::read_linked_list(&mut input)?,
        encoding_type::SET => set::read_set(&mut input)?,
        encoding_type::ZSET => sorted_set::read_sorted_set(&mut input, false)?,
        encoding_type::HASH => hash::read_hash(&mut input)?,
        encoding_type::ZSET_2 => sorted_set::read_sorted_set(&mut input, true)?,
        encoding_type::HASH_ZIPMAP => hash::read_hash_zipmap(&mut input)?,
        encoding_type::LIST_ZIPLIST => list::read_list_ziplist(&mut input)?,
        encoding_type::SET_INTSET => set::read_set_intset(&mut input)?,
        encoding_type::ZSET_ZIPLIST => sorted_set::read_sorted_set_ziplist(&mut input)?,
        encoding_type::HASH_ZIPLIST => hash::read_hash_ziplist(&mut input)?,
        encoding_type::LIST_QUICKLIST => list::read_quicklist(&mut input)?,
        encoding_type::HASH_LIST_PACK => hash::read_hash_list_pack(&mut input)?,
        encoding_type::ZSET_LIST_PACK => sorted_set::read_sorted_set_listpack(&mut input)?,
        encoding_type::LIST_QUICKLIST_2 => list::read_quicklist_2(&mut input)?,
        encoding_type::SET_LIST_PACK => set::read_set_list_pack(&mut input)?,
        unknown_type => return Err(RdbError::UnknownEncoding(unknown_type)),
    };

    let consumed = input.position() as usize;
    if consumed != body.len() {
        return Err(RdbError::ParsingError {
            context: "decode_value",
            message: format!("{} trailing bytes after value", body.len() - consumed),
        });
    }

    Ok(value)
}
