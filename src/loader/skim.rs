use byteorder::ReadBytesExt;
use std::io::Read;

use crate::constants::{encoding_type, zset_score};
use crate::decoder::common::utils::{read_length, skip, skip_blob};
use crate::types::{RdbError, RdbOk};

/// Walks a value body far enough to find where it ends, without decoding it.
pub(crate) fn skim_value<R: Read>(input: &mut R, value_type: u8) -> RdbOk {
    match value_type {
        encoding_type::STRING
        | encoding_type::HASH_ZIPMAP
        | encoding_type::LIST_ZIPLIST
        | encoding_type::SET_INTSET
        | encoding_type::ZSET_ZIPLIST
        | encoding_type::HASH_ZIPLIST
        | encoding_type::HASH_LIST_PACK
        | encoding_type::ZSET_LIST_PACK
        | encoding_type::SET_LIST_PACK => skip_blob(input),
        encoding_type::LIST | encoding_type::SET | encoding_type::LIST_QUICKLIST => {
            let count = read_length(input)? as u64;
            skip_blobs(input, count)
        }
        encoding_type::HASH => {
            let pairs = read_length(input)? as u64;
            skip_blobs(input, pairs * 2)
        }
        encoding_type::ZSET => {
            for _ in 0..read_length(input)? {
                skip_blob(input)?;
                let score_length = input.read_u8()?;
                if score_length < zset_score::NAN {
                    skip(input, score_length as u64)?;
                }
            }
            Ok(())
        }
        encoding_type::ZSET_2 => {
            for _ in 0..read_length(input)? {
                skip_blob(input)?;
                skip(input, 8)?;
            }
            Ok(())
        }
        encoding_type::LIST_QUICKLIST_2 => {
            for _ in 0..read_length(input)? {
                let _container = read_length(input)?;
                skip_blob(input)?;
            }
            Ok(())
        }
        _ => Err(RdbError::UnknownEncoding(value_type)),
    }
}

fn skip_blobs<R: Read>(input: &mut R, count: u64) -> RdbOk {
    for _ in 0..count {
        skip_blob(input)?;
    }
    Ok(())
}
