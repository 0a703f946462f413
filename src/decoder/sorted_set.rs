use super::common::utils::{read_blob, read_exact, read_length};
use super::common::{read_list_pack_entries, read_ziplist_entries};
use crate::constants::zset_score;
use crate::types::{DecodedValue, RdbError, RdbResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;
use std::str;

pub fn read_sorted_set<R: Read>(input: &mut R, is_zset2: bool) -> RdbResult<DecodedValue> {
    let set_items = read_length(input)?;
    let mut values = Vec::with_capacity((set_items as usize).min(4096));

    for _ in 0..set_items {
        let val = read_blob(input)?;

        let score = if is_zset2 {
            // ZSET2 format uses binary encoding of float64
            input.read_f64::<LittleEndian>()?
        } else {
            // ZSET stores scores as text
            let score_length = input.read_u8()?;
            match score_length {
                zset_score::NAN => f64::NAN,
                zset_score::POS_INF => f64::INFINITY,
                zset_score::NEG_INF => f64::NEG_INFINITY,
                _ => {
                    let tmp = read_exact(input, score_length as usize)?;
                    parse_score(&tmp, "read_sorted_set")?
                }
            }
        };

        values.push((score, val));
    }

    Ok(DecodedValue::SortedSet(values))
}

pub fn read_sorted_set_ziplist<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let ziplist = read_blob(input)?;
    let entries = read_ziplist_entries(&ziplist, "read_sorted_set_ziplist")?;
    Ok(DecodedValue::SortedSet(pair_scores(
        entries,
        "read_sorted_set_ziplist",
    )?))
}

pub fn read_sorted_set_listpack<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let listpack = read_blob(input)?;
    let entries = read_list_pack_entries(&listpack, "read_sorted_set_listpack")?;
    Ok(DecodedValue::SortedSet(pair_scores(
        entries,
        "read_sorted_set_listpack",
    )?))
}

/// Compact encodings store `member, score` alternately with the score as text.
fn pair_scores(entries: Vec<Vec<u8>>, context: &'static str) -> RdbResult<Vec<(f64, Vec<u8>)>> {
    if entries.len() % 2 != 0 {
        return Err(RdbError::ParsingError {
            context,
            message: format!("odd number of entries: {}", entries.len()),
        });
    }

    let mut values = Vec::with_capacity(entries.len() / 2);
    let mut entries = entries.into_iter();
    while let (Some(member), Some(score)) = (entries.next(), entries.next()) {
        values.push((parse_score(&score, context)?, member));
    }
    Ok(values)
}

fn parse_score(raw: &[u8], context: &'static str) -> RdbResult<f64> {
    str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| RdbError::ParsingError {
            context,
            message: format!("Failed to parse score: {:?}", String::from_utf8_lossy(raw)),
        })
}
