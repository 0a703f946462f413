use super::common::utils::{read_blob, read_length, read_sequence};
use super::common::{read_list_pack_entries, read_ziplist_entries};
use crate::constants::quicklist;
use crate::types::{DecodedValue, RdbError, RdbResult};
use std::io::Read;

pub fn read_linked_list<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let values = read_sequence(input, |input| read_blob(input))?;
    Ok(DecodedValue::List(values))
}

pub fn read_list_ziplist<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let ziplist = read_blob(input)?;
    let values = read_ziplist_entries(&ziplist, "read_list_ziplist")?;
    Ok(DecodedValue::List(values))
}

pub fn read_quicklist<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let len = read_length(input)?;
    let mut values = Vec::new();

    for _ in 0..len {
        let ziplist = read_blob(input)?;
        values.append(&mut read_ziplist_entries(&ziplist, "read_quicklist")?);
    }

    Ok(DecodedValue::List(values))
}

pub fn read_quicklist_2<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let len = read_length(input)?;
    let mut values = Vec::new();

    for _ in 0..len {
        let container_type = read_length(input)?;
        match container_type {
            quicklist::NODE_CONTAINER_PLAIN => {
                values.push(read_blob(input)?);
            }
            quicklist::NODE_CONTAINER_PACKED => {
                let listpack = read_blob(input)?;
                values.append(&mut read_list_pack_entries(&listpack, "read_quicklist_2")?);
            }
            _ => {
                return Err(RdbError::ParsingError {
                    context: "read_quicklist_2",
                    message: format!("Unknown container type: {}", container_type),
                })
            }
        }
    }

    Ok(DecodedValue::List(values))
}
