use crate::types::{RdbError, RdbResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

const LIST_PACK_END: u8 = 0xFF;

/// Skip the backlen field in a listpack entry
/// The backlen field is used to traverse the listpack backwards
fn skip_backlen<R: Read>(reader: &mut R, element_len: u64) -> RdbResult<()> {
    let backlen = if element_len <= 127 {
        1
    } else if element_len < (1 << 14) - 1 {
        2
    } else if element_len < (1 << 21) - 1 {
        3
    } else if element_len < (1 << 28) - 1 {
        4
    } else {
        5
    };

    let mut buf = [0u8; 5];
    reader.read_exact(&mut buf[..backlen])?;
    Ok(())
}

/// Reads the listpack header: total byte size and element count.
pub fn read_list_pack_header<R: Read>(reader: &mut R) -> RdbResult<(u32, u16)> {
    let total_bytes = reader.read_u32::<LittleEndian>()?;
    let num_elements = reader.read_u16::<LittleEndian>()?;
    Ok((total_bytes, num_elements))
}

/// Reads all entries of a serialized listpack up to its end marker.
pub fn read_list_pack_entries(listpack: &[u8], context: &'static str) -> RdbResult<Vec<Vec<u8>>> {
    let mut reader = Cursor::new(listpack);
    let (total_bytes, num_elements) = read_list_pack_header(&mut reader)?;
    if total_bytes as usize != listpack.len() {
        return Err(RdbError::parsing(
            context,
            format!(
                "listpack header says {} bytes, blob has {}",
                total_bytes,
                listpack.len()
            ),
        ));
    }

    let mut values = Vec::with_capacity(num_elements as usize);
    loop {
        match listpack.get(reader.position() as usize) {
            Some(&LIST_PACK_END) => break,
            Some(_) => values.push(read_list_pack_entry_as_string(&mut reader)?),
            None => return Err(RdbError::MissingValue("listpack end marker")),
        }
    }

    // u16::MAX means the element count is unknown
    if num_elements != u16::MAX && values.len() != num_elements as usize {
        return Err(RdbError::parsing(
            context,
            format!(
                "listpack header announced {} entries, found {}",
                num_elements,
                values.len()
            ),
        ));
    }

    Ok(values)
}

/// Read a single entry from a listpack as a string
/// Format (first bits):
/// 0xxxxxxx: 7-bit unsigned integer
/// 10xxxxxx: string with 6-bit length
/// 110xxxxx: 13-bit signed integer
/// 1110xxxx: string with 12-bit length
/// 1111xxxx: 32-bit string length or 16/24/32/64-bit integers
pub fn read_list_pack_entry_as_string<R: Read>(reader: &mut R) -> RdbResult<Vec<u8>> {
    let header = reader.read_u8()?;

    if header & 0x80 == 0 {
        skip_backlen(reader, 1)?;
        return Ok((header & 0x7F).to_string().into_bytes());
    }

    match header >> 6 {
        2 => {
            let str_len = (header & 0x3F) as usize;
            let mut result = vec![0; str_len];
            reader.read_exact(&mut result)?;

            skip_backlen(reader, 1 + str_len as u64)?;
            Ok(result)
        }
        _ => match header >> 4 {
            12 | 13 => {
                let next = reader.read_u8()?;
                let mut val = ((((header & 0x1F) as u16) << 8) | next as u16) as i64;
                if val >= 1 << 12 {
                    val -= 1 << 13;
                }
                skip_backlen(reader, 2)?;
                Ok(val.to_string().into_bytes())
            }
            14 => {
                let len_high = (header & 0x0F) as usize;
                let len_low = reader.read_u8()? as usize;
                let str_len = (len_high << 8) | len_low;

                let mut result = vec![0; str_len];
                reader.read_exact(&mut result)?;

                skip_backlen(reader, (2 + str_len) as u64)?;
                Ok(result)
            }
            _ => match header & 0x0F {
                0 => {
                    let str_len = reader.read_u32::<LittleEndian>()? as usize;

                    let mut result = vec![0; str_len];
                    reader.read_exact(&mut result)?;

                    skip_backlen(reader, (5 + str_len) as u64)?;
                    Ok(result)
                }
                1 => {
                    let val = reader.read_i16::<LittleEndian>()? as i64;
                    skip_backlen(reader, 3)?;
                    Ok(val.to_string().into_bytes())
                }
                2 => {
                    let mut bytes = [0u8; 4];
                    reader.read_exact(&mut bytes[1..])?;
                    let val = (i32::from_le_bytes(bytes) >> 8) as i64;
                    skip_backlen(reader, 4)?;
                    Ok(val.to_string().into_bytes())
                }
                3 => {
                    let val = reader.read_i32::<LittleEndian>()? as i64;
                    skip_backlen(reader, 5)?;
                    Ok(val.to_string().into_bytes())
                }
                4 => {
                    let val = reader.read_i64::<LittleEndian>()?;
                    skip_backlen(reader, 9)?;
                    Ok(val.to_string().into_bytes())
                }
                15 => Err(RdbError::MissingValue("listpack entry")),
                _ => Err(RdbError::parsing(
                    "read_list_pack_entry_as_string",
                    format!("Unknown encoding value: {}", header),
                )),
            },
        },
    }
}
