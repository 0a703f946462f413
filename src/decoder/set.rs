use super::common::read_list_pack_entries;
use super::common::utils::{read_blob, read_sequence};
use crate::types::{DecodedValue, RdbError, RdbResult};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

pub fn read_set<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let members = read_sequence(input, |input| read_blob(input))?;
    Ok(DecodedValue::Set(members))
}

pub fn read_set_intset<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let intset = read_blob(input)?;

    let mut reader = Cursor::new(intset);
    let byte_size = reader.read_u32::<LittleEndian>()?;
    let intset_length = reader.read_u32::<LittleEndian>()?;

    let mut members = Vec::with_capacity((intset_length as usize).min(4096));

    for _ in 0..intset_length {
        let val = match byte_size {
            2 => reader.read_i16::<LittleEndian>()? as i64,
            4 => reader.read_i32::<LittleEndian>()? as i64,
            8 => reader.read_i64::<LittleEndian>()?,
            _ => {
                return Err(RdbError::ParsingError {
                    context: "read_set_intset",
                    message: format!("unhandled byte size in intset: {}", byte_size),
                })
            }
        };

        members.push(val.to_string().into_bytes());
    }

    Ok(DecodedValue::Set(members))
}

pub fn read_set_list_pack<R: Read>(input: &mut R) -> RdbResult<DecodedValue> {
    let listpack = read_blob(input)?;
    let members = read_list_pack_entries(&listpack, "read_set_list_pack")?;
    Ok(DecodedValue::Set(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2, &[0x01, 0x00, 0xFF, 0xFF], &["1", "-1"])]
    #[case(4, &[0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00], &["65536", "2"])]
    fn test_read_set_intset(
        #[case] byte_size: u32,
        #[case] body: &[u8],
        #[case] expected: &[&str],
    ) {
        let mut intset = Vec::new();
        intset.extend_from_slice(&byte_size.to_le_bytes());
        intset.extend_from_slice(&(expected.len() as u32).to_le_bytes());
        intset.extend_from_slice(body);
        let mut input = vec![intset.len() as u8];
        input.extend_from_slice(&intset);

        let expected = expected.iter().map(|m| m.as_bytes().to_vec()).collect();
        assert_eq!(
            DecodedValue::Set(expected),
            read_set_intset(&mut Cursor::new(input)).unwrap()
        );
    }

    #[test]
    fn test_read_set_intset_bad_width() {
        let intset = vec![3, 0, 0, 0, 1, 0, 0, 0, 1, 2, 3];
        let mut input = vec![intset.len() as u8];
        input.extend_from_slice(&intset);
        assert!(read_set_intset(&mut Cursor::new(input)).is_err());
    }

    #[test]
    fn test_read_set() {
        let input = vec![2, 1, b'm', 2, b'n', b'o'];
        assert_eq!(
            DecodedValue::Set(vec![b"m".to_vec(), b"no".to_vec()]),
            read_set(&mut Cursor::new(input)).unwrap()
        );
    }
}
