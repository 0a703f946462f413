use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{self, Read};

use crate::types::RdbError;

#[doc(hidden)]
use crate::constants::{constant, encoding, version};

#[doc(hidden)]
pub use crate::types::{RdbOk, RdbResult};

pub fn read_length_with_encoding<R: Read>(input: &mut R) -> RdbResult<(u32, bool)> {
    let length;
    let mut is_encoded = false;

    let enc_type = input.read_u8()?;

    match (enc_type & 0xC0) >> 6 {
        constant::RDB_ENCVAL => {
            is_encoded = true;
            length = (enc_type & 0x3F) as u32;
        }
        constant::RDB_6BITLEN => {
            length = (enc_type & 0x3F) as u32;
        }
        constant::RDB_14BITLEN => {
            let next_byte = input.read_u8()?;
            length = (((enc_type & 0x3F) as u32) << 8) | next_byte as u32;
        }
        _ => match enc_type {
            constant::RDB_32BITLEN => {
                length = input.read_u32::<BigEndian>()?;
            }
            constant::RDB_64BITLEN => {
                let wide = input.read_u64::<BigEndian>()?;
                length = u32::try_from(wide).map_err(|_| {
                    RdbError::parsing("read_length", format!("length {} is too large", wide))
                })?;
            }
            _ => {
                return Err(RdbError::parsing(
                    "read_length",
                    format!("Unknown length encoding: {:#x}", enc_type),
                ))
            }
        },
    }

    Ok((length, is_encoded))
}

pub fn read_length<R: Read>(input: &mut R) -> RdbResult<u32> {
    let (length, _) = read_length_with_encoding(input)?;
    Ok(length)
}

pub fn verify_magic<R: Read>(input: &mut R) -> RdbOk {
    let mut magic = [0; 5];
    input
        .read_exact(&mut magic)
        .map_err(|_| RdbError::MissingValue("magic bytes"))?;

    if magic == constant::RDB_MAGIC.as_bytes() {
        Ok(())
    } else {
        Err(RdbError::MissingValue("invalid magic string"))
    }
}

/// Reads the four ASCII digits following the magic and returns the version.
pub fn verify_version<R: Read>(input: &mut R) -> RdbResult<u32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;

    if !buf.iter().all(u8::is_ascii_digit) {
        return Err(RdbError::MissingValue("invalid version number"));
    }

    let version = buf
        .iter()
        .fold(0u32, |acc, &digit| acc * 10 + (digit - b'0') as u32);

    if !(version::SUPPORTED_MINIMUM..=version::SUPPORTED_MAXIMUM).contains(&version) {
        return Err(RdbError::parsing(
            "verify_version",
            format!("unsupported version {}", version),
        ));
    }

    Ok(version)
}

pub fn read_blob<R: Read>(input: &mut R) -> RdbResult<Vec<u8>> {
    let (length, is_encoded) = read_length_with_encoding(input)?;

    if is_encoded {
        let result = match length {
            encoding::INT8 => int_to_vec(i32::from(input.read_i8()?)),
            encoding::INT16 => int_to_vec(i32::from(input.read_i16::<LittleEndian>()?)),
            encoding::INT32 => int_to_vec(input.read_i32::<LittleEndian>()?),
            encoding::LZF => {
                let compressed_length = read_length(input)?;
                let real_length = read_length(input)?;
                let data = read_exact(input, compressed_length as usize)?;
                lzf::decompress(&data, real_length as usize).map_err(|e| {
                    RdbError::parsing("read_blob", format!("LZF decompression failed: {:?}", e))
                })?
            }
            _ => {
                return Err(RdbError::parsing(
                    "read_blob",
                    format!("Unknown encoding: {}", length),
                ))
            }
        };

        Ok(result)
    } else {
        read_exact(input, length as usize)
    }
}

/// Advances past one string without materializing it.
pub fn skip_blob<R: Read>(input: &mut R) -> RdbOk {
    let (len, is_encoded) = read_length_with_encoding(input)?;

    let skip_bytes = if is_encoded {
        match len {
            encoding::INT8 => 1,
            encoding::INT16 => 2,
            encoding::INT32 => 4,
            encoding::LZF => {
                let compressed_length = read_length(input)?;
                let _real_length = read_length(input)?;
                compressed_length
            }
            _ => {
                return Err(RdbError::parsing(
                    "skip_blob",
                    format!("Unknown encoding value: {}", len),
                ));
            }
        }
    } else {
        len
    };

    skip(input, skip_bytes as u64)
}

pub fn skip<R: Read>(input: &mut R, skip_bytes: u64) -> RdbOk {
    let copied = io::copy(&mut input.by_ref().take(skip_bytes), &mut io::sink())?;
    if copied != skip_bytes {
        return Err(RdbError::Io(io::ErrorKind::UnexpectedEof.into()));
    }
    Ok(())
}

pub fn int_to_vec(number: i32) -> Vec<u8> {
    number.to_string().into_bytes()
}

pub fn read_exact<T: Read>(reader: &mut T, len: usize) -> RdbResult<Vec<u8>> {
    let mut buf = vec![0; len];
    reader.read_exact(&mut buf)?;

    Ok(buf)
}

pub fn read_sequence<R: Read, T, F>(input: &mut R, mut transform: F) -> RdbResult<Vec<T>>
where
    F: FnMut(&mut R) -> RdbResult<T>,
{
    let len = read_length(input)?;
    // lengths come from untrusted input, cap the up-front allocation
    let mut values = Vec::with_capacity((len as usize).min(4096));

    for _ in 0..len {
        values.push(transform(input)?);
    }

    Ok(values)
}
