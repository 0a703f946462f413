use thiserror::Error;

use crate::constants::encoding_type;

#[derive(Error, Debug)]
pub enum RdbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No value found after {0}")]
    MissingValue(&'static str),
    #[error("Unknown encoding type: {0}")]
    UnknownEncoding(u8),
    #[error("Parsing error in {context}: {message}")]
    ParsingError {
        context: &'static str,
        message: String,
    },
    #[error("malformed record framing at byte {offset}: {source}")]
    Framing {
        offset: u64,
        source: Box<RdbError>,
    },
    #[error("decode failed for db={db} key='{key}': {source}")]
    Decode {
        db: u32,
        key: String,
        source: Box<RdbError>,
    },
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("write failed: {0}")]
    Write(#[source] std::io::Error),
    #[error("pipeline aborted")]
    Aborted,
    #[error("{0} thread panicked")]
    Panicked(&'static str),
}

pub type RdbResult<T> = Result<T, RdbError>;

pub type RdbOk = RdbResult<()>;

impl RdbError {
    pub(crate) fn parsing(context: &'static str, message: impl Into<String>) -> RdbError {
        RdbError::ParsingError {
            context,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    String,
    List,
    Set,
    SortedSet,
    Hash,
    Stream,
    Module,
}

impl Type {
    pub fn from_encoding(enc_type: u8) -> RdbResult<Type> {
        match enc_type {
            encoding_type::STRING => Ok(Type::String),
            encoding_type::HASH
            | encoding_type::HASH_ZIPMAP
            | encoding_type::HASH_ZIPLIST
            | encoding_type::HASH_LIST_PACK => Ok(Type::Hash),
            encoding_type::LIST
            | encoding_type::LIST_ZIPLIST
            | encoding_type::LIST_QUICKLIST
            | encoding_type::LIST_QUICKLIST_2 => Ok(Type::List),
            encoding_type::SET | encoding_type::SET_INTSET | encoding_type::SET_LIST_PACK => {
                Ok(Type::Set)
            }
            encoding_type::ZSET
            | encoding_type::ZSET_ZIPLIST
            | encoding_type::ZSET_2
            | encoding_type::ZSET_LIST_PACK => Ok(Type::SortedSet),
            encoding_type::STREAM_LIST_PACKS
            | encoding_type::STREAM_LIST_PACKS_2
            | encoding_type::STREAM_LIST_PACKS_3 => Ok(Type::Stream),
            encoding_type::MODULE | encoding_type::MODULE_2 => Ok(Type::Module),
            _ => Err(RdbError::UnknownEncoding(enc_type)),
        }
    }
}

impl std::str::FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Type, String> {
        match s {
            "string" => Ok(Type::String),
            "list" => Ok(Type::List),
            "set" => Ok(Type::Set),
            "sortedset" | "zset" => Ok(Type::SortedSet),
            "hash" => Ok(Type::Hash),
            other => Err(format!("unknown type '{}'", other)),
        }
    }
}

/// One key as framed by the loader, with its value still in source encoding.
///
/// `raw_value` starts with the value-type byte followed by the exact body
/// bytes as they appeared in the dump.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    pub db: u32,
    pub key: Vec<u8>,
    /// Milliseconds since epoch, `0` when the key does not expire.
    pub expire_at: u64,
    pub raw_value: Vec<u8>,
}

/// A decoded value payload. Element order is the order found in the dump.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Scalar(Vec<u8>),
    List(Vec<Vec<u8>>),
    /// (field, value) pairs; repeated fields are kept as separate pairs.
    Hash(Vec<(Vec<u8>, Vec<u8>)>),
    Set(Vec<Vec<u8>>),
    SortedSet(Vec<(f64, Vec<u8>)>), // (score, member)
}

impl DecodedValue {
    /// Number of output lines this value flattens into.
    pub fn element_count(&self) -> usize {
        match self {
            DecodedValue::Scalar(_) => 1,
            DecodedValue::List(values) => values.len(),
            DecodedValue::Hash(values) => values.len(),
            DecodedValue::Set(members) => members.len(),
            DecodedValue::SortedSet(values) => values.len(),
        }
    }
}
