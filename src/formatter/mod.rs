//! Flattens decoded values into JSON lines, one per element.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub use self::json::{Element, OutputItem};

use crate::types::{DecodedValue, InputRecord, RdbResult};

pub mod json;

/// Printable bytes kept verbatim in the text form; everything else becomes `.`.
const PRINTABLE: std::ops::RangeInclusive<u8> = b'#'..=b'~';

/// Lossy display form of `bytes`: same length, one char per byte.
pub fn to_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if PRINTABLE.contains(&b) { b as char } else { '.' })
        .collect()
}

pub fn to_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Builds the serialized lines for one record, newline-terminated, in the
/// value's element order.
pub fn flatten(record: &InputRecord, value: &DecodedValue) -> RdbResult<Vec<String>> {
    let key = to_text(&record.key);
    let key64 = to_base64(&record.key);

    let elements: Vec<Element> = match value {
        DecodedValue::Scalar(value) => vec![Element::String {
            value64: to_base64(value),
        }],
        DecodedValue::List(values) => values
            .iter()
            .enumerate()
            .map(|(index, value)| Element::List {
                index,
                value64: to_base64(value),
            })
            .collect(),
        DecodedValue::Hash(values) => values
            .iter()
            .map(|(field, value)| Element::Hash {
                field: to_text(field),
                field64: to_base64(field),
                value64: to_base64(value),
            })
            .collect(),
        DecodedValue::Set(members) => members
            .iter()
            .map(|member| Element::Set {
                member: to_text(member),
                member64: to_base64(member),
            })
            .collect(),
        DecodedValue::SortedSet(values) => values
            .iter()
            .map(|(score, member)| Element::SortedSet {
                member: to_text(member),
                member64: to_base64(member),
                score: *score,
            })
            .collect(),
    };
    debug_assert_eq!(value.element_count(), elements.len());

    elements
        .into_iter()
        .map(|element| {
            let item = OutputItem {
                db: record.db,
                kind: element.kind(),
                expireat: record.expire_at,
                key: &key,
                key64: &key64,
                element,
            };
            let mut line = serde_json::to_string(&item)?;
            line.push('\n');
            Ok(line)
        })
        .collect()
}
