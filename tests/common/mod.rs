#![allow(dead_code)]

use rdb_decode::constants::{encoding_type, op_code};

/// Builds small RDB dumps byte by byte.
pub struct RdbBuilder {
    buf: Vec<u8>,
}

impl RdbBuilder {
    pub fn new(version: u32) -> Self {
        RdbBuilder {
            buf: format!("REDIS{:04}", version).into_bytes(),
        }
    }

    pub fn select_db(mut self, db: u32) -> Self {
        self.buf.push(op_code::SELECTDB);
        put_length(&mut self.buf, db as usize);
        self
    }

    pub fn expire_ms(mut self, at: u64) -> Self {
        self.buf.push(op_code::EXPIRETIME_MS);
        self.buf.extend_from_slice(&at.to_le_bytes());
        self
    }

    pub fn aux(mut self, key: &str, value: &str) -> Self {
        self.buf.push(op_code::AUX);
        put_string(&mut self.buf, key.as_bytes());
        put_string(&mut self.buf, value.as_bytes());
        self
    }

    pub fn string(mut self, key: &[u8], value: &[u8]) -> Self {
        self.entry(encoding_type::STRING, key);
        put_string(&mut self.buf, value);
        self
    }

    pub fn list<V: AsRef<[u8]>>(mut self, key: &[u8], values: &[V]) -> Self {
        self.entry(encoding_type::LIST, key);
        put_length(&mut self.buf, values.len());
        for value in values {
            put_string(&mut self.buf, value.as_ref());
        }
        self
    }

    pub fn set<M: AsRef<[u8]>>(mut self, key: &[u8], members: &[M]) -> Self {
        self.entry(encoding_type::SET, key);
        put_length(&mut self.buf, members.len());
        for member in members {
            put_string(&mut self.buf, member.as_ref());
        }
        self
    }

    pub fn hash<F: AsRef<[u8]>, V: AsRef<[u8]>>(mut self, key: &[u8], pairs: &[(F, V)]) -> Self {
        self.entry(encoding_type::HASH, key);
        put_length(&mut self.buf, pairs.len());
        for (field, value) in pairs {
            put_string(&mut self.buf, field.as_ref());
            put_string(&mut self.buf, value.as_ref());
        }
        self
    }

    pub fn zset<M: AsRef<[u8]>>(mut self, key: &[u8], pairs: &[(M, f64)]) -> Self {
        self.entry(encoding_type::ZSET_2, key);
        put_length(&mut self.buf, pairs.len());
        for (member, score) in pairs {
            put_string(&mut self.buf, member.as_ref());
            self.buf.extend_from_slice(&score.to_le_bytes());
        }
        self
    }

    /// A record whose value body is one string blob, whatever `value_type` says.
    pub fn blob_value(mut self, value_type: u8, key: &[u8], body: &[u8]) -> Self {
        self.entry(value_type, key);
        put_string(&mut self.buf, body);
        self
    }

    /// Appends the EOF marker and an (unchecked) checksum.
    pub fn build(mut self) -> Vec<u8> {
        self.buf.push(op_code::EOF);
        self.buf.extend_from_slice(&[0u8; 8]);
        self.buf
    }

    fn entry(&mut self, value_type: u8, key: &[u8]) {
        self.buf.push(value_type);
        put_string(&mut self.buf, key);
    }
}

pub fn put_length(buf: &mut Vec<u8>, len: usize) {
    if len < 1 << 6 {
        buf.push(len as u8);
    } else if len < 1 << 14 {
        buf.push(0x40 | (len >> 8) as u8);
        buf.push(len as u8);
    } else {
        buf.push(0x80);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    }
}

pub fn put_string(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_length(buf, bytes.len());
    buf.extend_from_slice(bytes);
}

/// A dump mixing every value kind, `rounds` times over.
///
/// Each round holds 5 records and 1 + 3 + 2 + 2 + 2 = 10 elements.
pub fn mixed_dump(rounds: usize) -> Vec<u8> {
    let mut builder = RdbBuilder::new(9).aux("redis-ver", "7.0.0").select_db(0);
    for i in 0..rounds {
        let key = |kind: &str| format!("{}:{}", kind, i).into_bytes();
        builder = builder
            .string(&key("string"), format!("value {}", i).as_bytes())
            .list(&key("list"), &["a", "b", "c"])
            .set(&key("set"), &["x", "y"])
            .hash(&key("hash"), &[("f1", "v1"), ("f2", "v2")])
            .zset(&key("zset"), &[("m1", 1.0), ("m2", 2.5)]);
    }
    builder.build()
}
