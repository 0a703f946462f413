//! Filter trait and implementations to skip records in the loader

use regex::bytes::Regex;

use crate::types::Type;

/// A trait to decide which databases, types or keys reach the decoders
pub trait Filter {
    fn matches_db(&self, _db: u32) -> bool {
        true
    }
    fn matches_type(&self, _enc_type: u8) -> bool {
        true
    }
    fn matches_key(&self, _key: &[u8]) -> bool {
        true
    }
}

/// A filter to match by database, type or a regular expression against key names
#[derive(Debug, Default, Clone)]
pub struct Simple {
    databases: Vec<u32>,
    types: Vec<Type>,
    keys: Option<Regex>,
}

impl Simple {
    pub fn new() -> Simple {
        Simple::default()
    }

    pub fn add_database(&mut self, db: u32) {
        self.databases.push(db);
    }

    pub fn add_type(&mut self, typ: Type) {
        self.types.push(typ);
    }

    pub fn add_keys(&mut self, re: Regex) {
        self.keys = Some(re);
    }
}

impl Filter for Simple {
    fn matches_db(&self, db: u32) -> bool {
        self.databases.is_empty() || self.databases.contains(&db)
    }

    fn matches_type(&self, enc_type: u8) -> bool {
        if self.types.is_empty() {
            return true;
        }

        match Type::from_encoding(enc_type) {
            Ok(typ) => self.types.contains(&typ),
            Err(_) => false,
        }
    }

    fn matches_key(&self, key: &[u8]) -> bool {
        match &self.keys {
            None => true,
            Some(re) => re.is_match(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::encoding_type;

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Simple::new();
        assert!(filter.matches_db(7));
        assert!(filter.matches_type(encoding_type::ZSET_LIST_PACK));
        assert!(filter.matches_key(b"\x00\xff"));
    }

    #[test]
    fn test_filter_by_database_and_type() {
        let mut filter = Simple::new();
        filter.add_database(1);
        filter.add_type(Type::Hash);

        assert!(filter.matches_db(1));
        assert!(!filter.matches_db(0));
        assert!(filter.matches_type(encoding_type::HASH_LIST_PACK));
        assert!(!filter.matches_type(encoding_type::LIST_QUICKLIST_2));
    }

    #[test]
    fn test_filter_by_key_regex() {
        let mut filter = Simple::new();
        filter.add_keys(Regex::new("^user:").unwrap());

        assert!(filter.matches_key(b"user:1"));
        assert!(!filter.matches_key(b"session:1"));
    }
}
