use serde::Serialize;

/// One output line. Fields serialize in declaration order.
#[derive(Debug, Serialize)]
pub struct OutputItem<'a> {
    pub db: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub expireat: u64,
    pub key: &'a str,
    pub key64: &'a str,
    #[serde(flatten)]
    pub element: Element,
}

/// Type-specific fields of an [`OutputItem`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Element {
    String {
        value64: String,
    },
    List {
        index: usize,
        value64: String,
    },
    Hash {
        field: String,
        field64: String,
        value64: String,
    },
    Set {
        member: String,
        member64: String,
    },
    SortedSet {
        member: String,
        member64: String,
        score: f64,
    },
}

impl Element {
    pub fn kind(&self) -> &'static str {
        match self {
            Element::String { .. } => "string",
            Element::List { .. } => "list",
            Element::Hash { .. } => "hash",
            Element::Set { .. } => "set",
            Element::SortedSet { .. } => "zset",
        }
    }
}
