//! # Query Predicates
//!
//! Purpose: Represent the filter words appended to a command. The engine
//! treats these as opaque pass-through values with an equality convenience
//! constructor for the common key/value case.

/// One filter predicate attached to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// `?key=value` - matches entries whose attribute equals the value.
    Equal { key: Vec<u8>, value: Vec<u8> },
    /// `?key` - matches entries that carry the attribute at all.
    Present { key: Vec<u8> },
    /// A pre-built query word passed through verbatim.
    Raw { word: Vec<u8> },
}

impl Query {
    /// Builds an equality predicate.
    pub fn equal(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Query::Equal {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Builds a presence predicate.
    pub fn present(key: impl Into<Vec<u8>>) -> Self {
        Query::Present { key: key.into() }
    }

    /// Wraps a raw query word.
    pub fn raw(word: impl Into<Vec<u8>>) -> Self {
        Query::Raw { word: word.into() }
    }

    /// Renders the predicate as its wire word.
    pub fn word(&self) -> Vec<u8> {
        match self {
            Query::Equal { key, value } => {
                let mut word = Vec::with_capacity(key.len() + value.len() + 2);
                word.push(b'?');
                word.extend_from_slice(key);
                word.push(b'=');
                word.extend_from_slice(value);
                word
            }
            Query::Present { key } => {
                let mut word = Vec::with_capacity(key.len() + 1);
                word.push(b'?');
                word.extend_from_slice(key);
                word
            }
            Query::Raw { word } => word.clone(),
        }
    }
}
