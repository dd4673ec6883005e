//! # Core Protocol Types
//!
//! Purpose: Define the correlation tag and attribute map shared by commands
//! and response frames.
//!
//! ## Design Principles
//!
//! 1. **Opaque Tags**: `Tag` wraps an integer but exposes only ordering,
//!    equality, and a decimal rendering; the decimal-string form is a wire
//!    detail, not a property of the type.
//! 2. **Binary-Safe Attributes**: Attribute names and values are raw bytes;
//!    the protocol never promises UTF-8.
//! 3. **Deterministic Iteration**: Attributes use an ordered map so renders
//!    and tests are stable.

use std::collections::BTreeMap;
use std::fmt;

/// Correlation identifier linking a sent command to its response frames.
///
/// Tags are allocated by the communicator from a per-instance monotonically
/// increasing counter and are never reused while a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(u64);

impl Tag {
    /// Wraps a raw tag value.
    pub const fn new(value: u64) -> Self {
        Tag(value)
    }

    /// Returns the raw tag value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Renders the tag as the wire-format `.tag=` word.
    pub fn to_word(self) -> Vec<u8> {
        format!(".tag={}", self.0).into_bytes()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attribute map carried by one command or response frame.
pub type Attributes = BTreeMap<Vec<u8>, Vec<u8>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_display_is_decimal() {
        assert_eq!(Tag::new(17).to_string(), "17");
    }

    #[test]
    fn test_tag_word_format() {
        assert_eq!(Tag::new(5).to_word(), b".tag=5".to_vec());
    }

    #[test]
    fn test_tag_ordering() {
        assert!(Tag::new(1) < Tag::new(2));
        assert_eq!(Tag::new(3), Tag::new(3));
    }
}
