// rosapi-common - Shared wire-protocol definitions for the RouterOS API client
//
// This crate defines the word framing, sentence structures, and query
// predicates used to talk to the device.

pub mod error;
pub mod query;
pub mod sentence;
pub mod types;
pub mod word;

// Re-export for convenience
pub use error::*;
pub use query::*;
pub use sentence::*;
pub use types::*;
pub use word::*;
