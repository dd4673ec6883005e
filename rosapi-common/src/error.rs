//! # Protocol Errors
//!
//! Purpose: Classify wire-level failures so the client can distinguish
//! malformed framing from higher-level command failures.

use thiserror::Error;

/// Result type for wire-level operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors produced while framing or parsing sentences.
///
/// All of these indicate the byte stream no longer matches the protocol
/// grammar; none of them are retryable on the same connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A word length prefix began with a reserved control byte.
    #[error("reserved length control byte {0:#04x}")]
    ReservedLength(u8),
    /// The first word of a response sentence is not a known reply word.
    #[error("unknown reply word \"{0}\"")]
    UnknownReplyWord(String),
    /// A response sentence began with an attribute word instead of a reply word.
    #[error("response sentence is missing its reply word")]
    MissingReplyWord,
    /// A `.tag=` word did not carry a decimal tag value.
    #[error("malformed tag word \"{0}\"")]
    MalformedTag(String),
    /// A response frame carried no `.tag=` word at all.
    #[error("response frame carries no tag")]
    MissingTag,
}
