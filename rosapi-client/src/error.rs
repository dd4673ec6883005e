//! # Client Errors
//!
//! Purpose: Surface the three failure classes of the receive path -
//! per-request communication errors, connection-ending fatal errors, and
//! demultiplexing desynchronization - alongside IO and framing failures.

use rosapi_common::{ProtocolError, Tag};
use thiserror::Error;

/// Result type for the sync client.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the sync client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or IO failure while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Wire framing or parse error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// The device reported a per-request error (trap, then done).
    ///
    /// Recoverable per request: the connection itself is still usable.
    #[error("error \"{}\" executing command {command}", String::from_utf8_lossy(.payload))]
    Communication {
        /// Raw error payload from the trap frame.
        payload: Vec<u8>,
        /// Rendering of the command that failed.
        command: String,
    },
    /// The device reported a connection-ending error for this request.
    ///
    /// Not recoverable on this connection: tear down and reconnect.
    #[error("fatal error executing command {command}")]
    Fatal {
        /// Rendering of the command that was in flight.
        command: String,
    },
    /// A frame arrived for a tag with no collector, or a receive was issued
    /// for a tag that is not outstanding. Demultiplexing is desynchronized.
    #[error("unknown tag {0}")]
    UnknownTag(Tag),
    /// Address could not be parsed into a socket address.
    #[error("invalid address")]
    InvalidAddress,
}
