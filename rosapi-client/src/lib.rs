//! # RouterOS API Sync Client
//!
//! Purpose: Provide a lightweight, synchronous client engine for the
//! tag-multiplexed RouterOS API protocol: issue commands, then assemble
//! per-request results from an arbitrary interleaving of response frames
//! read off one connection.
//!
//! ## Design Principles
//! 1. **One Read Cursor**: A single blocking read loop services every
//!    in-flight request; frames are routed to per-tag collectors.
//! 2. **Facade Pattern**: `ApiClient` hides transport and demultiplexing
//!    details behind a connect-and-execute surface.
//! 3. **Explicit Errors**: Trap, fatal, and desynchronization failures are
//!    distinct error variants; nothing is retried or swallowed internally.
//! 4. **Single Owner**: All mutating operations take `&mut self`, so one
//!    communicator belongs to one execution context by construction.

mod client;
mod communicator;
mod connection;
mod error;

pub use client::ApiClient;
pub use communicator::{ApiResponse, Communicator};
pub use connection::{TcpTransport, Transport, TransportConfig};
pub use error::{ApiError, ApiResult};
