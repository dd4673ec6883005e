//! # Client Facade
//!
//! Purpose: Expose a compact connect-and-execute surface over the
//! communicator and TCP transport for callers that do not need to manage
//! tags themselves.

use rosapi_common::{Query, Tag};

use crate::communicator::{ApiResponse, Communicator};
use crate::connection::{TcpTransport, TransportConfig};
use crate::error::ApiResult;

/// Synchronous API client over a single TCP connection.
///
/// This is a facade over [`Communicator`]: `execute` issues one command and
/// blocks for its result, while `send`/`receive`/`cancel` pass through for
/// callers that interleave requests.
pub struct ApiClient {
    communicator: Communicator<TcpTransport>,
}

impl ApiClient {
    /// Connects with default transport configuration.
    pub fn connect(addr: impl Into<String>) -> ApiResult<Self> {
        let config = TransportConfig {
            addr: addr.into(),
            ..TransportConfig::default()
        };
        Self::with_config(&config)
    }

    /// Connects with a custom transport configuration.
    pub fn with_config(config: &TransportConfig) -> ApiResult<Self> {
        let transport = TcpTransport::connect(config)?;
        Ok(ApiClient {
            communicator: Communicator::new(transport),
        })
    }

    /// Sends one command and blocks until its result is assembled.
    pub fn execute(
        &mut self,
        path: &[&[u8]],
        verb: &[u8],
        arguments: &[(&[u8], &[u8])],
        queries: &[(&[u8], &[u8])],
        additional_queries: &[Query],
    ) -> ApiResult<ApiResponse> {
        let tag = self
            .communicator
            .send(path, verb, arguments, queries, additional_queries)?;
        self.communicator.receive(tag)
    }

    /// Sends a command without waiting; see [`Communicator::send`].
    pub fn send(
        &mut self,
        path: &[&[u8]],
        verb: &[u8],
        arguments: &[(&[u8], &[u8])],
        queries: &[(&[u8], &[u8])],
        additional_queries: &[Query],
    ) -> ApiResult<Tag> {
        self.communicator
            .send(path, verb, arguments, queries, additional_queries)
    }

    /// Blocks for the result of an earlier `send`; see
    /// [`Communicator::receive`].
    pub fn receive(&mut self, tag: Tag) -> ApiResult<ApiResponse> {
        self.communicator.receive(tag)
    }

    /// Evicts an abandoned request; see [`Communicator::cancel`].
    pub fn cancel(&mut self, tag: Tag) -> bool {
        self.communicator.cancel(tag)
    }
}
