//! # Transport
//!
//! Purpose: Move whole sentences over a blocking byte stream. The engine
//! only ever sees word sequences; framing and socket details live here.
//!
//! ## Design Principles
//! 1. **Narrow Seam**: `Transport` is the one trait the communicator needs,
//!    which keeps the demultiplexer testable with scripted frames.
//! 2. **Buffer Reuse**: Read and write buffers live on the connection and
//!    are reused across calls.
//! 3. **Blocking Semantics**: Reads block until a sentence is available;
//!    timeouts, if any, belong to the socket configuration.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use bytes::BytesMut;
use rosapi_common::{encode_sentence, SentenceParser};

use crate::error::{ApiError, ApiResult};

/// Blocking sentence-level transport consumed by the communicator.
pub trait Transport {
    /// Writes one sentence to the connection.
    fn send_sentence(&mut self, words: &[Vec<u8>]) -> ApiResult<()>;

    /// Reads the next sentence from the connection, blocking until one is
    /// available. An empty word list means "no frame yet, retry".
    fn receive_sentence(&mut self) -> ApiResult<Vec<Vec<u8>>>;
}

/// Configuration for the TCP transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Device address, e.g. "192.168.88.1:8728".
    pub addr: String,
    /// Optional TCP read timeout.
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    pub write_timeout: Option<Duration>,
    /// Optional TCP connect timeout.
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            addr: "192.168.88.1:8728".to_string(),
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
        }
    }
}

/// Single TCP connection with reusable sentence buffers.
pub struct TcpTransport {
    stream: TcpStream,
    parser: SentenceParser,
    read_buf: BytesMut,
    write_buf: BytesMut,
}

impl TcpTransport {
    /// Connects to the device described by the configuration.
    pub fn connect(config: &TransportConfig) -> ApiResult<Self> {
        let addr: SocketAddr = config.addr.parse().map_err(|_| ApiError::InvalidAddress)?;
        let stream = match config.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        if let Some(timeout) = config.read_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }
        if let Some(timeout) = config.write_timeout {
            stream.set_write_timeout(Some(timeout))?;
        }
        // Disable Nagle to keep request latency low for small sentences.
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }

    /// Wraps an already-connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        TcpTransport {
            stream,
            parser: SentenceParser::new(),
            read_buf: BytesMut::with_capacity(4 * 1024),
            write_buf: BytesMut::with_capacity(512),
        }
    }
}

impl Transport for TcpTransport {
    fn send_sentence(&mut self, words: &[Vec<u8>]) -> ApiResult<()> {
        self.write_buf.clear();
        encode_sentence(words, &mut self.write_buf);
        self.stream.write_all(&self.write_buf)?;
        self.stream.flush()?;
        Ok(())
    }

    fn receive_sentence(&mut self) -> ApiResult<Vec<Vec<u8>>> {
        loop {
            if let Some(words) = self.parser.parse(&mut self.read_buf)? {
                return Ok(words);
            }
            let mut chunk = [0u8; 4 * 1024];
            let bytes = self.stream.read(&mut chunk)?;
            if bytes == 0 {
                return Err(ApiError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed mid-sentence",
                )));
            }
            self.read_buf.extend_from_slice(&chunk[..bytes]);
        }
    }
}
