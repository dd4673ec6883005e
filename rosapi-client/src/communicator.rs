//! # Tag-Multiplexed Communicator
//!
//! Purpose: Assign correlation tags, send commands, and assemble completed
//! per-request results from an arbitrary interleaving of response frames
//! arriving on one connection.
//!
//! ## Design Principles
//! 1. **One Read Loop, Many Requests**: `receive` services frames for every
//!    in-flight tag while waiting for its own; other tags' frames are
//!    buffered into their collectors for a later `receive`.
//! 2. **Explicit Completion**: A collector tracks `done` and `error`
//!    separately; a trap records the error but only the done frame
//!    completes the exchange.
//! 3. **Fail Fast On Desync**: A frame whose tag has no collector aborts -
//!    there is no safe way to keep demultiplexing.
//! 4. **Single Owner**: The buffer and tag counter are only touched through
//!    `&mut self`, so callers serialize access by construction.

use std::collections::HashMap;

use tracing::{debug, trace};

use rosapi_common::{Attributes, Command, ProtocolError, Query, ResponseSentence, ResponseType, Tag};

use crate::connection::Transport;
use crate::error::{ApiError, ApiResult};

/// Per-tag accumulator of streamed results and completion state.
///
/// Created by `send`, mutated only by dispatch, removed when the owning
/// `receive` completes or a fatal frame evicts it.
struct ResponseCollector {
    replies: Vec<Attributes>,
    done_attributes: Attributes,
    done: bool,
    error: Option<Vec<u8>>,
    command: Command,
}

impl ResponseCollector {
    fn new(command: Command) -> Self {
        ResponseCollector {
            replies: Vec::new(),
            done_attributes: Attributes::new(),
            done: false,
            error: None,
            command,
        }
    }
}

/// Fully assembled result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// One attribute map per `!re` frame, in arrival order.
    pub replies: Vec<Attributes>,
    /// Attributes carried by the terminating `!done` frame.
    pub done_attributes: Attributes,
}

impl ApiResponse {
    /// Applies a transform to every reply map and to the done attributes.
    pub fn map<F>(self, mut transform: F) -> Self
    where
        F: FnMut(Attributes) -> Attributes,
    {
        ApiResponse {
            replies: self.replies.into_iter().map(&mut transform).collect(),
            done_attributes: transform(self.done_attributes),
        }
    }
}

/// The protocol engine: tag allocation, command send, and the blocking
/// receive loop that demultiplexes response frames by tag.
pub struct Communicator<T: Transport> {
    transport: T,
    next_tag: u64,
    buffer: HashMap<Tag, ResponseCollector>,
}

impl<T: Transport> Communicator<T> {
    /// Creates a communicator over the given transport.
    pub fn new(transport: T) -> Self {
        Communicator {
            transport,
            next_tag: 0,
            buffer: HashMap::new(),
        }
    }

    /// Sends a command and returns its correlation tag.
    ///
    /// Allocates the next tag (strictly increasing, starting at 1), writes
    /// the command sentence, and registers a fresh collector for the tag.
    /// Non-blocking apart from the write itself.
    pub fn send(
        &mut self,
        path: &[&[u8]],
        verb: &[u8],
        arguments: &[(&[u8], &[u8])],
        queries: &[(&[u8], &[u8])],
        additional_queries: &[Query],
    ) -> ApiResult<Tag> {
        self.next_tag += 1;
        let tag = Tag::new(self.next_tag);
        let command = Command::build(path, verb, arguments, queries, additional_queries, tag);
        self.transport.send_sentence(&command.words())?;
        debug!(%tag, command = %command, "sent command");
        self.buffer.insert(tag, ResponseCollector::new(command));
        Ok(tag)
    }

    /// Blocks until the request identified by `tag` completes, then returns
    /// its assembled result.
    ///
    /// While waiting, frames belonging to other in-flight tags are routed to
    /// their collectors and left for future `receive` calls. Fails with
    /// [`ApiError::UnknownTag`] when `tag` is not outstanding (including a
    /// second receive on an already-drained tag), [`ApiError::Communication`]
    /// when the device trapped the command, and [`ApiError::Fatal`] when the
    /// connection itself is no longer trustworthy.
    pub fn receive(&mut self, tag: Tag) -> ApiResult<ApiResponse> {
        loop {
            match self.buffer.get(&tag) {
                None => return Err(ApiError::UnknownTag(tag)),
                Some(collector) if collector.done => break,
                Some(_) => {}
            }
            let frame = self.receive_single_frame()?;
            self.dispatch(frame)?;
        }

        let collector = self
            .buffer
            .remove(&tag)
            .ok_or(ApiError::UnknownTag(tag))?;
        if let Some(payload) = collector.error {
            return Err(ApiError::Communication {
                payload,
                command: collector.command.to_string(),
            });
        }
        Ok(ApiResponse {
            replies: collector.replies,
            done_attributes: collector.done_attributes,
        })
    }

    /// Evicts the collector for an abandoned request.
    ///
    /// Returns whether a collector existed. Without this, an abandoned
    /// `receive` leaves its collector accumulating frames for the lifetime
    /// of the communicator.
    pub fn cancel(&mut self, tag: Tag) -> bool {
        let existed = self.buffer.remove(&tag).is_some();
        if existed {
            debug!(%tag, "cancelled in-flight request");
        }
        existed
    }

    /// Number of requests currently awaiting completion.
    pub fn in_flight(&self) -> usize {
        self.buffer.len()
    }

    /// Reads frames until a non-empty sentence arrives, then parses it.
    fn receive_single_frame(&mut self) -> ApiResult<ResponseSentence> {
        loop {
            let words = self.transport.receive_sentence()?;
            if !words.is_empty() {
                return Ok(ResponseSentence::parse(&words)?);
            }
        }
    }

    /// Routes one frame to its collector.
    fn dispatch(&mut self, frame: ResponseSentence) -> ApiResult<()> {
        let tag = frame.tag.ok_or(ProtocolError::MissingTag)?;
        trace!(%tag, kind = ?frame.kind, "dispatching frame");

        if frame.kind == ResponseType::Fatal {
            let collector = self
                .buffer
                .remove(&tag)
                .ok_or(ApiError::UnknownTag(tag))?;
            return Err(ApiError::Fatal {
                command: collector.command.to_string(),
            });
        }

        let collector = self
            .buffer
            .get_mut(&tag)
            .ok_or(ApiError::UnknownTag(tag))?;
        match frame.kind {
            ResponseType::Reply => collector.replies.push(frame.attributes),
            ResponseType::Done => {
                collector.done = true;
                collector.done_attributes = frame.attributes;
            }
            ResponseType::Trap => {
                // A !done frame still follows; only the error is recorded here.
                collector.error = Some(
                    frame
                        .attributes
                        .get(b"message".as_slice())
                        .cloned()
                        .unwrap_or_default(),
                );
            }
            // Handled by the early return.
            ResponseType::Fatal => {}
        }
        Ok(())
    }
}
