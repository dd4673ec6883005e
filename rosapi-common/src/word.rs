//! # Word Framing
//!
//! Purpose: Encode and decode the length-prefixed words that make up wire
//! sentences, without copying more than the payload bytes.
//!
//! ## Design Principles
//! 1. **Incremental Parsing**: `SentenceParser` consumes nothing until a
//!    complete sentence is buffered, so short reads never corrupt state.
//! 2. **Buffer Reuse**: Encoding appends to a caller-supplied `BytesMut`.
//! 3. **Binary-Safe**: Word payloads are raw bytes.
//! 4. **Fail Fast**: Reserved control bytes surface as protocol errors
//!    immediately.
//!
//! ## Wire Layout
//!
//! ```text
//! word     := length payload
//! sentence := word* empty-word
//!
//! length encoding (big-endian):
//! < 0x80        -> 1 byte
//! < 0x4000      -> 2 bytes, OR 0x8000
//! < 0x200000    -> 3 bytes, OR 0xC00000
//! < 0x10000000  -> 4 bytes, OR 0xE0000000
//! otherwise     -> 0xF0 marker + 4 length bytes
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};

/// Encodes a word length prefix into the buffer.
pub fn encode_length(len: usize, out: &mut BytesMut) {
    if len < 0x80 {
        out.put_u8(len as u8);
    } else if len < 0x4000 {
        out.put_u16(len as u16 | 0x8000);
    } else if len < 0x20_0000 {
        out.put_u8(((len >> 16) as u8) | 0xC0);
        out.put_u16(len as u16);
    } else if len < 0x1000_0000 {
        out.put_u32(len as u32 | 0xE000_0000);
    } else {
        debug_assert!(len <= u32::MAX as usize, "word length exceeds the wire limit");
        out.put_u8(0xF0);
        out.put_u32(len as u32);
    }
}

/// Encodes one word (length prefix plus payload) into the buffer.
pub fn encode_word(word: &[u8], out: &mut BytesMut) {
    encode_length(word.len(), out);
    out.put_slice(word);
}

/// Encodes a full sentence: every word followed by the empty terminator word.
pub fn encode_sentence(words: &[Vec<u8>], out: &mut BytesMut) {
    for word in words {
        encode_word(word, out);
    }
    encode_length(0, out);
}

/// Decodes a length prefix from the start of `data`.
///
/// Returns `Ok(None)` when more bytes are needed, otherwise the decoded
/// length and the number of prefix bytes consumed.
fn decode_length(data: &[u8]) -> ProtocolResult<Option<(usize, usize)>> {
    let Some(&first) = data.first() else {
        return Ok(None);
    };

    let (header, needed) = match first {
        0x00..=0x7F => return Ok(Some((first as usize, 1))),
        0x80..=0xBF => ((first & 0x3F) as usize, 2),
        0xC0..=0xDF => ((first & 0x1F) as usize, 3),
        0xE0..=0xEF => ((first & 0x0F) as usize, 4),
        0xF0 => (0, 5),
        _ => return Err(ProtocolError::ReservedLength(first)),
    };

    if data.len() < needed {
        return Ok(None);
    }

    let mut len = header;
    for &byte in &data[1..needed] {
        len = (len << 8) | byte as usize;
    }
    Ok(Some((len, needed)))
}

/// Incremental sentence parser over a growable byte buffer.
///
/// Feed bytes into a `BytesMut` and call [`SentenceParser::parse`] after each
/// read; the buffer is only advanced once a whole sentence is present.
#[derive(Debug, Default)]
pub struct SentenceParser;

impl SentenceParser {
    /// Creates a parser.
    pub fn new() -> Self {
        SentenceParser
    }

    /// Attempts to extract one complete sentence from the buffer.
    ///
    /// Returns `Ok(None)` when the buffer holds only a partial sentence. An
    /// empty word list is a valid sentence (the "no frame yet" signal).
    pub fn parse(&mut self, buf: &mut BytesMut) -> ProtocolResult<Option<Vec<Vec<u8>>>> {
        let mut pos = 0;
        let mut words = Vec::new();

        loop {
            let Some((len, header)) = decode_length(&buf[pos..])? else {
                return Ok(None);
            };
            if buf.len() < pos + header + len {
                return Ok(None);
            }
            if len == 0 {
                buf.advance(pos + header);
                return Ok(Some(words));
            }
            words.push(buf[pos + header..pos + header + len].to_vec());
            pos += header + len;
        }
    }
}
