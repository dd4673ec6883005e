//! # Command and Response Sentences
//!
//! Purpose: Build outbound command sentences and parse inbound response
//! sentences into typed frames.
//!
//! ## Design Principles
//! 1. **Pure Construction**: Building a command performs no validation and
//!    no IO; malformed paths or verbs pass through to the device.
//! 2. **Typed Replies**: The reply word maps onto a closed enum so dispatch
//!    can match exhaustively.
//! 3. **Diagnostics-Friendly**: Commands render losslessly enough for error
//!    messages without assuming UTF-8 payloads.

use std::fmt;

use crate::error::{ProtocolError, ProtocolResult};
use crate::query::Query;
use crate::types::{Attributes, Tag};

/// An immutable outbound command: path, verb, arguments, filters, and the
/// correlation tag assigned at send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    path: Vec<Vec<u8>>,
    verb: Vec<u8>,
    arguments: Vec<(Vec<u8>, Vec<u8>)>,
    queries: Vec<Query>,
    tag: Tag,
}

impl Command {
    /// Builds a command from its parts.
    ///
    /// `arguments` become `=key=value` words in the given order. Each
    /// `queries` entry becomes an equality filter, and `additional_queries`
    /// are appended after them verbatim.
    pub fn build(
        path: &[&[u8]],
        verb: &[u8],
        arguments: &[(&[u8], &[u8])],
        queries: &[(&[u8], &[u8])],
        additional_queries: &[Query],
        tag: Tag,
    ) -> Self {
        let mut filters: Vec<Query> = queries
            .iter()
            .map(|(key, value)| Query::equal(*key, *value))
            .collect();
        filters.extend_from_slice(additional_queries);

        Command {
            path: path.iter().map(|segment| segment.to_vec()).collect(),
            verb: verb.to_vec(),
            arguments: arguments
                .iter()
                .map(|(key, value)| (key.to_vec(), value.to_vec()))
                .collect(),
            queries: filters,
            tag,
        }
    }

    /// Returns the correlation tag assigned to this command.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Renders the command as its wire-format word sequence.
    pub fn words(&self) -> Vec<Vec<u8>> {
        let mut command_word = Vec::new();
        for segment in &self.path {
            command_word.push(b'/');
            command_word.extend_from_slice(segment);
        }
        command_word.push(b'/');
        command_word.extend_from_slice(&self.verb);

        let mut words = Vec::with_capacity(2 + self.arguments.len() + self.queries.len());
        words.push(command_word);
        for (key, value) in &self.arguments {
            let mut word = Vec::with_capacity(key.len() + value.len() + 2);
            word.push(b'=');
            word.extend_from_slice(key);
            word.push(b'=');
            word.extend_from_slice(value);
            words.push(word);
        }
        for query in &self.queries {
            words.push(query.word());
        }
        words.push(self.tag.to_word());
        words
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, word) in self.words().iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", String::from_utf8_lossy(word))?;
        }
        Ok(())
    }
}

/// Reply word discriminant of a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// `!re` - one streamed result fragment.
    Reply,
    /// `!done` - terminal success signal, possibly with final attributes.
    Done,
    /// `!trap` - mid-stream error; a `!done` still follows.
    Trap,
    /// `!fatal` - connection-ending error.
    Fatal,
}

/// One parsed inbound frame: reply type, correlation tag, and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSentence {
    /// Frame type from the leading reply word.
    pub kind: ResponseType,
    /// Correlation tag, when the frame carried a `.tag=` word.
    pub tag: Option<Tag>,
    /// Attribute map from the `=key=value` words.
    pub attributes: Attributes,
}

impl ResponseSentence {
    /// Parses a response sentence from its word sequence.
    ///
    /// The first word must be a reply word. `=key=value` words populate the
    /// attribute map (a missing value is empty), `.tag=` carries the tag,
    /// and a bare word (as `!fatal` reasons arrive) is stored under the
    /// `message` key.
    pub fn parse(words: &[Vec<u8>]) -> ProtocolResult<Self> {
        let Some(reply_word) = words.first() else {
            return Err(ProtocolError::MissingReplyWord);
        };
        let kind = match reply_word.as_slice() {
            b"!re" => ResponseType::Reply,
            b"!done" => ResponseType::Done,
            b"!trap" => ResponseType::Trap,
            b"!fatal" => ResponseType::Fatal,
            other => {
                return Err(ProtocolError::UnknownReplyWord(
                    String::from_utf8_lossy(other).into_owned(),
                ))
            }
        };

        let mut tag = None;
        let mut attributes = Attributes::new();
        for word in &words[1..] {
            if let Some(rest) = word.strip_prefix(b".tag=") {
                tag = Some(parse_tag(rest)?);
            } else if let Some(rest) = word.strip_prefix(b"=") {
                let (key, value) = split_attribute(rest);
                attributes.insert(key, value);
            } else {
                // Bare words carry the human-readable reason on !fatal.
                attributes.insert(b"message".to_vec(), word.clone());
            }
        }

        Ok(ResponseSentence {
            kind,
            tag,
            attributes,
        })
    }
}

fn parse_tag(data: &[u8]) -> ProtocolResult<Tag> {
    let text = std::str::from_utf8(data)
        .map_err(|_| ProtocolError::MalformedTag(String::from_utf8_lossy(data).into_owned()))?;
    let value: u64 = text
        .parse()
        .map_err(|_| ProtocolError::MalformedTag(text.to_string()))?;
    Ok(Tag::new(value))
}

fn split_attribute(data: &[u8]) -> (Vec<u8>, Vec<u8>) {
    match data.iter().position(|&b| b == b'=') {
        Some(idx) => (data[..idx].to_vec(), data[idx + 1..].to_vec()),
        None => (data.to_vec(), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_words() {
        let command = Command::build(
            &[b"interface", b"wireless"],
            b"print",
            &[(b"name", b"wlan1")],
            &[(b"disabled", b"false")],
            &[Query::present("comment")],
            Tag::new(3),
        );
        assert_eq!(
            command.words(),
            vec![
                b"/interface/wireless/print".to_vec(),
                b"=name=wlan1".to_vec(),
                b"?disabled=false".to_vec(),
                b"?comment".to_vec(),
                b".tag=3".to_vec(),
            ]
        );
    }

    #[test]
    fn test_command_display_is_lossy_words() {
        let command = Command::build(&[b"system"], b"reboot", &[], &[], &[], Tag::new(1));
        assert_eq!(command.to_string(), "/system/reboot .tag=1");
    }

    #[test]
    fn test_parse_reply_frame() {
        let frame = ResponseSentence::parse(&[
            b"!re".to_vec(),
            b"=name=ether1".to_vec(),
            b"=mtu=1500".to_vec(),
            b".tag=7".to_vec(),
        ])
        .unwrap();
        assert_eq!(frame.kind, ResponseType::Reply);
        assert_eq!(frame.tag, Some(Tag::new(7)));
        assert_eq!(frame.attributes[b"name".as_slice()], b"ether1");
        assert_eq!(frame.attributes[b"mtu".as_slice()], b"1500");
    }

    #[test]
    fn test_parse_done_without_attributes() {
        let frame = ResponseSentence::parse(&[b"!done".to_vec(), b".tag=1".to_vec()]).unwrap();
        assert_eq!(frame.kind, ResponseType::Done);
        assert!(frame.attributes.is_empty());
    }

    #[test]
    fn test_parse_trap_message() {
        let frame = ResponseSentence::parse(&[
            b"!trap".to_vec(),
            b"=message=no such item".to_vec(),
            b".tag=5".to_vec(),
        ])
        .unwrap();
        assert_eq!(frame.kind, ResponseType::Trap);
        assert_eq!(frame.attributes[b"message".as_slice()], b"no such item");
    }

    #[test]
    fn test_parse_fatal_bare_reason() {
        let frame =
            ResponseSentence::parse(&[b"!fatal".to_vec(), b"session closed".to_vec()]).unwrap();
        assert_eq!(frame.kind, ResponseType::Fatal);
        assert_eq!(frame.attributes[b"message".as_slice()], b"session closed");
    }

    #[test]
    fn test_parse_attribute_with_empty_value() {
        let frame =
            ResponseSentence::parse(&[b"!re".to_vec(), b"=comment=".to_vec()]).unwrap();
        assert_eq!(frame.attributes[b"comment".as_slice()], b"");
    }

    #[test]
    fn test_parse_attribute_value_containing_equals() {
        let frame =
            ResponseSentence::parse(&[b"!re".to_vec(), b"=note=a=b".to_vec()]).unwrap();
        assert_eq!(frame.attributes[b"note".as_slice()], b"a=b");
    }

    #[test]
    fn test_unknown_reply_word() {
        let err = ResponseSentence::parse(&[b"!wat".to_vec()]).unwrap_err();
        assert_eq!(err, ProtocolError::UnknownReplyWord("!wat".to_string()));
    }

    #[test]
    fn test_empty_sentence_is_missing_reply_word() {
        assert_eq!(
            ResponseSentence::parse(&[]).unwrap_err(),
            ProtocolError::MissingReplyWord
        );
    }

    #[test]
    fn test_malformed_tag() {
        let err =
            ResponseSentence::parse(&[b"!done".to_vec(), b".tag=abc".to_vec()]).unwrap_err();
        assert_eq!(err, ProtocolError::MalformedTag("abc".to_string()));
    }
}
