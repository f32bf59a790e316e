//! Pull-style session parsers.
//!
//! The grammar alone is insufficient for three protocol modes: large message
//! ingress (`APPEND` literal streaming), `IDLE`, and `FETCH` body-section
//! streaming. [`CommandParser`] and [`ResponseParser`] layer a small state
//! machine over the grammar to handle them, consuming from a caller-owned
//! [`bytes::BytesMut`] and never buffering an entire large message.
//!
//! Both parsers are strictly sequential per connection and hold no shared
//! state; the only "suspension" is an `Ok(None)` return, after which the
//! caller appends more bytes and re-invokes.

use std::num::NonZeroU32;

use crate::types::{
    command::{AppendMessage, Command},
    core::Tag,
    fetch::{MessageDataItem, StreamingKind},
    mailbox::Mailbox,
    response::{Bye, ContinuationRequest, Data, Greeting, Tagged},
};

mod command;
mod response;

pub use command::{CommandParser, PartialCommandStream};
pub use response::ResponseParser;

/// One frame of the client→server command stream.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CommandStreamPart {
    /// A complete tagged command.
    Tagged(Command),
    /// The head of an APPEND; per-message events follow.
    AppendStart { tag: Tag, mailbox: Mailbox },
    /// The options and data announcement of one appended message.
    AppendBeginMessage(AppendMessage),
    /// A chunk of appended message octets.
    AppendMessageBytes {
        data: Vec<u8>,
        /// Whether this chunk completes the announced octet count.
        is_final: bool,
    },
    /// All octets of the current message arrived.
    AppendEndMessage,
    /// The APPEND command line ended.
    AppendFinish,
    /// `DONE` terminating an IDLE.
    IdleDone,
    /// One exchange line of an ongoing AUTHENTICATE: the raw line content
    /// without its newline (base64 data, or `*` to cancel).
    ContinuationResponse(Vec<u8>),
}

/// One frame of the server→client response stream.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ResponseOrContinuationRequest {
    ContinuationRequest(ContinuationRequest),
    Response(Response),
}

/// A server response.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Response {
    /// The first message of the connection.
    Greeting(Greeting),
    /// An untagged data response.
    Untagged(Data),
    /// A tagged status response.
    Tagged(Tagged),
    /// One event of a FETCH sub-stream.
    Fetch(FetchEvent),
    /// An untagged `BYE`; the server closes the connection.
    Fatal(Bye),
}

/// One event of a FETCH response sub-stream.
///
/// Events arrive in strict order:
/// `Start → (Simple | StreamingBegin StreamingBytes* StreamingEnd)* → Finish`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FetchEvent {
    /// `* <n> FETCH (` was seen.
    Start(NonZeroU32),
    /// A complete, non-streamed attribute.
    Simple(MessageDataItem),
    /// A streamed attribute announced `byte_count` octets.
    StreamingBegin {
        kind: StreamingKind,
        byte_count: u32,
    },
    /// A chunk of the streamed attribute's octets.
    StreamingBytes(Vec<u8>),
    /// The streamed attribute is complete.
    StreamingEnd,
    /// `)` closed the FETCH response.
    Finish,
}

/// How a grammar-level outcome maps onto the session layer.
pub(crate) enum Progress<T> {
    /// The production matched.
    Done(T),
    /// More bytes are required before a decision is possible.
    NeedMoreBytes,
    /// The production did not match; an alternative may be tried.
    NoMatch,
}

/// Classifies a nom outcome: incomplete input and pending literal octets both
/// mean "wait for more bytes"; recursion exhaustion and malformed values are
/// fatal for the connection.
pub(crate) fn classify<'a, T>(
    result: crate::parse::ImapResult<'a, T>,
) -> Result<Progress<(&'a [u8], T)>, crate::error::ParsingError> {
    use crate::{error::ParsingError, parse::ImapErrorKind};

    match result {
        Ok((remaining, value)) => Ok(Progress::Done((remaining, value))),
        Err(nom::Err::Incomplete(_)) => Ok(Progress::NeedMoreBytes),
        Err(nom::Err::Error(_)) => Ok(Progress::NoMatch),
        Err(nom::Err::Failure(error)) => match error.kind {
            ImapErrorKind::Literal { .. } => Ok(Progress::NeedMoreBytes),
            ImapErrorKind::RecursionLimitExceeded => Err(ParsingError::TooDeep),
            ImapErrorKind::LiteralContainsNull => {
                Err(ParsingError::Malformed("NUL inside a non-binary literal"))
            }
            ImapErrorKind::BadNumber => Err(ParsingError::Malformed("number out of range")),
            ImapErrorKind::BadDateTime => Err(ParsingError::Malformed("invalid date-time")),
            ImapErrorKind::BadBase64 | ImapErrorKind::Validation | ImapErrorKind::Nom(_) => {
                Err(ParsingError::Malformed("invalid syntax"))
            }
        },
    }
}

/// Index one past the next line terminator, if a complete one is buffered.
pub(crate) fn find_line_end(input: &[u8]) -> Option<usize> {
    for (at, byte) in input.iter().enumerate() {
        match byte {
            b'\n' => return Some(at + 1),
            b'\r' => match input.get(at + 1) {
                Some(b'\n') => return Some(at + 2),
                Some(_) => return Some(at + 1),
                None => return None,
            },
            _ => {}
        }
    }

    None
}

pub(crate) fn contains_line_end(input: &[u8]) -> bool {
    find_line_end(input).is_some()
}
