//! Error surface of the streaming parsers.

use thiserror::Error;

/// A connection-fatal parsing failure.
///
/// Everything listed here means the byte stream can no longer be framed or
/// interpreted reliably; the caller must close the connection. Recoverable
/// conditions (an alternative production matching, or a truncated production
/// awaiting more bytes) never surface here.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParsingError {
    /// The buffer grew beyond the configured limit without containing a
    /// complete line. Literal payloads are exempt from this check.
    #[error("no line found within the configured limit of {limit} bytes")]
    LineTooLong { limit: usize },

    /// The framing pre-parser could not classify a frame, e.g. a literal
    /// length that overflows or contains a non-digit.
    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: &'static str },

    /// A recursive production exceeded the configured nesting limit.
    #[error("nesting exceeds the configured recursion limit")]
    TooDeep,

    /// The input is syntactically invalid and no alternative applies.
    #[error("malformed input: {0}")]
    Malformed(&'static str),
}
