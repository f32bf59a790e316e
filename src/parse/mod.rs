//! Grammar parsers for the formal syntax of IMAP (RFC 3501 §9) and the
//! supported extensions.
//!
//! Every parser is a streaming nom function: a truncated production yields
//! `nom::Err::Incomplete`, a syntactic mismatch yields `nom::Err::Error`
//! (alternatives may be tried), and unrecoverable conditions (recursion
//! limit, literal octets not buffered yet, bad numbers/dates) yield
//! `nom::Err::Failure` with an [`ImapErrorKind`] describing the condition.

use std::num::{ParseIntError, TryFromIntError};

use nom::error::{ErrorKind, FromExternalError, ParseError};

use crate::types::core::{LiteralMode, ValidationError};

pub(crate) mod body;
pub(crate) mod command;
pub(crate) mod core;
pub(crate) mod datetime;
pub(crate) mod envelope;
pub(crate) mod extensions;
pub(crate) mod fetch;
pub(crate) mod flag;
pub(crate) mod mailbox;
pub(crate) mod response;
pub(crate) mod search;
pub(crate) mod section;
pub(crate) mod sequence;
pub(crate) mod status;

/// Recursion budget for the self-recursive productions (body structure,
/// search keys, catenate groups).
pub(crate) const DEFAULT_RECURSION_LIMIT: usize = 100;

/// An extended version of [`nom::IResult`].
pub(crate) type ImapResult<'a, O> = Result<(&'a [u8], O), nom::Err<ImapParseError<&'a [u8]>>>;

/// An extended version of [`nom::error::Error`].
#[derive(Debug)]
pub(crate) struct ImapParseError<I> {
    #[allow(unused)]
    pub input: I,
    pub kind: ImapErrorKind,
}

/// An extended version of [`nom::error::ErrorKind`].
#[derive(Debug)]
pub(crate) enum ImapErrorKind {
    /// The parser stopped at the beginning of literal octets that are not
    /// (fully) buffered yet.
    Literal {
        length: u32,
        mode: LiteralMode,
    },
    BadNumber,
    BadBase64,
    BadDateTime,
    LiteralContainsNull,
    RecursionLimitExceeded,
    Validation,
    Nom(ErrorKind),
}

impl<I> ParseError<I> for ImapParseError<I> {
    fn from_error_kind(input: I, kind: ErrorKind) -> Self {
        Self {
            input,
            kind: ImapErrorKind::Nom(kind),
        }
    }

    fn append(input: I, kind: ErrorKind, _: Self) -> Self {
        Self {
            input,
            kind: ImapErrorKind::Nom(kind),
        }
    }
}

impl<I> FromExternalError<I, ParseIntError> for ImapParseError<I> {
    fn from_external_error(input: I, _: ErrorKind, _: ParseIntError) -> Self {
        Self {
            input,
            kind: ImapErrorKind::BadNumber,
        }
    }
}

impl<I> FromExternalError<I, TryFromIntError> for ImapParseError<I> {
    fn from_external_error(input: I, _: ErrorKind, _: TryFromIntError) -> Self {
        Self {
            input,
            kind: ImapErrorKind::BadNumber,
        }
    }
}

impl<I> FromExternalError<I, base64::DecodeError> for ImapParseError<I> {
    fn from_external_error(input: I, _: ErrorKind, _: base64::DecodeError) -> Self {
        Self {
            input,
            kind: ImapErrorKind::BadBase64,
        }
    }
}

impl<I> FromExternalError<I, ValidationError> for ImapParseError<I> {
    fn from_external_error(input: I, _: ErrorKind, _: ValidationError) -> Self {
        Self {
            input,
            kind: ImapErrorKind::Validation,
        }
    }
}

/// End of line: CRLF, lone LF, or lone CR.
///
/// A CR at the end of input is reported as incomplete because the next byte
/// decides whether the line ended with CRLF or a bare CR.
pub(crate) fn newline(input: &[u8]) -> ImapResult<'_, ()> {
    match input.first() {
        None => Err(nom::Err::Incomplete(nom::Needed::new(1))),
        Some(b'\n') => Ok((&input[1..], ())),
        Some(b'\r') => match input.get(1) {
            None => Err(nom::Err::Incomplete(nom::Needed::new(1))),
            Some(b'\n') => Ok((&input[2..], ())),
            Some(_) => Ok((&input[1..], ())),
        },
        Some(_) => Err(nom::Err::Error(ImapParseError {
            input,
            kind: ImapErrorKind::Nom(ErrorKind::CrLf),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline() {
        assert_eq!(newline(b"\r\nx").unwrap().0, b"x");
        assert_eq!(newline(b"\nx").unwrap().0, b"x");
        assert_eq!(newline(b"\rx").unwrap().0, b"x");
        assert!(matches!(newline(b"\r"), Err(nom::Err::Incomplete(_))));
        assert!(matches!(newline(b""), Err(nom::Err::Incomplete(_))));
        assert!(matches!(newline(b"x"), Err(nom::Err::Error(_))));
    }
}
