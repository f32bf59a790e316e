//! Search keys and ESEARCH return options.

use std::num::NonZeroU32;

use crate::types::{
    core::{AString, Atom, Vec1},
    datetime::NaiveDate,
    sequence::SequenceSet,
};

/// A search criterion.
///
/// The grammar is recursive: `NOT`, `OR` and parenthesised groups nest. A
/// parenthesised group with several children is an implicit [`SearchKey::And`];
/// a group with a single child is flattened away during parsing.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SearchKey {
    /// A parenthesised conjunction.
    And(Vec1<SearchKey>),
    SequenceSet(SequenceSet),
    All,
    Answered,
    Bcc(AString),
    Before(NaiveDate),
    Body(AString),
    Cc(AString),
    Deleted,
    Draft,
    Flagged,
    From(AString),
    Header(AString, AString),
    Keyword(Atom),
    Larger(u32),
    New,
    Not(Box<SearchKey>),
    Old,
    On(NaiveDate),
    Or(Box<SearchKey>, Box<SearchKey>),
    Recent,
    Seen,
    SentBefore(NaiveDate),
    SentOn(NaiveDate),
    SentSince(NaiveDate),
    Since(NaiveDate),
    Smaller(u32),
    Subject(AString),
    Text(AString),
    To(AString),
    Uid(SequenceSet),
    Unanswered,
    Undeleted,
    Undraft,
    Unflagged,
    Unkeyword(Atom),
    Unseen,
    /// `MODSEQ <n>` (RFC 7162).
    ModSeq(u64),
    /// `X-GM-RAW <string>` (Gmail).
    GmailRaw(AString),
}

impl SearchKey {
    /// Whether the key graph contains a key carrying a string argument.
    ///
    /// `CHARSET` is only meaningful when such a key exists; the encoder uses
    /// this to elide it otherwise.
    pub(crate) fn contains_string(&self) -> bool {
        match self {
            Self::Bcc(_)
            | Self::Body(_)
            | Self::Cc(_)
            | Self::From(_)
            | Self::Header(_, _)
            | Self::Subject(_)
            | Self::Text(_)
            | Self::To(_)
            | Self::GmailRaw(_) => true,
            Self::And(keys) => keys.iter().any(Self::contains_string),
            Self::Not(key) => key.contains_string(),
            Self::Or(left, right) => left.contains_string() || right.contains_string(),
            _ => false,
        }
    }
}

/// A `RETURN` option of an extended SEARCH command (RFC 4731 / RFC 5182).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SearchReturnOption {
    Min,
    Max,
    All,
    Count,
    /// `SAVE` (RFC 5182): remember the result for `$`.
    Save,
}

/// A data item of an `ESEARCH` response (RFC 4731).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SearchReturnData {
    Min(NonZeroU32),
    Max(NonZeroU32),
    All(SequenceSet),
    Count(u32),
    /// `MODSEQ` of an ESEARCH response (RFC 7162).
    ModSeq(u64),
}
