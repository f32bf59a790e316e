//! Fetch attributes and fetched message data items.

use std::num::NonZeroU32;

use crate::types::{
    body::BodyStructure,
    core::{AString, Atom, NString},
    datetime::DateTime,
    envelope::Envelope,
    flag::FlagFetch,
    section::Section,
};

/// A shorthand for a fixed set of fetch attributes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Macro {
    /// `(FLAGS INTERNALDATE RFC822.SIZE ENVELOPE)`
    All,
    /// `(FLAGS INTERNALDATE RFC822.SIZE)`
    Fast,
    /// `(FLAGS INTERNALDATE RFC822.SIZE ENVELOPE BODY)`
    Full,
}

impl Macro {
    pub fn expand(&self) -> Vec<MessageDataItemName> {
        use MessageDataItemName::*;

        match self {
            Self::All => vec![Flags, InternalDate, Rfc822Size, Envelope],
            Self::Fast => vec![Flags, InternalDate, Rfc822Size],
            Self::Full => vec![Flags, InternalDate, Rfc822Size, Envelope, Body],
        }
    }
}

/// Either a macro or a list of fetch attributes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MacroOrMessageDataItemNames {
    Macro(Macro),
    MessageDataItemNames(Vec<MessageDataItemName>),
}

impl From<Macro> for MacroOrMessageDataItemNames {
    fn from(value: Macro) -> Self {
        Self::Macro(value)
    }
}

impl From<Vec<MessageDataItemName>> for MacroOrMessageDataItemNames {
    fn from(value: Vec<MessageDataItemName>) -> Self {
        Self::MessageDataItemNames(value)
    }
}

/// A fetch attribute as requested by a client.
///
/// `fetch-att`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MessageDataItemName {
    Body,
    /// `BODY[<section>]<<partial>>` or `BODY.PEEK[...]`.
    BodyExt {
        section: Option<Section>,
        partial: Option<(u32, NonZeroU32)>,
        peek: bool,
    },
    BodyStructure,
    /// `BINARY[...]` (RFC 3516).
    Binary {
        section: Vec<NonZeroU32>,
        partial: Option<(u32, NonZeroU32)>,
        peek: bool,
    },
    /// `BINARY.SIZE[...]` (RFC 3516).
    BinarySize { section: Vec<NonZeroU32> },
    Envelope,
    Flags,
    InternalDate,
    Rfc822,
    Rfc822Header,
    Rfc822Size,
    Rfc822Text,
    Uid,
    /// `MODSEQ` (RFC 7162).
    ModSeq,
    /// `X-GM-MSGID` (Gmail).
    GmailMessageId,
    /// `X-GM-THRID` (Gmail).
    GmailThreadId,
    /// `X-GM-LABELS` (Gmail).
    GmailLabels,
}

/// A fetched, non-streamed message data item.
///
/// Streamed items (`BODY[...]`, `RFC822*`, `BINARY[...]` carrying data) are
/// delivered as a [`crate::stream::FetchEvent`] sub-stream instead; they only
/// appear here when their value is `NIL`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MessageDataItem {
    Body(BodyStructure),
    /// `BODY[<section>]<<origin>>` with a `NIL` value.
    BodyExt {
        section: Option<Section>,
        origin: Option<u32>,
        data: NString,
    },
    BodyStructure(BodyStructure),
    /// `BINARY[...]` with a `NIL` value.
    Binary {
        section: Vec<NonZeroU32>,
        data: NString,
    },
    BinarySize {
        section: Vec<NonZeroU32>,
        size: u32,
    },
    Envelope(Envelope),
    Flags(Vec<FlagFetch>),
    InternalDate(DateTime),
    Rfc822(NString),
    Rfc822Header(NString),
    Rfc822Size(u32),
    Rfc822Text(NString),
    Uid(NonZeroU32),
    /// `MODSEQ (n)` (RFC 7162).
    ModSeq(u64),
    /// `X-GM-MSGID n` (Gmail).
    GmailMessageId(u64),
    /// `X-GM-THRID n` (Gmail).
    GmailThreadId(u64),
    /// `X-GM-LABELS (...)` (Gmail).
    GmailLabels(Vec<GmailLabel>),
}

/// A Gmail label: either a system label such as `\Inbox` or a user label.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum GmailLabel {
    System(Atom),
    User(AString),
}

/// Which streamed fetch attribute a
/// [`crate::stream::FetchEvent::StreamingBegin`] belongs to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum StreamingKind {
    /// `BODY[<section>]<<origin>>`
    BodyExt {
        section: Option<Section>,
        origin: Option<u32>,
    },
    Rfc822,
    Rfc822Header,
    Rfc822Text,
    /// `BINARY[...]` (RFC 3516).
    Binary { section: Vec<NonZeroU32> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_expansion() {
        assert_eq!(Macro::Fast.expand().len(), 3);
        assert_eq!(Macro::All.expand().len(), 4);
        assert_eq!(Macro::Full.expand().len(), 5);
    }
}
