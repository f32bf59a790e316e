//! METADATA types (RFC 5464).

use crate::types::core::{AString, NString, Vec1};

/// A metadata entry name, e.g. `/shared/comment`.
pub type EntryName = AString;

/// An entry with its (possibly `NIL`) value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EntryValue {
    pub entry: EntryName,
    pub value: NString,
}

/// An option of a GETMETADATA command.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GetMetadataOption {
    /// `MAXSIZE <n>`
    MaxSize(u32),
    /// `DEPTH 0 / 1 / infinity`
    Depth(MetadataDepth),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MetadataDepth {
    Zero,
    One,
    Infinity,
}

/// The payload of an untagged METADATA response: either entry/value pairs
/// (answering GETMETADATA) or a plain entry list (unsolicited change note).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MetadataResponse {
    WithValues(Vec1<EntryValue>),
    WithoutValues(Vec1<EntryName>),
}

/// The detail of a `METADATA` response code.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum MetadataCode {
    /// `LONGENTRIES <n>`
    LongEntries(u32),
    /// `MAXSIZE <n>`
    MaxSize(u32),
    TooMany,
    NoPrivate,
}
