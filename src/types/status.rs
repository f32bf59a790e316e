//! STATUS attributes.

use std::num::NonZeroU32;

/// A STATUS attribute name.
///
/// `status-att` of RFC 3501 plus `HIGHESTMODSEQ` (RFC 7162) and
/// `DELETED`/`SIZE` (RFC 9051/8438).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusDataItemName {
    Messages,
    Recent,
    UidNext,
    UidValidity,
    Unseen,
    Deleted,
    Size,
    HighestModSeq,
}

/// A STATUS attribute with its value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusDataItem {
    Messages(u32),
    Recent(u32),
    UidNext(NonZeroU32),
    UidValidity(NonZeroU32),
    Unseen(u32),
    Deleted(u32),
    Size(u64),
    HighestModSeq(u64),
}
