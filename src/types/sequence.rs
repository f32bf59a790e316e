//! Message sequence numbers, UIDs, and sequence sets.

use std::{fmt, num::NonZeroU32};

use crate::types::core::{ValidationError, Vec1};

/// A message sequence number or UID, or the `*` wildcard.
///
/// "*" represents the largest number in use.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SeqOrUid {
    Value(NonZeroU32),
    Asterisk,
}

impl SeqOrUid {
    /// Resolves the wildcard against the largest number currently in use.
    pub fn expand(&self, largest: NonZeroU32) -> NonZeroU32 {
        match self {
            Self::Value(value) => *value,
            Self::Asterisk => largest,
        }
    }
}

impl TryFrom<u32> for SeqOrUid {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        NonZeroU32::new(value)
            .map(Self::Value)
            .ok_or(ValidationError::ByteNotAllowed {
                found: b'0',
                position: 0,
            })
    }
}

impl fmt::Display for SeqOrUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Value(value) => value.fmt(f),
            Self::Asterisk => f.write_str("*"),
        }
    }
}

/// A single number or a range.
///
/// A range is stored as written on the wire; `4:2` and `2:4` denote the same
/// messages, and iteration normalises the order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Sequence {
    Single(SeqOrUid),
    Range(SeqOrUid, SeqOrUid),
}

impl Sequence {
    /// Iterates the contained numbers with `*` resolved against `largest`,
    /// in ascending order regardless of how a range was written.
    pub fn iter(&self, largest: NonZeroU32) -> impl Iterator<Item = NonZeroU32> {
        let (from, to) = match self {
            Self::Single(value) => (value.expand(largest), value.expand(largest)),
            Self::Range(left, right) => {
                let left = left.expand(largest);
                let right = right.expand(largest);
                (left.min(right), left.max(right))
            }
        };

        (u32::from(from)..=u32::from(to)).map(|value| {
            // Range starts at a non-zero value.
            NonZeroU32::new(value).unwrap()
        })
    }

    /// `1:*`
    pub fn all() -> Self {
        Self::Range(
            SeqOrUid::Value(NonZeroU32::MIN),
            SeqOrUid::Asterisk,
        )
    }
}

/// A non-empty set of sequence numbers or UIDs, or the saved result `$` of
/// RFC 5182.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SequenceSet {
    Sequences(Vec1<Sequence>),
    /// `$` — the result of the last SEARCH with `RETURN (SAVE)`.
    SavedResult,
}

impl SequenceSet {
    /// Iterates the contained numbers; empty for the saved result, whose
    /// expansion only the server knows.
    pub fn iter(&self, largest: NonZeroU32) -> impl Iterator<Item = NonZeroU32> + '_ {
        let sequences: &[Sequence] = match self {
            Self::Sequences(sequences) => sequences.as_ref(),
            Self::SavedResult => &[],
        };

        sequences.iter().flat_map(move |s| s.iter(largest))
    }
}

impl TryFrom<u32> for SequenceSet {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Ok(Self::Sequences(Vec1::from(Sequence::Single(
            SeqOrUid::try_from(value)?,
        ))))
    }
}

impl From<Sequence> for SequenceSet {
    fn from(value: Sequence) -> Self {
        Self::Sequences(Vec1::from(value))
    }
}

impl TryFrom<Vec<Sequence>> for SequenceSet {
    type Error = ValidationError;

    fn try_from(value: Vec<Sequence>) -> Result<Self, Self::Error> {
        Ok(Self::Sequences(Vec1::try_from(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn test_zero_is_rejected() {
        assert!(SeqOrUid::try_from(0).is_err());
        assert!(SeqOrUid::try_from(u32::MAX).is_ok());
    }

    #[test]
    fn test_range_iteration_normalises_order() {
        let forward = Sequence::Range(SeqOrUid::Value(nz(2)), SeqOrUid::Value(nz(4)));
        let backward = Sequence::Range(SeqOrUid::Value(nz(4)), SeqOrUid::Value(nz(2)));

        let expected: Vec<_> = [2, 3, 4].into_iter().map(nz).collect();
        assert_eq!(forward.iter(nz(10)).collect::<Vec<_>>(), expected);
        assert_eq!(backward.iter(nz(10)).collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_asterisk_expansion() {
        let all = Sequence::all();
        assert_eq!(
            all.iter(nz(3)).collect::<Vec<_>>(),
            vec![nz(1), nz(2), nz(3)]
        );
    }

    #[test]
    fn test_saved_result_iterates_empty() {
        assert_eq!(SequenceSet::SavedResult.iter(nz(3)).count(), 0);
    }
}
