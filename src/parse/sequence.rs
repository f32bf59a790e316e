//! Sequence-set parsers.

use nom::{
    branch::alt,
    bytes::streaming::tag,
    combinator::{map, value},
    multi::separated_list1,
    sequence::tuple,
};

use crate::{
    parse::{ImapResult, core::nz_number},
    types::{
        core::Vec1,
        sequence::{SeqOrUid, Sequence, SequenceSet},
    },
};

/// `sequence-set = (seq-number / seq-range) *("," (seq-number / seq-range))`
///
/// Extended with `"$"` (the saved result of RFC 5182).
pub(crate) fn sequence_set(input: &[u8]) -> ImapResult<'_, SequenceSet> {
    alt((
        value(SequenceSet::SavedResult, tag(b"$")),
        map(
            separated_list1(
                tag(b","),
                alt((
                    // Ordering is important: `1:2` must not parse as `1`.
                    map(seq_range, |(from, to)| Sequence::Range(from, to)),
                    map(seq_number, Sequence::Single),
                )),
            ),
            |set| SequenceSet::Sequences(Vec1::unvalidated(set)),
        ),
    ))(input)
}

/// `seq-range = seq-number ":" seq-number`
///
/// Two seq-number values and all values between, regardless of order:
/// `2:4` and `4:2` are equivalent.
pub(crate) fn seq_range(input: &[u8]) -> ImapResult<'_, (SeqOrUid, SeqOrUid)> {
    let mut parser = tuple((seq_number, tag(b":"), seq_number));

    let (remaining, (from, _, to)) = parser(input)?;

    Ok((remaining, (from, to)))
}

/// `seq-number = nz-number / "*"`
///
/// "*" represents the largest number in use.
pub(crate) fn seq_number(input: &[u8]) -> ImapResult<'_, SeqOrUid> {
    alt((
        map(nz_number, SeqOrUid::Value),
        value(SeqOrUid::Asterisk, tag(b"*")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence_set() {
        let (rem, val) = sequence_set(b"1:*?").unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(
            val,
            SequenceSet::Sequences(Vec1::from(Sequence::Range(
                SeqOrUid::Value(1.try_into().unwrap()),
                SeqOrUid::Asterisk
            )))
        );

        let (rem, val) = sequence_set(b"1:*,5?").unwrap();
        assert_eq!(rem, b"?");
        assert!(matches!(val, SequenceSet::Sequences(s) if s.len() == 2));
    }

    #[test]
    fn test_parse_saved_result() {
        let (rem, val) = sequence_set(b"$ ").unwrap();
        assert_eq!(rem, b" ");
        assert_eq!(val, SequenceSet::SavedResult);
    }

    #[test]
    fn test_parse_seq_number() {
        // Must not be 0.
        assert!(seq_number(b"0?").is_err());
        assert!(seq_number(b"1?").is_ok());
        assert!(seq_number(b"*?").is_ok());
    }

    #[test]
    fn test_parse_seq_range() {
        // Must not be 0.
        assert!(seq_range(b"0:1?").is_err());

        assert_eq!(
            (
                SeqOrUid::Value(1.try_into().unwrap()),
                SeqOrUid::Value(2.try_into().unwrap())
            ),
            seq_range(b"1:2?").unwrap().1
        );
        assert_eq!(
            (SeqOrUid::Asterisk, SeqOrUid::Value(10.try_into().unwrap())),
            seq_range(b"*:10?").unwrap().1
        );
    }
}
