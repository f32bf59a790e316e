//! STATUS attribute parsers.

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::tag_no_case,
    combinator::{map, value},
    multi::separated_list0,
    sequence::tuple,
};

use crate::{
    parse::{
        ImapResult,
        core::{number, number64, nz_number},
    },
    types::status::{StatusDataItem, StatusDataItemName},
};

/// `status-att = "MESSAGES" / "RECENT" / "UIDNEXT" / "UIDVALIDITY" /
///               "UNSEEN" / "DELETED" / "SIZE" / "HIGHESTMODSEQ"`
pub(crate) fn status_att(input: &[u8]) -> ImapResult<'_, StatusDataItemName> {
    alt((
        value(StatusDataItemName::Messages, tag_no_case(b"MESSAGES")),
        value(StatusDataItemName::Recent, tag_no_case(b"RECENT")),
        value(StatusDataItemName::UidNext, tag_no_case(b"UIDNEXT")),
        value(StatusDataItemName::UidValidity, tag_no_case(b"UIDVALIDITY")),
        value(StatusDataItemName::Unseen, tag_no_case(b"UNSEEN")),
        value(StatusDataItemName::Deleted, tag_no_case(b"DELETED")),
        value(StatusDataItemName::Size, tag_no_case(b"SIZE")),
        value(
            StatusDataItemName::HighestModSeq,
            tag_no_case(b"HIGHESTMODSEQ"),
        ),
    ))(input)
}

/// `status-att-list = status-att-val *(SP status-att-val)`
///
/// An empty list is tolerated, mirroring servers that answer a STATUS with
/// no requested attributes.
pub(crate) fn status_att_list(input: &[u8]) -> ImapResult<'_, Vec<StatusDataItem>> {
    separated_list0(sp, status_att_val)(input)
}

/// `status-att-val`
fn status_att_val(input: &[u8]) -> ImapResult<'_, StatusDataItem> {
    alt((
        map(
            tuple((tag_no_case(b"MESSAGES"), sp, number)),
            |(_, _, num)| StatusDataItem::Messages(num),
        ),
        map(
            tuple((tag_no_case(b"RECENT"), sp, number)),
            |(_, _, num)| StatusDataItem::Recent(num),
        ),
        map(
            tuple((tag_no_case(b"UIDNEXT"), sp, nz_number)),
            |(_, _, num)| StatusDataItem::UidNext(num),
        ),
        map(
            tuple((tag_no_case(b"UIDVALIDITY"), sp, nz_number)),
            |(_, _, num)| StatusDataItem::UidValidity(num),
        ),
        map(
            tuple((tag_no_case(b"UNSEEN"), sp, number)),
            |(_, _, num)| StatusDataItem::Unseen(num),
        ),
        map(
            tuple((tag_no_case(b"DELETED"), sp, number)),
            |(_, _, num)| StatusDataItem::Deleted(num),
        ),
        map(
            tuple((tag_no_case(b"SIZE"), sp, number64)),
            |(_, _, num)| StatusDataItem::Size(num),
        ),
        map(
            tuple((tag_no_case(b"HIGHESTMODSEQ"), sp, number64)),
            |(_, _, num)| StatusDataItem::HighestModSeq(num),
        ),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_att() {
        let (rem, val) = status_att(b"MESSAGES ").unwrap();
        assert_eq!(rem, b" ");
        assert_eq!(val, StatusDataItemName::Messages);

        let (_, val) = status_att(b"highestmodseq ").unwrap();
        assert_eq!(val, StatusDataItemName::HighestModSeq);
    }

    #[test]
    fn test_status_att_list() {
        let (rem, val) = status_att_list(b"MESSAGES 231 UIDNEXT 44292)").unwrap();
        assert_eq!(rem, b")");
        assert_eq!(
            val,
            vec![
                StatusDataItem::Messages(231),
                StatusDataItem::UidNext(44292.try_into().unwrap()),
            ]
        );
    }

    #[test]
    fn test_status_att_list_with_modseq() {
        let (_, val) = status_att_list(b"HIGHESTMODSEQ 7011231777)").unwrap();
        assert_eq!(val, vec![StatusDataItem::HighestModSeq(7011231777)]);
    }
}
