//! Mailbox parsers and the mailbox-related untagged responses.

use std::str::from_utf8;

use abnf_core::streaming::{dquote, sp};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_while1},
    combinator::{map, value},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{astring, nil, number, nz_number, quoted_char, string},
        flag::mbx_list_flags,
        status::status_att_list,
    },
    types::{
        core::QuotedChar,
        indicators::is_list_char,
        mailbox::{ListCharString, ListMailbox, Mailbox},
        response::Data,
    },
};

/// `list-mailbox = 1*list-char / string`
pub(crate) fn list_mailbox(input: &[u8]) -> ImapResult<'_, ListMailbox> {
    alt((
        map(take_while1(is_list_char), |bytes: &[u8]| {
            // `is_list_char` proves the bytes are ASCII.
            ListMailbox::Token(ListCharString::unvalidated(from_utf8(bytes).unwrap()))
        }),
        map(string, ListMailbox::String),
    ))(input)
}

/// `mailbox = "INBOX" / astring`
///
/// INBOX is case-insensitive; all case variants match.
pub(crate) fn mailbox(input: &[u8]) -> ImapResult<'_, Mailbox> {
    map(astring, Mailbox::from)(input)
}

/// The RFC 3501 subset of `mailbox-data`:
///
/// ```abnf
/// mailbox-data = "FLAGS" SP flag-list /
///                "LIST" SP mailbox-list /
///                "LSUB" SP mailbox-list /
///                "SEARCH" *(SP nz-number) /
///                "STATUS" SP mailbox SP "(" [status-att-list] ")" /
///                number SP "EXISTS" /
///                number SP "RECENT"
/// ```
///
/// The extended SEARCH (`ESEARCH`) and the extension responses (QUOTA,
/// METADATA, NAMESPACE, ...) are dispatched separately by the response
/// parser.
pub(crate) fn mailbox_data(input: &[u8]) -> ImapResult<'_, Data> {
    alt((
        map(
            preceded(tag_no_case(b"FLAGS "), crate::parse::flag::flag_list),
            Data::Flags,
        ),
        map(
            preceded(tag_no_case(b"LIST "), mailbox_list),
            |(items, delimiter, mailbox)| Data::List {
                items,
                delimiter,
                mailbox,
            },
        ),
        map(
            preceded(tag_no_case(b"LSUB "), mailbox_list),
            |(items, delimiter, mailbox)| Data::Lsub {
                items,
                delimiter,
                mailbox,
            },
        ),
        map(
            preceded(
                tag_no_case(b"SEARCH"),
                nom::multi::many0(preceded(sp, nz_number)),
            ),
            Data::Search,
        ),
        map(
            tuple((
                tag_no_case(b"STATUS "),
                mailbox,
                delimited(tag(b" ("), status_att_list, tag(b")")),
            )),
            |(_, mailbox, items)| Data::Status { mailbox, items },
        ),
        map(
            tuple((number, sp, tag_no_case(b"EXISTS"))),
            |(count, _, _)| Data::Exists(count),
        ),
        map(
            tuple((number, sp, tag_no_case(b"RECENT"))),
            |(count, _, _)| Data::Recent(count),
        ),
    ))(input)
}

/// `mailbox-list = "(" [mbx-list-flags] ")" SP
///                 (DQUOTE QUOTED-CHAR DQUOTE / nil) SP mailbox`
#[allow(clippy::type_complexity)]
pub(crate) fn mailbox_list(
    input: &[u8],
) -> ImapResult<'_, (Vec<crate::types::flag::FlagNameAttribute>, Option<QuotedChar>, Mailbox)> {
    let mut parser = tuple((
        delimited(tag(b"("), mbx_list_flags, tag(b")")),
        sp,
        alt((
            map(delimited(dquote, quoted_char, dquote), Some),
            value(None, nil),
        )),
        sp,
        mailbox,
    ));

    let (remaining, (items, _, delimiter, _, mailbox)) = parser(input)?;

    Ok((remaining, (items, delimiter, mailbox)))
}
