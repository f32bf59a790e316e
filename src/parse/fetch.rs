//! Fetch attribute parsers.
//!
//! The streamed attributes (`BODY[...]`, `RFC822*`, `BINARY[...]` carrying
//! data) are split into a header parser ([`streamed_att_start`]) and the byte
//! streaming done by the response session parser; everything else is parsed
//! as a complete [`MessageDataItem`].

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{
        DEFAULT_RECURSION_LIMIT, ImapResult,
        core::{astring, atom, literal_header, number, number64, nz_number, quoted},
        datetime::date_time,
        envelope::envelope,
        flag::flag_fetch,
        newline,
        section::{partial, section, section_binary},
    },
    types::{
        core::LiteralMode,
        fetch::{
            GmailLabel, Macro, MacroOrMessageDataItemNames, MessageDataItem,
            MessageDataItemName, StreamingKind,
        },
    },
};

/// ```abnf
/// fetch-att = "ENVELOPE" /
///             "FLAGS" /
///             "INTERNALDATE" /
///             "RFC822" [".HEADER" / ".SIZE" / ".TEXT"] /
///             "BODY" ["STRUCTURE"] /
///             "UID" /
///             "BODY"      section ["<" number "." nz-number ">"] /
///             "BODY.PEEK" section ["<" number "." nz-number ">"] /
///             "BINARY"      section-binary [partial] / ; RFC 3516
///             "BINARY.PEEK" section-binary [partial] / ; RFC 3516
///             "BINARY.SIZE" section-binary /           ; RFC 3516
///             "MODSEQ" /                               ; RFC 7162
///             "X-GM-MSGID" / "X-GM-THRID" / "X-GM-LABELS"
/// ```
pub(crate) fn fetch_att(input: &[u8]) -> ImapResult<'_, MessageDataItemName> {
    alt((
        value(MessageDataItemName::Envelope, tag_no_case(b"ENVELOPE")),
        value(MessageDataItemName::Flags, tag_no_case(b"FLAGS")),
        value(
            MessageDataItemName::InternalDate,
            tag_no_case(b"INTERNALDATE"),
        ),
        value(
            MessageDataItemName::BodyStructure,
            tag_no_case(b"BODYSTRUCTURE"),
        ),
        map(
            tuple((tag_no_case(b"BODY.PEEK"), section, opt(partial))),
            |(_, section, partial)| MessageDataItemName::BodyExt {
                section,
                partial,
                peek: true,
            },
        ),
        map(
            tuple((tag_no_case(b"BODY"), section, opt(partial))),
            |(_, section, partial)| MessageDataItemName::BodyExt {
                section,
                partial,
                peek: false,
            },
        ),
        map(
            tuple((tag_no_case(b"BINARY.PEEK"), section_binary, opt(partial))),
            |(_, section, partial)| MessageDataItemName::Binary {
                section,
                partial,
                peek: true,
            },
        ),
        map(
            preceded(tag_no_case(b"BINARY.SIZE"), section_binary),
            |section| MessageDataItemName::BinarySize { section },
        ),
        map(
            tuple((tag_no_case(b"BINARY"), section_binary, opt(partial))),
            |(_, section, partial)| MessageDataItemName::Binary {
                section,
                partial,
                peek: false,
            },
        ),
        value(MessageDataItemName::Body, tag_no_case(b"BODY")),
        value(MessageDataItemName::Uid, tag_no_case(b"UID")),
        value(
            MessageDataItemName::Rfc822Header,
            tag_no_case(b"RFC822.HEADER"),
        ),
        value(MessageDataItemName::Rfc822Size, tag_no_case(b"RFC822.SIZE")),
        value(MessageDataItemName::Rfc822Text, tag_no_case(b"RFC822.TEXT")),
        value(MessageDataItemName::Rfc822, tag_no_case(b"RFC822")),
        value(MessageDataItemName::ModSeq, tag_no_case(b"MODSEQ")),
        value(
            MessageDataItemName::GmailMessageId,
            tag_no_case(b"X-GM-MSGID"),
        ),
        value(
            MessageDataItemName::GmailThreadId,
            tag_no_case(b"X-GM-THRID"),
        ),
        value(
            MessageDataItemName::GmailLabels,
            tag_no_case(b"X-GM-LABELS"),
        ),
    ))(input)
}

/// `"ALL" / "FULL" / "FAST" / fetch-att / "(" fetch-att *(SP fetch-att) ")"`
pub(crate) fn fetch_atts(input: &[u8]) -> ImapResult<'_, MacroOrMessageDataItemNames> {
    alt((
        value(
            MacroOrMessageDataItemNames::Macro(Macro::All),
            tag_no_case(b"ALL"),
        ),
        value(
            MacroOrMessageDataItemNames::Macro(Macro::Fast),
            tag_no_case(b"FAST"),
        ),
        value(
            MacroOrMessageDataItemNames::Macro(Macro::Full),
            tag_no_case(b"FULL"),
        ),
        map(fetch_att, |item| {
            MacroOrMessageDataItemNames::MessageDataItemNames(vec![item])
        }),
        map(
            delimited(tag(b"("), separated_list1(sp, fetch_att), tag(b")")),
            MacroOrMessageDataItemNames::MessageDataItemNames,
        ),
    ))(input)
}

/// A fetched attribute that is never streamed.
///
/// `msg-att-dynamic / msg-att-static` without the data-carrying `BODY[...]`,
/// `RFC822*` and `BINARY[...]` forms.
pub(crate) fn msg_att_simple(input: &[u8]) -> ImapResult<'_, MessageDataItem> {
    alt((
        map(
            tuple((
                tag_no_case(b"FLAGS"),
                sp,
                delimited(
                    tag(b"("),
                    opt(separated_list1(sp, flag_fetch)),
                    tag(b")"),
                ),
            )),
            |(_, _, flags)| MessageDataItem::Flags(flags.unwrap_or_default()),
        ),
        map(
            tuple((tag_no_case(b"ENVELOPE"), sp, envelope)),
            |(_, _, envelope)| MessageDataItem::Envelope(envelope),
        ),
        map(
            tuple((tag_no_case(b"INTERNALDATE"), sp, date_time)),
            |(_, _, date_time)| MessageDataItem::InternalDate(date_time),
        ),
        map(
            tuple((tag_no_case(b"RFC822.SIZE"), sp, number)),
            |(_, _, size)| MessageDataItem::Rfc822Size(size),
        ),
        map(
            tuple((tag_no_case(b"BODYSTRUCTURE"), sp, crate::parse::body::body(DEFAULT_RECURSION_LIMIT))),
            |(_, _, body)| MessageDataItem::BodyStructure(body),
        ),
        map(
            tuple((tag_no_case(b"BODY"), sp, crate::parse::body::body(DEFAULT_RECURSION_LIMIT))),
            |(_, _, body)| MessageDataItem::Body(body),
        ),
        map(
            tuple((tag_no_case(b"UID"), sp, nz_number)),
            |(_, _, uid)| MessageDataItem::Uid(uid),
        ),
        map(
            tuple((tag_no_case(b"BINARY.SIZE"), section_binary, sp, number)),
            |(_, section, _, size)| MessageDataItem::BinarySize { section, size },
        ),
        map(
            tuple((
                tag_no_case(b"MODSEQ"),
                sp,
                delimited(tag(b"("), number64, tag(b")")),
            )),
            |(_, _, mod_seq)| MessageDataItem::ModSeq(mod_seq),
        ),
        map(
            tuple((tag_no_case(b"X-GM-MSGID"), sp, number64)),
            |(_, _, id)| MessageDataItem::GmailMessageId(id),
        ),
        map(
            tuple((tag_no_case(b"X-GM-THRID"), sp, number64)),
            |(_, _, id)| MessageDataItem::GmailThreadId(id),
        ),
        map(
            tuple((tag_no_case(b"X-GM-LABELS"), sp, gmail_labels)),
            |(_, _, labels)| MessageDataItem::GmailLabels(labels),
        ),
    ))(input)
}

/// `"(" [gm-label *(SP gm-label)] ")"` with `gm-label = "\" atom / astring`
fn gmail_labels(input: &[u8]) -> ImapResult<'_, Vec<GmailLabel>> {
    map(
        delimited(
            tag(b"("),
            opt(separated_list1(
                sp,
                alt((
                    map(preceded(tag(b"\\"), atom), GmailLabel::System),
                    map(astring, GmailLabel::User),
                )),
            )),
            tag(b")"),
        ),
        Option::unwrap_or_default,
    )(input)
}

/// How the value of a streamed attribute is transmitted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum StreamableValue {
    /// `{N}` (or `~{N}`) followed by N octets that are delivered in chunks.
    Literal { length: u32 },
    /// A quoted string, delivered as a single chunk.
    Quoted(Vec<u8>),
    /// `NIL`.
    Nil,
}

/// The start of a streamed fetch attribute: name, addressing, and the value
/// header, stopping right before the value octets.
pub(crate) fn streamed_att_start(
    input: &[u8],
) -> ImapResult<'_, (StreamingKind, StreamableValue)> {
    let mut parser = tuple((
        alt((
            map(
                tuple((
                    tag_no_case(b"BODY"),
                    section,
                    opt(delimited(tag(b"<"), number, tag(b">"))),
                )),
                |(_, section, origin)| StreamingKind::BodyExt { section, origin },
            ),
            map(
                tuple((tag_no_case(b"BINARY"), section_binary)),
                |(_, section)| StreamingKind::Binary { section },
            ),
            value(StreamingKind::Rfc822Header, tag_no_case(b"RFC822.HEADER")),
            value(StreamingKind::Rfc822Text, tag_no_case(b"RFC822.TEXT")),
            value(StreamingKind::Rfc822, tag_no_case(b"RFC822")),
        )),
        sp,
        streamable_value,
    ));

    let (remaining, (kind, _, val)) = parser(input)?;

    Ok((remaining, (kind, val)))
}

/// The value header: a literal announcement, a quoted string, or `NIL`.
fn streamable_value(input: &[u8]) -> ImapResult<'_, StreamableValue> {
    alt((
        map(
            tuple((opt(tag(b"~")), literal_header, newline)),
            |(_, (length, _mode), _): (_, (u32, LiteralMode), _)| StreamableValue::Literal {
                length,
            },
        ),
        map(quoted, |quoted| {
            StreamableValue::Quoted(quoted.inner().as_bytes().to_vec())
        }),
        value(StreamableValue::Nil, tag_no_case(b"NIL")),
    ))(input)
}
