//! METADATA parsers (RFC 5464).

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
        ImapResult,
        core::{astring, nstring, number},
        mailbox::mailbox,
    },
    types::{
        command::CommandBody,
        core::Vec1,
        extensions::metadata::{
            EntryValue, GetMetadataOption, MetadataCode, MetadataDepth, MetadataResponse,
        },
        response::Data,
    },
};

/// `setmetadata = "SETMETADATA" SP mailbox SP "(" entry-value
///                *(SP entry-value) ")"`
pub(crate) fn setmetadata(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"SETMETADATA "),
        mailbox,
        tag(b" ("),
        separated_list1(sp, entry_value),
        tag(b")"),
    ));

    let (remaining, (_, mailbox, _, entry_values, _)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::SetMetadata {
            mailbox,
            entry_values: Vec1::unvalidated(entry_values),
        },
    ))
}

/// `getmetadata = "GETMETADATA" [SP getmetadata-options] SP mailbox SP
///                entries`
pub(crate) fn getmetadata(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"GETMETADATA"),
        opt(preceded(
            sp,
            delimited(
                tag(b"("),
                separated_list1(sp, getmetadata_option),
                tag(b")"),
            ),
        )),
        sp,
        mailbox,
        sp,
        entries,
    ));

    let (remaining, (_, options, _, mailbox, _, entries)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::GetMetadata {
            options: options.unwrap_or_default(),
            mailbox,
            entries,
        },
    ))
}

/// `getmetadata-option = "MAXSIZE" SP number / "DEPTH" SP
///                       ("0" / "1" / "infinity")`
fn getmetadata_option(input: &[u8]) -> ImapResult<'_, GetMetadataOption> {
    alt((
        map(
            preceded(tag_no_case(b"MAXSIZE "), number),
            GetMetadataOption::MaxSize,
        ),
        map(
            preceded(
                tag_no_case(b"DEPTH "),
                alt((
                    value(MetadataDepth::Zero, tag(b"0")),
                    value(MetadataDepth::One, tag(b"1")),
                    value(MetadataDepth::Infinity, tag_no_case(b"infinity")),
                )),
            ),
            GetMetadataOption::Depth,
        ),
    ))(input)
}

/// `entries = entry / "(" entry *(SP entry) ")"`
fn entries(input: &[u8]) -> ImapResult<'_, Vec1<crate::types::extensions::metadata::EntryName>> {
    alt((
        map(
            delimited(tag(b"("), separated_list1(sp, astring), tag(b")")),
            Vec1::unvalidated,
        ),
        map(astring, Vec1::from),
    ))(input)
}

/// `entry-value = entry SP value`
fn entry_value(input: &[u8]) -> ImapResult<'_, EntryValue> {
    let mut parser = tuple((astring, sp, nstring));

    let (remaining, (entry, _, value)) = parser(input)?;

    Ok((remaining, EntryValue { entry, value }))
}

/// `metadata-resp = "METADATA" SP mailbox SP
///                  ("(" entry-value *(SP entry-value) ")" /
///                   entry *(SP entry))`
pub(crate) fn metadata_response(input: &[u8]) -> ImapResult<'_, Data> {
    let mut parser = tuple((
        tag_no_case(b"METADATA "),
        mailbox,
        sp,
        alt((
            map(
                delimited(tag(b"("), separated_list1(sp, entry_value), tag(b")")),
                |values| MetadataResponse::WithValues(Vec1::unvalidated(values)),
            ),
            map(separated_list1(sp, astring), |entries| {
                MetadataResponse::WithoutValues(Vec1::unvalidated(entries))
            }),
        )),
    ));

    let (remaining, (_, mailbox, _, value)) = parser(input)?;

    Ok((remaining, Data::Metadata { mailbox, value }))
}

/// The detail of a `METADATA` response code:
/// `"LONGENTRIES" SP number / "MAXSIZE" SP number / "TOOMANY" / "NOPRIVATE"`
pub(crate) fn metadata_code(input: &[u8]) -> ImapResult<'_, MetadataCode> {
    alt((
        map(
            preceded(tag_no_case(b"LONGENTRIES "), number),
            MetadataCode::LongEntries,
        ),
        map(
            preceded(tag_no_case(b"MAXSIZE "), number),
            MetadataCode::MaxSize,
        ),
        value(MetadataCode::TooMany, tag_no_case(b"TOOMANY")),
        value(MetadataCode::NoPrivate, tag_no_case(b"NOPRIVATE")),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setmetadata() {
        let (_, val) =
            setmetadata(b"SETMETADATA INBOX (/private/comment \"My comment\")\r\n").unwrap();
        let CommandBody::SetMetadata { entry_values, .. } = val else {
            panic!("expected setmetadata");
        };
        assert_eq!(entry_values.len(), 1);
    }

    #[test]
    fn test_getmetadata_with_options() {
        let (_, val) = getmetadata(
            b"GETMETADATA (MAXSIZE 1024 DEPTH infinity) INBOX /shared/comment\r\n",
        )
        .unwrap();
        let CommandBody::GetMetadata { options, entries, .. } = val else {
            panic!("expected getmetadata");
        };
        assert_eq!(
            options,
            vec![
                GetMetadataOption::MaxSize(1024),
                GetMetadataOption::Depth(MetadataDepth::Infinity),
            ]
        );
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_metadata_response_with_values() {
        let (_, val) =
            metadata_response(b"METADATA INBOX (/private/comment NIL)\r\n").unwrap();
        let Data::Metadata { value: MetadataResponse::WithValues(values), .. } = val else {
            panic!("expected values");
        };
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_metadata_response_unsolicited() {
        let (_, val) =
            metadata_response(b"METADATA INBOX /shared/comment /private/comment\r\n").unwrap();
        assert!(matches!(
            val,
            Data::Metadata { value: MetadataResponse::WithoutValues(_), .. }
        ));
    }

    #[test]
    fn test_metadata_code() {
        let (_, val) = metadata_code(b"MAXSIZE 1024]").unwrap();
        assert_eq!(val, MetadataCode::MaxSize(1024));
    }
}
