//! Section and partial-range parsers.

use std::num::NonZeroU32;

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, map_res, opt, value},
    multi::separated_list1,
    sequence::{delimited, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{astring, number, nz_number},
    },
    types::{
        core::{AString, Vec1},
        section::{Part, Section},
    },
};

/// A part specifier before it is combined with an optional part path.
#[derive(Clone, Debug)]
pub(crate) enum PartSpecifier {
    Header,
    HeaderFields(Vec1<AString>),
    HeaderFieldsNot(Vec1<AString>),
    Text,
    Mime,
}

/// `section = "[" [section-spec] "]"`
pub(crate) fn section(input: &[u8]) -> ImapResult<'_, Option<Section>> {
    delimited(tag(b"["), opt(section_spec), tag(b"]"))(input)
}

/// `section-spec = section-msgtext / (section-part ["." section-text])`
pub(crate) fn section_spec(input: &[u8]) -> ImapResult<'_, Section> {
    alt((
        map(section_msgtext, |part_specifier| match part_specifier {
            PartSpecifier::Header => Section::Header(None),
            PartSpecifier::HeaderFields(fields) => Section::HeaderFields(None, fields),
            PartSpecifier::HeaderFieldsNot(fields) => Section::HeaderFieldsNot(None, fields),
            PartSpecifier::Text => Section::Text(None),
            PartSpecifier::Mime => unreachable!(),
        }),
        map(
            tuple((section_part, opt(tuple((tag(b"."), section_text))))),
            |(part, maybe_specifier)| match maybe_specifier {
                Some((_, specifier)) => match specifier {
                    PartSpecifier::Header => Section::Header(Some(Part(part))),
                    PartSpecifier::HeaderFields(fields) => {
                        Section::HeaderFields(Some(Part(part)), fields)
                    }
                    PartSpecifier::HeaderFieldsNot(fields) => {
                        Section::HeaderFieldsNot(Some(Part(part)), fields)
                    }
                    PartSpecifier::Text => Section::Text(Some(Part(part))),
                    PartSpecifier::Mime => Section::Mime(Part(part)),
                },
                None => Section::Part(Part(part)),
            },
        ),
    ))(input)
}

/// `section-msgtext = "HEADER" / "HEADER.FIELDS" [".NOT"] SP header-list /
///                    "TEXT"`
///
/// Top-level or MESSAGE/RFC822 part
pub(crate) fn section_msgtext(input: &[u8]) -> ImapResult<'_, PartSpecifier> {
    alt((
        map(
            tuple((tag_no_case(b"HEADER.FIELDS.NOT"), sp, header_list)),
            |(_, _, header_list)| PartSpecifier::HeaderFieldsNot(header_list),
        ),
        map(
            tuple((tag_no_case(b"HEADER.FIELDS"), sp, header_list)),
            |(_, _, header_list)| PartSpecifier::HeaderFields(header_list),
        ),
        value(PartSpecifier::Header, tag_no_case(b"HEADER")),
        value(PartSpecifier::Text, tag_no_case(b"TEXT")),
    ))(input)
}

/// `section-part = nz-number *("." nz-number)`
///
/// Body part nesting
#[inline]
pub(crate) fn section_part(input: &[u8]) -> ImapResult<'_, Vec1<NonZeroU32>> {
    map(separated_list1(tag(b"."), nz_number), Vec1::unvalidated)(input)
}

/// `section-text = section-msgtext / "MIME"`
///
/// Text other than actual body part (headers, etc.)
pub(crate) fn section_text(input: &[u8]) -> ImapResult<'_, PartSpecifier> {
    alt((
        section_msgtext,
        value(PartSpecifier::Mime, tag_no_case(b"MIME")),
    ))(input)
}

/// `header-list = "(" header-fld-name *(SP header-fld-name) ")"`
pub(crate) fn header_list(input: &[u8]) -> ImapResult<'_, Vec1<AString>> {
    map(
        delimited(tag(b"("), separated_list1(sp, header_fld_name), tag(b")")),
        Vec1::unvalidated,
    )(input)
}

/// `header-fld-name = astring`
#[inline]
pub(crate) fn header_fld_name(input: &[u8]) -> ImapResult<'_, AString> {
    astring(input)
}

/// `partial = "<" number "." nz-number ">"` as attached to a fetch attribute.
pub(crate) fn partial(input: &[u8]) -> ImapResult<'_, (u32, NonZeroU32)> {
    map_res(
        delimited(
            tag(b"<"),
            tuple((number, tag(b"."), nz_number)),
            tag(b">"),
        ),
        |(offset, _, length)| {
            // offset + length - 1 must fit in 32 bits.
            match offset.checked_add(u32::from(length) - 1) {
                Some(_) => Ok((offset, length)),
                None => Err(std::num::NonZeroU32::try_from(0).unwrap_err()),
            }
        },
    )(input)
}

/// `section-binary = "[" [section-part] "]"` (RFC 3516)
pub(crate) fn section_binary(input: &[u8]) -> ImapResult<'_, Vec<NonZeroU32>> {
    map(
        delimited(tag(b"["), opt(section_part), tag(b"]")),
        |part| part.map(Vec1::into_inner).unwrap_or_default(),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section() {
        let (rem, val) = section(b"[]?").unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(val, None);

        let (_, val) = section(b"[TEXT]?").unwrap();
        assert_eq!(val, Some(Section::Text(None)));

        let (_, val) = section(b"[4.1.TEXT]?").unwrap();
        let Some(Section::Text(Some(Part(part)))) = val else {
            panic!("unexpected: {val:?}");
        };
        assert_eq!(part.len(), 2);

        let (_, val) = section(b"[4.1.MIME]?").unwrap();
        assert!(matches!(val, Some(Section::Mime(_))));

        let (_, val) = section(b"[HEADER.FIELDS (Subject Date)]?").unwrap();
        assert!(matches!(val, Some(Section::HeaderFields(None, fields)) if fields.len() == 2));
    }

    #[test]
    fn test_mime_without_part_fails() {
        assert!(section(b"[MIME]?").is_err());
    }

    #[test]
    fn test_partial() {
        let (rem, val) = partial(b"<42.1337>?").unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(val, (42, 1337.try_into().unwrap()));

        // Length must be non-zero.
        assert!(partial(b"<42.0>?").is_err());

        // offset + length - 1 must fit in 32 bits.
        assert!(partial(b"<4294967295.2>?").is_err());
        assert!(partial(b"<4294967295.1>?").is_ok());
    }

    #[test]
    fn test_section_binary() {
        let (_, val) = section_binary(b"[]?").unwrap();
        assert!(val.is_empty());

        let (_, val) = section_binary(b"[1.2.3]?").unwrap();
        assert_eq!(val.len(), 3);
    }
}
