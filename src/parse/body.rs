//! Body structure parsers.

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, opt},
    multi::{many0, many1, separated_list0, separated_list1},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{
        ImapErrorKind, ImapParseError, ImapResult,
        core::{nil, nstring, number, string},
        envelope::envelope,
    },
    types::{
        body::{
            BasicFields, BodyExtension, BodyStructure, ContentTransferEncoding, Disposition,
            Language, Location, MediaSubtype, MultiPart, MultiPartExtensionData, SinglePart,
            SinglePartExtensionData, SinglePartKind,
        },
        core::{IString, NString, Vec1},
    },
};

/// `body = "(" (body-type-1part / body-type-mpart) ")"`
///
/// This parser is recursively defined, so the allowed nesting is limited by
/// an explicit budget to not overflow the stack.
pub(crate) fn body(
    remaining_recursions: usize,
) -> impl Fn(&[u8]) -> ImapResult<'_, BodyStructure> {
    move |input: &[u8]| body_limited(input, remaining_recursions)
}

fn body_limited(input: &[u8], remaining_recursions: usize) -> ImapResult<'_, BodyStructure> {
    if remaining_recursions == 0 {
        return Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::RecursionLimitExceeded,
        }));
    }

    let body_type_1part =
        move |input| body_type_1part_limited(input, remaining_recursions.saturating_sub(1));
    let body_type_mpart =
        move |input| body_type_mpart_limited(input, remaining_recursions.saturating_sub(1));

    delimited(
        tag(b"("),
        alt((body_type_1part, body_type_mpart)),
        tag(b")"),
    )(input)
}

/// `body-type-1part = (body-type-basic / body-type-msg / body-type-text)
///                    [SP body-ext-1part]`
fn body_type_1part_limited(
    input: &[u8],
    remaining_recursions: usize,
) -> ImapResult<'_, BodyStructure> {
    let body_type_msg = move |input| body_type_msg_limited(input, remaining_recursions);

    let mut parser = tuple((
        alt((body_type_msg, body_type_text, body_type_basic)),
        opt(preceded(sp, body_ext_1part)),
    ));

    let (remaining, ((fields, kind), extension_data)) = parser(input)?;

    Ok((
        remaining,
        BodyStructure::Single(SinglePart {
            fields,
            kind,
            extension_data,
        }),
    ))
}

/// `body-type-basic = media-basic SP body-fields`
///
/// MESSAGE subtype MUST NOT be "RFC822".
fn body_type_basic(input: &[u8]) -> ImapResult<'_, (BasicFields, SinglePartKind)> {
    let mut parser = tuple((media_basic, sp, body_fields));

    let (remaining, ((r#type, subtype), _, fields)) = parser(input)?;

    Ok((remaining, (fields, SinglePartKind::Basic { r#type, subtype })))
}

/// `body-type-msg = media-message SP body-fields SP envelope SP body SP
///                  body-fld-lines`
fn body_type_msg_limited(
    input: &[u8],
    remaining_recursions: usize,
) -> ImapResult<'_, (BasicFields, SinglePartKind)> {
    if remaining_recursions == 0 {
        return Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::RecursionLimitExceeded,
        }));
    }

    let body = move |input| body_limited(input, remaining_recursions.saturating_sub(1));

    let mut parser = tuple((
        media_message,
        sp,
        body_fields,
        sp,
        envelope,
        sp,
        body,
        sp,
        number,
    ));

    let (remaining, (_, _, fields, _, envelope, _, body_structure, _, number_of_lines)) =
        parser(input)?;

    Ok((
        remaining,
        (
            fields,
            SinglePartKind::Message {
                envelope: Box::new(envelope),
                body_structure: Box::new(body_structure),
                number_of_lines,
            },
        ),
    ))
}

/// `body-type-text = media-text SP body-fields SP body-fld-lines`
fn body_type_text(input: &[u8]) -> ImapResult<'_, (BasicFields, SinglePartKind)> {
    let mut parser = tuple((media_text, sp, body_fields, sp, number));

    let (remaining, (subtype, _, fields, _, number_of_lines)) = parser(input)?;

    Ok((
        remaining,
        (
            fields,
            SinglePartKind::Text {
                subtype,
                number_of_lines,
            },
        ),
    ))
}

/// `body-type-mpart = 1*body SP media-subtype [SP body-ext-mpart]`
fn body_type_mpart_limited(
    input: &[u8],
    remaining_recursions: usize,
) -> ImapResult<'_, BodyStructure> {
    if remaining_recursions == 0 {
        return Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::RecursionLimitExceeded,
        }));
    }

    let body = move |input| body_limited(input, remaining_recursions.saturating_sub(1));

    let mut parser = tuple((
        many1(body),
        sp,
        string,
        opt(preceded(sp, body_ext_mpart)),
    ));

    let (remaining, (bodies, _, subtype, extension_data)) = parser(input)?;

    Ok((
        remaining,
        BodyStructure::Multi(MultiPart {
            bodies: Vec1::unvalidated(bodies),
            subtype: MediaSubtype::from(subtype),
            extension_data,
        }),
    ))
}

/// `body-fields = body-fld-param SP body-fld-id SP body-fld-desc SP
///                body-fld-enc SP body-fld-octets`
fn body_fields(input: &[u8]) -> ImapResult<'_, BasicFields> {
    let mut parser = tuple((
        body_fld_param,
        sp,
        nstring, // body-fld-id
        sp,
        nstring, // body-fld-desc
        sp,
        map(string, ContentTransferEncoding::from), // body-fld-enc
        sp,
        number, // body-fld-octets
    ));

    let (remaining, (parameter_list, _, id, _, description, _, content_transfer_encoding, _, size)) =
        parser(input)?;

    Ok((
        remaining,
        BasicFields {
            parameter_list,
            id,
            description,
            content_transfer_encoding,
            size,
        },
    ))
}

/// `body-fld-param = "(" string SP string *(SP string SP string) ")" / nil`
fn body_fld_param(input: &[u8]) -> ImapResult<'_, Vec<(IString, IString)>> {
    alt((
        delimited(
            tag(b"("),
            separated_list0(
                sp,
                map(tuple((string, sp, string)), |(key, _, value)| (key, value)),
            ),
            tag(b")"),
        ),
        map(nil, |_| vec![]),
    ))(input)
}

/// `media-basic = ((DQUOTE ("APPLICATION" / "AUDIO" / "IMAGE" / "MESSAGE" /
///                "VIDEO") DQUOTE) / string) SP media-subtype`
///
/// Accepts any string for the type; the distinction between the well-known
/// types carries no structural information.
fn media_basic(input: &[u8]) -> ImapResult<'_, (IString, MediaSubtype)> {
    let mut parser = tuple((string, sp, string));

    let (remaining, (r#type, _, subtype)) = parser(input)?;

    Ok((remaining, (r#type, MediaSubtype::from(subtype))))
}

/// `media-message = DQUOTE "MESSAGE" DQUOTE SP DQUOTE "RFC822" DQUOTE`
fn media_message(input: &[u8]) -> ImapResult<'_, ()> {
    map(
        tuple((
            tag(b"\""),
            tag_no_case(b"MESSAGE"),
            tag(b"\" \""),
            tag_no_case(b"RFC822"),
            tag(b"\""),
        )),
        |_| (),
    )(input)
}

/// `media-text = DQUOTE "TEXT" DQUOTE SP media-subtype`
fn media_text(input: &[u8]) -> ImapResult<'_, MediaSubtype> {
    let mut parser = tuple((
        tag(b"\""),
        tag_no_case(b"TEXT"),
        tag(b"\""),
        sp,
        string,
    ));

    let (remaining, (_, _, _, _, subtype)) = parser(input)?;

    Ok((remaining, MediaSubtype::from(subtype)))
}

/// `body-ext-1part = body-fld-md5 [SP body-fld-dsp [SP body-fld-lang
///                   [SP body-fld-loc *(SP body-extension)]]]`
fn body_ext_1part(input: &[u8]) -> ImapResult<'_, SinglePartExtensionData> {
    let mut parser = tuple((nstring, opt(preceded(sp, body_fld_dsp_tail))));

    let (remaining, (md5, tail)) = parser(input)?;

    Ok((remaining, SinglePartExtensionData { md5, tail }))
}

/// `body-ext-mpart = body-fld-param [SP body-fld-dsp [SP body-fld-lang
///                   [SP body-fld-loc *(SP body-extension)]]]`
fn body_ext_mpart(input: &[u8]) -> ImapResult<'_, MultiPartExtensionData> {
    let mut parser = tuple((body_fld_param, opt(preceded(sp, body_fld_dsp_tail))));

    let (remaining, (parameter_list, tail)) = parser(input)?;

    Ok((
        remaining,
        MultiPartExtensionData {
            parameter_list,
            tail,
        },
    ))
}

/// `body-fld-dsp = "(" string SP body-fld-param ")" / nil`, together with the
/// language/location tail that may only follow it.
fn body_fld_dsp_tail(input: &[u8]) -> ImapResult<'_, Disposition> {
    let mut parser = tuple((
        alt((
            map(
                delimited(
                    tag(b"("),
                    tuple((string, sp, body_fld_param)),
                    tag(b")"),
                ),
                |(disposition, _, params)| Some((disposition, params)),
            ),
            map(nil, |_| None),
        )),
        opt(preceded(sp, body_fld_lang_tail)),
    ));

    let (remaining, (disposition, tail)) = parser(input)?;

    Ok((remaining, Disposition { disposition, tail }))
}

/// `body-fld-lang = nstring / "(" string *(SP string) ")"`, together with the
/// location tail.
fn body_fld_lang_tail(input: &[u8]) -> ImapResult<'_, Language> {
    let mut parser = tuple((
        alt((
            delimited(tag(b"("), separated_list1(sp, string), tag(b")")),
            map(nstring, |nstring| match nstring.0 {
                Some(lang) => vec![lang],
                None => vec![],
            }),
        )),
        opt(preceded(sp, body_fld_loc_tail)),
    ));

    let (remaining, (languages, tail)) = parser(input)?;

    Ok((remaining, Language { languages, tail }))
}

/// `body-fld-loc = nstring` plus any trailing `body-extension` values.
fn body_fld_loc_tail(input: &[u8]) -> ImapResult<'_, Location> {
    let mut parser = tuple((nstring, many0(preceded(sp, body_extension(8)))));

    let (remaining, (location, extensions)) = parser(input)?;

    Ok((remaining, Location { location, extensions }))
}

/// `body-extension = nstring / number / "(" body-extension
///                   *(SP body-extension) ")"`
///
/// Future expansion; recursively defined and therefore budgeted.
fn body_extension(
    remaining_recursions: usize,
) -> impl Fn(&[u8]) -> ImapResult<'_, BodyExtension> {
    move |input: &[u8]| body_extension_limited(input, remaining_recursions)
}

fn body_extension_limited(
    input: &[u8],
    remaining_recursions: usize,
) -> ImapResult<'_, BodyExtension> {
    if remaining_recursions == 0 {
        return Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::RecursionLimitExceeded,
        }));
    }

    let body_extension =
        move |input| body_extension_limited(input, remaining_recursions.saturating_sub(1));

    alt((
        map(nstring, BodyExtension::NString),
        map(number, BodyExtension::Number),
        map(
            delimited(tag(b"("), separated_list1(sp, body_extension), tag(b")")),
            |extensions| BodyExtension::List(Vec1::unvalidated(extensions)),
        ),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_single_text() {
        let input = b"(\"TEXT\" \"plain\" NIL NIL NIL \"7BIT\" 42 23)?";
        let (rem, val) = body(8)(input).unwrap();
        assert_eq!(rem, b"?");

        let BodyStructure::Single(single) = val else {
            panic!("expected single part");
        };
        assert_eq!(single.fields.size, 42);
        assert_eq!(
            single.fields.content_transfer_encoding,
            ContentTransferEncoding::SevenBit
        );
        assert!(matches!(
            single.kind,
            SinglePartKind::Text { subtype, number_of_lines: 23 } if subtype.inner() == "plain"
        ));
    }

    #[test]
    fn test_body_single_basic_with_params() {
        let input =
            b"(\"application\" \"voodoo\" (\"name\" \"x\") NIL \"description\" \"base64\" 123)?";
        let (rem, val) = body(8)(input).unwrap();
        assert_eq!(rem, b"?");

        let BodyStructure::Single(single) = val else {
            panic!("expected single part");
        };
        assert_eq!(single.fields.parameter_list.len(), 1);
        assert!(matches!(single.kind, SinglePartKind::Basic { .. }));
    }

    #[test]
    fn test_body_multipart() {
        let input = b"((\"TEXT\" \"plain\" NIL NIL NIL \"7BIT\" 1 1)(\"TEXT\" \"html\" NIL NIL NIL \"7BIT\" 1 1) \"ALTERNATIVE\")?";
        let (rem, val) = body(8)(input).unwrap();
        assert_eq!(rem, b"?");

        let BodyStructure::Multi(multi) = val else {
            panic!("expected multipart");
        };
        assert_eq!(multi.bodies.len(), 2);
        assert_eq!(multi.subtype, MediaSubtype::from("alternative"));
    }

    #[test]
    fn test_body_message_rfc822() {
        let input = b"(\"MESSAGE\" \"RFC822\" NIL NIL NIL \"7BIT\" 342 (NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL) (\"TEXT\" \"plain\" NIL NIL NIL \"7BIT\" 10 1) 5)?";
        let (rem, val) = body(8)(input).unwrap();
        assert_eq!(rem, b"?");

        let BodyStructure::Single(single) = val else {
            panic!("expected single part");
        };
        assert!(matches!(
            single.kind,
            SinglePartKind::Message { number_of_lines: 5, .. }
        ));
    }

    #[test]
    fn test_body_recursion_limit() {
        // A multipart nested once per level; 3 levels don't fit a budget of 2.
        let input = b"(((\"TEXT\" \"plain\" NIL NIL NIL \"7BIT\" 1 1) \"MIXED\") \"MIXED\")?";
        assert!(body(8)(input).is_ok());
        assert!(matches!(
            body(2)(input),
            Err(nom::Err::Failure(ImapParseError {
                kind: ImapErrorKind::RecursionLimitExceeded,
                ..
            }))
        ));
    }

    #[test]
    fn test_body_single_with_extension_data() {
        let input = b"(\"TEXT\" \"plain\" NIL NIL NIL \"7BIT\" 42 23 \"AABB\" NIL NIL NIL (1337))?";
        let (rem, val) = body(8)(input).unwrap();
        assert_eq!(rem, b"?");

        let BodyStructure::Single(single) = val else {
            panic!("expected single part");
        };
        let extension = single.extension_data.unwrap();
        assert_eq!(extension.md5.as_bytes().unwrap(), b"AABB");
        let location = extension.tail.unwrap().tail.unwrap().tail.unwrap();
        assert_eq!(location.extensions.len(), 1);
    }
}
