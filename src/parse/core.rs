//! Core tokenizers: numbers, strings, literals, atoms.

use std::str::from_utf8;

use abnf_core::streaming::dquote;
use base64::{engine::general_purpose::STANDARD as _base64, Engine};
use nom::{
    branch::alt,
    bytes::streaming::{escaped, tag, tag_no_case, take, take_while, take_while1, take_while_m_n},
    character::streaming::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize},
    sequence::{delimited, terminated, tuple},
};

use crate::{
    parse::{ImapErrorKind, ImapParseError, ImapResult, newline},
    types::{
        core::{
            AString, Atom, AtomExt, Charset, IString, Literal, LiteralMode, NString, Quoted,
            QuotedChar, Tag, Text,
        },
        indicators::{
            is_any_text_char_except_quoted_specials, is_astring_char, is_atom_char,
            is_base64_char, is_quoted_specials, is_tag_char, is_text_char,
        },
        utils::unescape_quoted,
    },
};

// ----- number -----

/// `number = 1*DIGIT`
///
/// Unsigned 32-bit integer (0 <= n < 4,294,967,296)
pub(crate) fn number(input: &[u8]) -> ImapResult<'_, u32> {
    map_res(
        // `1*DIGIT` is ASCII-only, so `unwrap` can't fail.
        map(digit1, |val| from_utf8(val).unwrap()),
        str::parse::<u32>,
    )(input)
}

/// `number64 = 1*DIGIT`
///
/// Unsigned 64-bit integer; mod-sequence values (RFC 7162) don't fit in 32
/// bits.
pub(crate) fn number64(input: &[u8]) -> ImapResult<'_, u64> {
    map_res(
        map(digit1, |val| from_utf8(val).unwrap()),
        str::parse::<u64>,
    )(input)
}

/// `nz-number = digit-nz *DIGIT`
///
/// Non-zero unsigned 32-bit integer (0 < n < 4,294,967,296)
pub(crate) fn nz_number(input: &[u8]) -> ImapResult<'_, std::num::NonZeroU32> {
    map_res(number, std::num::NonZeroU32::try_from)(input)
}

// ----- string -----

/// `string = quoted / literal`
pub(crate) fn string(input: &[u8]) -> ImapResult<'_, IString> {
    alt((map(quoted, IString::Quoted), map(literal, IString::Literal)))(input)
}

/// `quoted = DQUOTE *QUOTED-CHAR DQUOTE`
///
/// Only allocates a fresh String when escaped characters need to be replaced.
pub(crate) fn quoted(input: &[u8]) -> ImapResult<'_, Quoted> {
    let mut parser = tuple((
        dquote,
        map(
            opt(escaped(
                take_while1(is_any_text_char_except_quoted_specials),
                '\\',
                one_of("\\\""),
            )),
            // Quoted chars are ASCII-only, so `unwrap` can't fail.
            |val| from_utf8(val.unwrap_or_default()).unwrap(),
        ),
        dquote,
    ));

    let (remaining, (_, quoted, _)) = parser(input)?;

    Ok((remaining, Quoted::unvalidated(unescape_quoted(quoted).into_owned())))
}

/// `QUOTED-CHAR = <any TEXT-CHAR except quoted-specials> / "\" quoted-specials`
pub(crate) fn quoted_char(input: &[u8]) -> ImapResult<'_, QuotedChar> {
    map(
        alt((
            map(
                take_while_m_n(1, 1, is_any_text_char_except_quoted_specials),
                |bytes: &[u8]| bytes[0] as char,
            ),
            map(
                tuple((tag("\\"), take_while_m_n(1, 1, is_quoted_specials))),
                |(_, bytes): (_, &[u8])| bytes[0] as char,
            ),
        )),
        QuotedChar::unvalidated,
    )(input)
}

/// `literal = "{" number ["+"] "}" CRLF *CHAR8`
///
/// Covers the non-synchronizing variants of RFC 7888 (`{N+}`, `{N-}`) and is
/// shared with `literal8` for the framing of binary literals.
pub(crate) fn literal(input: &[u8]) -> ImapResult<'_, Literal> {
    let (remaining, (length, mode)) = terminated(literal_header, newline)(input)?;

    // Signal that a continuation request could be required.
    // Note: this doesn't trigger when data follows the literal prefix.
    if remaining.is_empty() {
        return Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::Literal { length, mode },
        }));
    }

    let (remaining, data) = take(length)(remaining)?;

    match Literal::try_from(data) {
        Ok(mut literal) => {
            literal.mode = mode;

            Ok((remaining, literal))
        }
        Err(_) => Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::LiteralContainsNull,
        })),
    }
}

/// `"{" number ["+" / "-"] "}"` without the trailing newline.
///
/// Shared by [`literal`] and the streaming consumers that take the announced
/// octets in chunks; a `~` prefix (binary literal, RFC 3516) is handled at
/// the call sites and does not change the header.
pub(crate) fn literal_header(input: &[u8]) -> ImapResult<'_, (u32, LiteralMode)> {
    delimited(
        tag(b"{"),
        tuple((
            number,
            map(opt(alt((char('+'), char('-')))), |i| match i {
                Some(_) => LiteralMode::NonSync,
                None => LiteralMode::Sync,
            }),
        )),
        tag(b"}"),
    )(input)
}

// ----- astring ----- atom (roughly) or string

/// `astring = 1*ASTRING-CHAR / string`
pub(crate) fn astring(input: &[u8]) -> ImapResult<'_, AString> {
    alt((
        map(take_while1(is_astring_char), |bytes: &[u8]| {
            // `is_astring_char` proves the bytes are ASCII and valid.
            AString::Atom(AtomExt::unvalidated(from_utf8(bytes).unwrap()))
        }),
        map(string, AString::String),
    ))(input)
}

/// `atom = 1*ATOM-CHAR`
pub(crate) fn atom(input: &[u8]) -> ImapResult<'_, Atom> {
    let (remaining, parsed) = take_while1(is_atom_char)(input)?;

    Ok((remaining, Atom::unvalidated(from_utf8(parsed).unwrap())))
}

// ----- nstring ----- nil or string

/// `nstring = string / nil`
pub(crate) fn nstring(input: &[u8]) -> ImapResult<'_, NString> {
    alt((
        map(string, |item| NString(Some(item))),
        map(nil, |_| NString(None)),
    ))(input)
}

/// `nil = "NIL"`
#[inline]
pub(crate) fn nil(input: &[u8]) -> ImapResult<'_, &[u8]> {
    tag_no_case(b"NIL")(input)
}

// ----- text -----

/// `text = 1*TEXT-CHAR`
pub(crate) fn text(input: &[u8]) -> ImapResult<'_, Text> {
    map(take_while1(is_text_char), |bytes| {
        Text::unvalidated(from_utf8(bytes).unwrap())
    })(input)
}

// ----- base64 -----

/// `base64 = *(4base64-char) [base64-terminal]`
pub(crate) fn base64(input: &[u8]) -> ImapResult<'_, Vec<u8>> {
    map_res(
        recognize(tuple((
            take_while(is_base64_char),
            opt(alt((tag("=="), tag("=")))),
        ))),
        |input| _base64.decode(input),
    )(input)
}

// ----- charset -----

/// `charset = atom / quoted`
///
/// Note: see errata id: 261
pub(crate) fn charset(input: &[u8]) -> ImapResult<'_, Charset> {
    alt((map(atom, Charset::Atom), map(quoted, Charset::Quoted)))(input)
}

// ----- tag -----

/// `tag = 1*<any ASTRING-CHAR except "+">`
pub(crate) fn tag_imap(input: &[u8]) -> ImapResult<'_, Tag> {
    map(take_while1(is_tag_char), |val| {
        Tag::unvalidated(from_utf8(val).unwrap())
    })(input)
}
