//! Flag parsers.

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::tag,
    combinator::{map, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded},
};

use crate::{
    parse::{ImapResult, core::atom},
    types::flag::{Flag, FlagFetch, FlagNameAttribute, FlagPerm},
};

/// `flag = "\Answered" / "\Flagged" / "\Deleted" / "\Seen" / "\Draft" /
///         flag-keyword / flag-extension`
pub(crate) fn flag(input: &[u8]) -> ImapResult<'_, Flag> {
    alt((
        map(preceded(tag(b"\\"), atom), |atom| {
            match atom.inner().to_ascii_lowercase().as_str() {
                "answered" => Flag::Answered,
                "deleted" => Flag::Deleted,
                "draft" => Flag::Draft,
                "flagged" => Flag::Flagged,
                "seen" => Flag::Seen,
                _ => Flag::Extension(atom),
            }
        }),
        map(atom, Flag::Keyword),
    ))(input)
}

/// `flag-list = "(" [flag *(SP flag)] ")"`
pub(crate) fn flag_list(input: &[u8]) -> ImapResult<'_, Vec<Flag>> {
    map(
        delimited(tag(b"("), opt(separated_list1(sp, flag)), tag(b")")),
        Option::unwrap_or_default,
    )(input)
}

/// `flag-fetch = flag / "\Recent"`
pub(crate) fn flag_fetch(input: &[u8]) -> ImapResult<'_, FlagFetch> {
    alt((
        // "\Recent" would parse as Flag::Extension; match it first.
        value(FlagFetch::Recent, nom::bytes::streaming::tag_no_case(b"\\Recent")),
        map(flag, FlagFetch::Flag),
    ))(input)
}

/// `flag-perm = flag / "\*"`
pub(crate) fn flag_perm(input: &[u8]) -> ImapResult<'_, FlagPerm> {
    alt((
        value(FlagPerm::Asterisk, tag(b"\\*")),
        map(flag, FlagPerm::Flag),
    ))(input)
}

/// `mbx-list-flags`, covering the SPECIAL-USE attributes too.
pub(crate) fn mbx_list_flags(input: &[u8]) -> ImapResult<'_, Vec<FlagNameAttribute>> {
    map(
        opt(separated_list1(
            sp,
            map(preceded(tag(b"\\"), atom), FlagNameAttribute::from),
        )),
        Option::unwrap_or_default,
    )(input)
}
