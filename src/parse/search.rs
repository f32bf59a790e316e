//! Search parsers, including the ESEARCH extensions (RFC 4731 / RFC 5182).

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, map_opt, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{
        DEFAULT_RECURSION_LIMIT, ImapErrorKind, ImapParseError, ImapResult,
        core::{astring, atom, charset, number, number64, nz_number, tag_imap},
        datetime::date,
        section::header_fld_name,
        sequence::sequence_set,
    },
    types::{
        command::CommandBody,
        core::Vec1,
        search::{SearchKey, SearchReturnData, SearchReturnOption},
        sequence::SequenceSet,
    },
};

/// `search = "SEARCH" [search-return-opts] [SP "CHARSET" SP charset]
///           1*(SP search-key)`
///
/// Note: CHARSET argument MUST be registered with IANA.
///
/// errata id: 261
pub(crate) fn search(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"SEARCH"),
        opt(preceded(
            tuple((sp, tag_no_case(b"RETURN "))),
            search_return_opts,
        )),
        opt(map(
            tuple((sp, tag_no_case(b"CHARSET"), sp, charset)),
            |(_, _, _, charset)| charset,
        )),
        sp,
        separated_list1(sp, search_key(DEFAULT_RECURSION_LIMIT)),
    ));

    let (remaining, (_, return_options, charset, _, criteria)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Search {
            charset,
            criteria: flatten_and(criteria),
            return_options: return_options.unwrap_or_default(),
            uid: false,
        },
    ))
}

/// Several keys at the same level are an implicit AND; a single key stands
/// for itself.
pub(crate) fn flatten_and(mut keys: Vec<SearchKey>) -> SearchKey {
    if keys.len() == 1 {
        keys.pop().unwrap()
    } else {
        SearchKey::And(Vec1::unvalidated(keys))
    }
}

/// `"(" [search-return-opt *(SP search-return-opt)] ")"`
fn search_return_opts(input: &[u8]) -> ImapResult<'_, Vec<SearchReturnOption>> {
    map(
        delimited(
            tag(b"("),
            opt(separated_list1(sp, search_return_opt)),
            tag(b")"),
        ),
        Option::unwrap_or_default,
    )(input)
}

/// `search-return-opt = "MIN" / "MAX" / "ALL" / "COUNT" / "SAVE"`
fn search_return_opt(input: &[u8]) -> ImapResult<'_, SearchReturnOption> {
    alt((
        value(SearchReturnOption::Min, tag_no_case(b"MIN")),
        value(SearchReturnOption::Max, tag_no_case(b"MAX")),
        value(SearchReturnOption::All, tag_no_case(b"ALL")),
        value(SearchReturnOption::Count, tag_no_case(b"COUNT")),
        value(SearchReturnOption::Save, tag_no_case(b"SAVE")),
    ))(input)
}

/// `search-key` (see RFC 3501 plus `MODSEQ` of RFC 7162 and `X-GM-RAW`).
///
/// This parser is recursively defined (`NOT`, `OR`, parenthesised groups), so
/// the allowed nesting is limited by an explicit budget.
pub(crate) fn search_key(
    remaining_recursions: usize,
) -> impl Fn(&[u8]) -> ImapResult<'_, SearchKey> {
    move |input: &[u8]| search_key_limited(input, remaining_recursions)
}

fn search_key_limited(input: &[u8], remaining_recursions: usize) -> ImapResult<'_, SearchKey> {
    if remaining_recursions == 0 {
        return Err(nom::Err::Failure(ImapParseError {
            input,
            kind: ImapErrorKind::RecursionLimitExceeded,
        }));
    }

    let search_key =
        move |input| search_key_limited(input, remaining_recursions.saturating_sub(1));

    alt((
        alt((
            value(SearchKey::All, tag_no_case(b"ALL")),
            value(SearchKey::Answered, tag_no_case(b"ANSWERED")),
            map(tuple((tag_no_case(b"BCC"), sp, astring)), |(_, _, val)| {
                SearchKey::Bcc(val)
            }),
            map(
                tuple((tag_no_case(b"BEFORE"), sp, map_opt(date, |date| date))),
                |(_, _, date)| SearchKey::Before(date),
            ),
            map(tuple((tag_no_case(b"BODY"), sp, astring)), |(_, _, val)| {
                SearchKey::Body(val)
            }),
            map(tuple((tag_no_case(b"CC"), sp, astring)), |(_, _, val)| {
                SearchKey::Cc(val)
            }),
            value(SearchKey::Deleted, tag_no_case(b"DELETED")),
            value(SearchKey::Flagged, tag_no_case(b"FLAGGED")),
            map(tuple((tag_no_case(b"FROM"), sp, astring)), |(_, _, val)| {
                SearchKey::From(val)
            }),
            // `flag_keyword` can't be used here: `SearchKey::Keyword` holds an
            // `Atom`, not a `Flag`.
            map(
                tuple((tag_no_case(b"KEYWORD"), sp, atom)),
                |(_, _, val)| SearchKey::Keyword(val),
            ),
            value(SearchKey::New, tag_no_case(b"NEW")),
            value(SearchKey::Old, tag_no_case(b"OLD")),
            map(
                tuple((tag_no_case(b"ON"), sp, map_opt(date, |date| date))),
                |(_, _, date)| SearchKey::On(date),
            ),
            value(SearchKey::Recent, tag_no_case(b"RECENT")),
            value(SearchKey::Seen, tag_no_case(b"SEEN")),
            map(
                tuple((tag_no_case(b"SINCE"), sp, map_opt(date, |date| date))),
                |(_, _, date)| SearchKey::Since(date),
            ),
            map(
                tuple((tag_no_case(b"SUBJECT"), sp, astring)),
                |(_, _, val)| SearchKey::Subject(val),
            ),
            map(tuple((tag_no_case(b"TEXT"), sp, astring)), |(_, _, val)| {
                SearchKey::Text(val)
            }),
            map(tuple((tag_no_case(b"TO"), sp, astring)), |(_, _, val)| {
                SearchKey::To(val)
            }),
        )),
        alt((
            value(SearchKey::Unanswered, tag_no_case(b"UNANSWERED")),
            value(SearchKey::Undeleted, tag_no_case(b"UNDELETED")),
            value(SearchKey::Unflagged, tag_no_case(b"UNFLAGGED")),
            map(
                tuple((tag_no_case(b"UNKEYWORD"), sp, atom)),
                |(_, _, val)| SearchKey::Unkeyword(val),
            ),
            value(SearchKey::Unseen, tag_no_case(b"UNSEEN")),
            value(SearchKey::Undraft, tag_no_case(b"UNDRAFT")),
            value(SearchKey::Draft, tag_no_case(b"DRAFT")),
            map(
                tuple((tag_no_case(b"HEADER"), sp, header_fld_name, sp, astring)),
                |(_, _, key, _, val)| SearchKey::Header(key, val),
            ),
            map(
                tuple((tag_no_case(b"LARGER"), sp, number)),
                |(_, _, val)| SearchKey::Larger(val),
            ),
            map(
                tuple((tag_no_case(b"NOT"), sp, search_key)),
                |(_, _, val)| SearchKey::Not(Box::new(val)),
            ),
            map(
                tuple((tag_no_case(b"OR"), sp, search_key, sp, search_key)),
                |(_, _, alt1, _, alt2)| SearchKey::Or(Box::new(alt1), Box::new(alt2)),
            ),
            map(
                tuple((tag_no_case(b"SENTBEFORE"), sp, map_opt(date, |date| date))),
                |(_, _, date)| SearchKey::SentBefore(date),
            ),
            map(
                tuple((tag_no_case(b"SENTON"), sp, map_opt(date, |date| date))),
                |(_, _, date)| SearchKey::SentOn(date),
            ),
            map(
                tuple((tag_no_case(b"SENTSINCE"), sp, map_opt(date, |date| date))),
                |(_, _, date)| SearchKey::SentSince(date),
            ),
            map(
                tuple((tag_no_case(b"SMALLER"), sp, number)),
                |(_, _, val)| SearchKey::Smaller(val),
            ),
            map(
                tuple((tag_no_case(b"UID"), sp, sequence_set)),
                |(_, _, val)| SearchKey::Uid(val),
            ),
            map(
                tuple((tag_no_case(b"MODSEQ"), sp, number64)),
                |(_, _, val)| SearchKey::ModSeq(val),
            ),
            map(
                tuple((tag_no_case(b"X-GM-RAW"), sp, astring)),
                |(_, _, val)| SearchKey::GmailRaw(val),
            ),
            // No keyword matched: fall back to a raw sequence set.
            map(sequence_set, SearchKey::SequenceSet),
            map(
                delimited(tag(b"("), separated_list1(sp, search_key), tag(b")")),
                flatten_and,
            ),
        )),
    ))(input)
}

/// `esearch-response = "ESEARCH" [search-correlator] [SP "UID"]
///                     *(SP search-return-data)` (RFC 4731)
pub(crate) fn esearch_response(input: &[u8]) -> ImapResult<'_, crate::types::response::Data> {
    let mut parser = tuple((
        tag_no_case(b"ESEARCH"),
        opt(delimited(
            tag_no_case(b" (TAG \""),
            tag_imap,
            tag(b"\")"),
        )),
        map(opt(tag_no_case(b" UID")), |uid| uid.is_some()),
        nom::multi::many0(preceded(sp, search_return_data)),
    ));

    let (remaining, (_, correlator, uid, items)) = parser(input)?;

    Ok((
        remaining,
        crate::types::response::Data::ESearch {
            correlator,
            uid,
            items,
        },
    ))
}

/// `search-return-data = "MIN" SP nz-number / "MAX" SP nz-number /
///                       "ALL" SP sequence-set / "COUNT" SP number /
///                       "MODSEQ" SP mod-sequence-value`
fn search_return_data(input: &[u8]) -> ImapResult<'_, SearchReturnData> {
    alt((
        map(
            tuple((tag_no_case(b"MIN"), sp, nz_number)),
            |(_, _, val)| SearchReturnData::Min(val),
        ),
        map(
            tuple((tag_no_case(b"MAX"), sp, nz_number)),
            |(_, _, val)| SearchReturnData::Max(val),
        ),
        map(
            tuple((tag_no_case(b"ALL"), sp, sequence_set)),
            |(_, _, val)| SearchReturnData::All(val),
        ),
        map(
            tuple((tag_no_case(b"COUNT"), sp, number)),
            |(_, _, val)| SearchReturnData::Count(val),
        ),
        map(
            tuple((tag_no_case(b"MODSEQ"), sp, number64)),
            |(_, _, val)| SearchReturnData::ModSeq(val),
        ),
    ))(input)
}
