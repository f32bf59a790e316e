//! CONDSTORE/QRESYNC parsers (RFC 7162).

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
        core::{atom, number64, nz_number},
        sequence::sequence_set,
    },
    types::{
        command::{FetchModifier, SelectParameter, StoreModifier},
        response::Data,
    },
};

/// `select-param *(SP select-param)` inside `SELECT/EXAMINE ... (...)`.
pub(crate) fn select_parameters(input: &[u8]) -> ImapResult<'_, Vec<SelectParameter>> {
    delimited(
        tag(b"("),
        separated_list1(sp, select_parameter),
        tag(b")"),
    )(input)
}

/// `condstore-param / qresync-param / select-param`
fn select_parameter(input: &[u8]) -> ImapResult<'_, SelectParameter> {
    alt((
        value(SelectParameter::CondStore, tag_no_case(b"CONDSTORE")),
        preceded(
            tag_no_case(b"QRESYNC ("),
            nom::sequence::terminated(qresync_parameter, tag(b")")),
        ),
        map(atom, SelectParameter::Other),
    ))(input)
}

/// `uidvalidity SP mod-sequence-value [SP known-uids [SP seq-match-data]]`
fn qresync_parameter(input: &[u8]) -> ImapResult<'_, SelectParameter> {
    let mut parser = tuple((
        nz_number,
        sp,
        number64,
        opt(preceded(sp, sequence_set)),
        opt(preceded(
            sp,
            delimited(
                tag(b"("),
                tuple((sequence_set, preceded(sp, sequence_set))),
                tag(b")"),
            ),
        )),
    ));

    let (remaining, (uid_validity, _, mod_seq, known_uids, seq_match_data)) = parser(input)?;

    Ok((
        remaining,
        SelectParameter::QResync {
            uid_validity,
            mod_seq,
            known_uids,
            seq_match_data,
        },
    ))
}

/// `fetch-modifier *(SP fetch-modifier)` inside `FETCH ... (...)`.
pub(crate) fn fetch_modifiers(input: &[u8]) -> ImapResult<'_, Vec<FetchModifier>> {
    delimited(tag(b"("), separated_list1(sp, fetch_modifier), tag(b")"))(input)
}

/// `"CHANGEDSINCE" SP mod-sequence-value / "VANISHED"`
fn fetch_modifier(input: &[u8]) -> ImapResult<'_, FetchModifier> {
    alt((
        map(
            preceded(tag_no_case(b"CHANGEDSINCE "), number64),
            FetchModifier::ChangedSince,
        ),
        value(FetchModifier::Vanished, tag_no_case(b"VANISHED")),
    ))(input)
}

/// `store-modifier *(SP store-modifier)` inside `STORE ... (...)`.
pub(crate) fn store_modifiers(input: &[u8]) -> ImapResult<'_, Vec<StoreModifier>> {
    delimited(tag(b"("), separated_list1(sp, store_modifier), tag(b")"))(input)
}

/// `"UNCHANGEDSINCE" SP mod-sequence-value`
fn store_modifier(input: &[u8]) -> ImapResult<'_, StoreModifier> {
    map(
        preceded(tag_no_case(b"UNCHANGEDSINCE "), number64),
        StoreModifier::UnchangedSince,
    )(input)
}

/// `expunged-resp = "VANISHED" [SP "(EARLIER)"] SP known-uids`
pub(crate) fn vanished_response(input: &[u8]) -> ImapResult<'_, Data> {
    let mut parser = tuple((
        tag_no_case(b"VANISHED"),
        map(opt(tag_no_case(b" (EARLIER)")), |e| e.is_some()),
        sp,
        sequence_set,
    ));

    let (remaining, (_, earlier, _, uids)) = parser(input)?;

    Ok((remaining, Data::Vanished { earlier, uids }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::sequence::SequenceSet;

    #[test]
    fn test_select_parameters() {
        let (_, val) = select_parameters(b"(CONDSTORE)\r\n").unwrap();
        assert_eq!(val, vec![SelectParameter::CondStore]);

        let (_, val) =
            select_parameters(b"(QRESYNC (67890007 20050715194045000 41,43:211))\r\n").unwrap();
        let [SelectParameter::QResync { uid_validity, mod_seq, known_uids, seq_match_data }] =
            val.as_slice()
        else {
            panic!("expected qresync");
        };
        assert_eq!(u32::from(*uid_validity), 67890007);
        assert_eq!(*mod_seq, 20050715194045000);
        assert!(known_uids.is_some());
        assert!(seq_match_data.is_none());
    }

    #[test]
    fn test_fetch_modifiers() {
        let (_, val) = fetch_modifiers(b"(CHANGEDSINCE 12345 VANISHED)\r\n").unwrap();
        assert_eq!(
            val,
            vec![
                FetchModifier::ChangedSince(12345),
                FetchModifier::Vanished,
            ]
        );
    }

    #[test]
    fn test_store_modifiers() {
        let (_, val) = store_modifiers(b"(UNCHANGEDSINCE 320162338)\r\n").unwrap();
        assert_eq!(val, vec![StoreModifier::UnchangedSince(320162338)]);
    }

    #[test]
    fn test_vanished_response() {
        let (_, val) = vanished_response(b"VANISHED (EARLIER) 300:310,405,411\r\n").unwrap();
        let Data::Vanished { earlier: true, uids: SequenceSet::Sequences(s) } = val else {
            panic!("expected vanished earlier");
        };
        assert_eq!(s.len(), 3);

        let (_, val) = vanished_response(b"VANISHED 405\r\n").unwrap();
        assert!(matches!(val, Data::Vanished { earlier: false, .. }));
    }
}
