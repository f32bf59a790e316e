//! ID parsers (RFC 2971).

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, value},
    multi::separated_list0,
    sequence::{delimited, preceded, separated_pair},
};

use crate::{
    parse::{
        ImapResult,
        core::{nil, nstring, string},
    },
    types::core::{IString, NString},
};

/// `id = "ID" SP id-params-list`
///
/// `id-params-list = "(" [string SP nstring *(SP string SP nstring)] ")" /
///                   nil`
pub(crate) fn id(input: &[u8]) -> ImapResult<'_, Option<Vec<(IString, NString)>>> {
    preceded(tag_no_case(b"ID "), id_params_list)(input)
}

/// `id-response = "ID" SP id-params-list`
pub(crate) fn id_response(input: &[u8]) -> ImapResult<'_, Option<Vec<(IString, NString)>>> {
    id(input)
}

pub(crate) fn id_params_list(
    input: &[u8],
) -> ImapResult<'_, Option<Vec<(IString, NString)>>> {
    alt((
        map(
            delimited(
                tag(b"("),
                separated_list0(sp, separated_pair(string, sp, nstring)),
                tag(b")"),
            ),
            Some,
        ),
        value(None, nil),
    ))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id() {
        let (_, val) = id(b"ID (\"name\" \"sodr\" \"version\" \"19.34\")\r\n").unwrap();
        let params = val.unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].0.as_bytes(), b"name");

        let (_, val) = id(b"ID NIL\r\n").unwrap();
        assert_eq!(val, None);

        let (_, val) = id(b"ID ()\r\n").unwrap();
        assert_eq!(val, Some(vec![]));
    }
}
