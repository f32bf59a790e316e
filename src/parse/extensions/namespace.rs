//! NAMESPACE parsers (RFC 2342).

use abnf_core::streaming::{dquote, sp};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, value},
    multi::many1,
    sequence::{delimited, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{nil, quoted_char, string},
    },
    types::response::{Data, NamespaceDescr},
};

/// `Namespace-Response = "NAMESPACE" SP Namespace SP Namespace SP Namespace`
pub(crate) fn namespace_response(input: &[u8]) -> ImapResult<'_, Data> {
    let mut parser = tuple((
        tag_no_case(b"NAMESPACE"),
        sp,
        namespace,
        sp,
        namespace,
        sp,
        namespace,
    ));

    let (remaining, (_, _, personal, _, other_users, _, shared)) = parser(input)?;

    Ok((
        remaining,
        Data::Namespace {
            personal,
            other_users,
            shared,
        },
    ))
}

/// `Namespace = nil / "(" 1*Namespace-Descr ")"`
fn namespace(input: &[u8]) -> ImapResult<'_, Vec<NamespaceDescr>> {
    alt((
        map(nil, |_| Vec::new()),
        delimited(tag(b"("), many1(namespace_descr), tag(b")")),
    ))(input)
}

/// `Namespace-Descr = "(" string SP (DQUOTE QUOTED-CHAR DQUOTE / nil) ")"`
///
/// Namespace response extensions are not modelled and therefore rejected.
fn namespace_descr(input: &[u8]) -> ImapResult<'_, NamespaceDescr> {
    let mut parser = delimited(
        tag(b"("),
        tuple((
            string,
            sp,
            alt((
                map(delimited(dquote, quoted_char, dquote), Some),
                value(None, nil),
            )),
        )),
        tag(b")"),
    );

    let (remaining, (prefix, _, delimiter)) = parser(input)?;

    Ok((remaining, NamespaceDescr { prefix, delimiter }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_response() {
        let (_, val) =
            namespace_response(b"NAMESPACE ((\"\" \"/\")) NIL NIL\r\n").unwrap();
        let Data::Namespace { personal, other_users, shared } = val else {
            panic!("expected namespace");
        };
        assert_eq!(personal.len(), 1);
        assert_eq!(personal[0].delimiter.unwrap().inner(), '/');
        assert!(other_users.is_empty());
        assert!(shared.is_empty());
    }
}
