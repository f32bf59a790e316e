//! Envelope and address parsers.

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::tag,
    combinator::map,
    multi::many1,
    sequence::{delimited, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{nil, nstring},
    },
    types::envelope::{Address, Envelope},
};

/// `envelope = "(" env-date SP env-subject SP env-from SP env-sender SP
///             env-reply-to SP env-to SP env-cc SP env-bcc SP
///             env-in-reply-to SP env-message-id ")"`
pub(crate) fn envelope(input: &[u8]) -> ImapResult<'_, Envelope> {
    let mut parser = delimited(
        tag(b"("),
        tuple((
            nstring, // env-date
            sp,
            nstring, // env-subject
            sp,
            env_address_list, // env-from
            sp,
            env_address_list, // env-sender
            sp,
            env_address_list, // env-reply-to
            sp,
            env_address_list, // env-to
            sp,
            env_address_list, // env-cc
            sp,
            env_address_list, // env-bcc
            sp,
            nstring, // env-in-reply-to
            sp,
            nstring, // env-message-id
        )),
        tag(b")"),
    );

    let (
        remaining,
        (
            date,
            _,
            subject,
            _,
            from,
            _,
            sender,
            _,
            reply_to,
            _,
            to,
            _,
            cc,
            _,
            bcc,
            _,
            in_reply_to,
            _,
            message_id,
        ),
    ) = parser(input)?;

    Ok((
        remaining,
        Envelope {
            date,
            subject,
            from,
            sender,
            reply_to,
            to,
            cc,
            bcc,
            in_reply_to,
            message_id,
        },
    ))
}

/// `env-from / env-sender / ... = "(" 1*address ")" / nil`
fn env_address_list(input: &[u8]) -> ImapResult<'_, Vec<Address>> {
    alt((
        delimited(tag(b"("), many1(address), tag(b")")),
        map(nil, |_| Vec::new()),
    ))(input)
}

/// `address = "(" addr-name SP addr-adl SP addr-mailbox SP addr-host ")"`
pub(crate) fn address(input: &[u8]) -> ImapResult<'_, Address> {
    let mut parser = delimited(
        tag(b"("),
        tuple((nstring, sp, nstring, sp, nstring, sp, nstring)),
        tag(b")"),
    );

    let (remaining, (name, _, adl, _, mailbox, _, host)) = parser(input)?;

    Ok((
        remaining,
        Address {
            name,
            adl,
            mailbox,
            host,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::core::NString;

    #[test]
    fn test_address() {
        let (rem, val) =
            address(b"(NIL NIL \"alice\" \"example.org\")?").unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(val.name, NString(None));
        assert_eq!(val.mailbox.as_bytes().unwrap(), b"alice");
    }

    #[test]
    fn test_envelope_all_nil() {
        let (rem, val) =
            envelope(b"(NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL)?").unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(val.from, vec![]);
        assert_eq!(val.subject, NString(None));
    }

    #[test]
    fn test_envelope_with_addresses() {
        let input = b"(\"date\" \"subject\" ((NIL NIL \"a\" \"b\")) NIL NIL NIL NIL NIL NIL \"<id>\")?";
        let (rem, val) = envelope(input).unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(val.from.len(), 1);
        assert_eq!(val.message_id.as_bytes().unwrap(), b"<id>");
    }
}
