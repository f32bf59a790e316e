//! Envelope and address types.

use crate::types::core::NString;

/// The envelope structure of a message.
///
/// `envelope = "(" env-date SP env-subject SP env-from SP env-sender SP
///             env-reply-to SP env-to SP env-cc SP env-bcc SP
///             env-in-reply-to SP env-message-id ")"`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Envelope {
    pub date: NString,
    pub subject: NString,
    pub from: Vec<Address>,
    pub sender: Vec<Address>,
    pub reply_to: Vec<Address>,
    pub to: Vec<Address>,
    pub cc: Vec<Address>,
    pub bcc: Vec<Address>,
    pub in_reply_to: NString,
    pub message_id: NString,
}

/// A single address.
///
/// `address = "(" addr-name SP addr-adl SP addr-mailbox SP addr-host ")"`
///
/// Note: [RFC 3501] group syntax is preserved as-is: a group start has a NIL
/// `host` and the group name in `mailbox`; a group end has NIL `mailbox` and
/// `host`.
///
/// [RFC 3501]: https://www.rfc-editor.org/rfc/rfc3501.html#section-7.4.2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Address {
    /// Personal name.
    pub name: NString,
    /// At-domain-list (source route).
    pub adl: NString,
    /// Mailbox name, i.e. the local part.
    pub mailbox: NString,
    /// Host name.
    pub host: NString,
}
