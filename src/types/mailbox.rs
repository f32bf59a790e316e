//! Mailbox-related types.

use crate::types::core::{AString, IString, ValidationError};
use crate::types::indicators::is_list_char;

/// A mailbox name.
///
/// `INBOX` is special-cased: any case variant of it denotes the same mailbox,
/// so it is canonicalised on construction. All other names preserve their
/// bytes verbatim; no UTF-7 translation is performed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Mailbox {
    Inbox,
    Other(MailboxOther),
}

impl Mailbox {
    /// The raw name bytes; `INBOX` for the canonical inbox.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Inbox => b"INBOX",
            Self::Other(other) => other.0.as_bytes(),
        }
    }
}

impl From<AString> for Mailbox {
    fn from(value: AString) -> Self {
        if value.as_bytes().eq_ignore_ascii_case(b"INBOX") {
            Self::Inbox
        } else {
            Self::Other(MailboxOther(value))
        }
    }
}

impl TryFrom<&str> for Mailbox {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        AString::try_from(value).map(Self::from)
    }
}

impl TryFrom<&[u8]> for Mailbox {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        AString::try_from(value).map(Self::from)
    }
}

/// A mailbox name other than `INBOX`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MailboxOther(pub(crate) AString);

impl MailboxOther {
    pub fn inner(&self) -> &AString {
        &self.0
    }
}

/// A run of list chars, i.e. atom chars plus the wildcards `%` and `*`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ListCharString(pub(crate) String);

impl ListCharString {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(ValidationError::Empty);
        }

        if let Some(position) = value.iter().position(|b| !is_list_char(*b)) {
            return Err(ValidationError::ByteNotAllowed {
                found: value[position],
                position,
            });
        }

        Ok(())
    }

    pub(crate) fn unvalidated(inner: impl Into<String>) -> Self {
        let inner = inner.into();

        #[cfg(debug_assertions)]
        Self::verify(&inner).unwrap();

        Self(inner)
    }

    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ListCharString {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::verify(value)?;

        Ok(Self(value.to_owned()))
    }
}

/// A mailbox name or pattern as used by LIST and LSUB.
///
/// `list-mailbox = 1*list-char / string`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ListMailbox {
    Token(ListCharString),
    String(IString),
}

impl ListMailbox {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Token(token) => token.0.as_bytes(),
            Self::String(string) => string.as_bytes(),
        }
    }
}

impl TryFrom<&str> for ListMailbox {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if ListCharString::verify(value).is_ok() {
            return Ok(Self::Token(ListCharString(value.to_owned())));
        }

        IString::try_from(value).map(Self::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_is_case_insensitive() {
        assert_eq!(Mailbox::try_from("inbox").unwrap(), Mailbox::Inbox);
        assert_eq!(Mailbox::try_from("InBoX").unwrap(), Mailbox::Inbox);
        assert_eq!(Mailbox::try_from("INBOX").unwrap(), Mailbox::Inbox);
    }

    #[test]
    fn test_other_mailboxes_preserve_case() {
        let a = Mailbox::try_from("Archive").unwrap();
        let b = Mailbox::try_from("archive").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_bytes(), b"Archive");
    }

    #[test]
    fn test_list_mailbox_wildcards_stay_tokens() {
        assert!(matches!(
            ListMailbox::try_from("folder/%").unwrap(),
            ListMailbox::Token(_)
        ));
        assert!(matches!(
            ListMailbox::try_from("two words").unwrap(),
            ListMailbox::String(_)
        ));
    }
}
