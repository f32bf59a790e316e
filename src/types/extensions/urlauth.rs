//! IMAP URL and URLAUTH types (RFC 5092, RFC 4467, RFC 5524, RFC 5593).
//!
//! Percent-encoded path components stay opaque: the character classes of
//! RFC 3986 are validated on construction, but nothing is percent-decoded.

use std::{fmt, num::NonZeroU32};

use crate::types::core::{Atom, ValidationError};
use crate::types::indicators::{is_hex_digit, is_sub_delims_sh, is_unreserved};

fn verify_pct_encoded(
    value: &[u8],
    extra: impl Fn(u8) -> bool,
) -> Result<(), ValidationError> {
    let mut position = 0;

    while position < value.len() {
        let byte = value[position];

        if byte == b'%' {
            let ok = value.len() >= position + 3
                && is_hex_digit(value[position + 1])
                && is_hex_digit(value[position + 2]);
            if !ok {
                return Err(ValidationError::ByteNotAllowed {
                    found: byte,
                    position,
                });
            }
            position += 3;
        } else if is_unreserved(byte) || is_sub_delims_sh(byte) || extra(byte) {
            position += 1;
        } else {
            return Err(ValidationError::ByteNotAllowed {
                found: byte,
                position,
            });
        }
    }

    Ok(())
}

macro_rules! encoded_newtype {
    ($(#[$meta:meta])* $name:ident, $extra:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $name(pub(crate) String);

        impl $name {
            pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
                verify_pct_encoded(value.as_ref(), $extra)
            }

            pub fn inner(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::verify(value)?;

                Ok(Self(value.to_owned()))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

encoded_newtype!(
    /// `enc-user = 1*achar`
    EncodedUser,
    |b| b == b'&' || b == b'='
);
encoded_newtype!(
    /// `enc-mailbox = 1*bchar`
    EncodedMailbox,
    |b| matches!(b, b'&' | b'=' | b':' | b'@' | b'/')
);
encoded_newtype!(
    /// `enc-search = 1*bchar`
    EncodedSearch,
    |b| matches!(b, b'&' | b'=' | b':' | b'@' | b'/')
);
encoded_newtype!(
    /// `enc-section = 1*bchar`
    EncodedSection,
    |b| matches!(b, b'&' | b'=' | b':' | b'@' | b'/')
);

/// A URLAUTH token: `32*HEXDIG` after the mechanism name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct EncodedUrlAuth(pub(crate) String);

impl EncodedUrlAuth {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        let value = value.as_ref();

        if value.len() < 32 {
            return Err(ValidationError::Empty);
        }

        if let Some(position) = value.iter().position(|b| !is_hex_digit(*b)) {
            return Err(ValidationError::ByteNotAllowed {
                found: value[position],
                position,
            });
        }

        Ok(())
    }

    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for EncodedUrlAuth {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::verify(value)?;

        Ok(Self(value.to_owned()))
    }
}

/// A URLAUTH authorization mechanism.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum UrlAuthMechanism {
    Internal,
    Other(Atom),
}

impl From<Atom> for UrlAuthMechanism {
    fn from(atom: Atom) -> Self {
        if atom.inner().eq_ignore_ascii_case("INTERNAL") {
            Self::Internal
        } else {
            Self::Other(atom)
        }
    }
}

impl fmt::Display for UrlAuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Internal => f.write_str("INTERNAL"),
            Self::Other(atom) => f.write_str(atom.inner()),
        }
    }
}

/// `iserver = [iuserinfo "@"] host [":" port]`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UrlServer {
    pub user: Option<UserInfo>,
    pub host: String,
    pub port: Option<u16>,
}

/// `iuserinfo = enc-user [iauth] / [enc-user] iauth`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UserInfo {
    pub user: Option<EncodedUser>,
    pub auth: Option<UrlAuth>,
}

/// `iauth = ";AUTH=" ( "*" / enc-auth-type )`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum UrlAuth {
    Any,
    Type(EncodedUser),
}

/// `ipartial = ";PARTIAL=" partial-range` with
/// `partial-range = number ["." nz-number]`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IPartial {
    pub offset: u32,
    pub length: Option<NonZeroU32>,
}

/// `imessagepart`: mailbox, optional UIDVALIDITY, UID, optional section and
/// partial range.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IMessagePart {
    pub mailbox: EncodedMailbox,
    pub uid_validity: Option<NonZeroU32>,
    pub uid: NonZeroU32,
    pub section: Option<EncodedSection>,
    pub partial: Option<IPartial>,
}

/// `access` of RFC 4467.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum UrlAccess {
    /// `submit+<user>`
    Submit(EncodedUser),
    /// `user+<user>`
    User(EncodedUser),
    AuthUser,
    Anonymous,
}

/// The authorization rump: optional expiry plus the access specifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IUrlAuthRump {
    /// `;EXPIRE=` timestamp, kept verbatim.
    pub expire: Option<String>,
    pub access: UrlAccess,
}

/// `iua-verifier = ":" uauth-mechanism ":" enc-urlauth`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IUaVerifier {
    pub mechanism: UrlAuthMechanism,
    pub token: EncodedUrlAuth,
}

/// A full URLAUTH suffix: rump plus verifier.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct IUrlAuth {
    pub rump: IUrlAuthRump,
    pub verifier: IUaVerifier,
}

/// An `imap://` URL as used by URLFETCH.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ImapUrl {
    pub server: UrlServer,
    pub part: IMessagePart,
    pub urlauth: Option<IUrlAuth>,
}

/// A rump URL as passed to GENURLAUTH: no verifier yet.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RumpUrl {
    pub server: UrlServer,
    pub part: IMessagePart,
    pub rump: IUrlAuthRump,
}
