//! Authentication-related types.

use std::fmt;

use crate::types::core::Atom;

/// A SASL mechanism name.
///
/// `auth-type = atom` — well-known mechanisms get their own variant, anything
/// else is preserved as an atom.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AuthMechanism {
    Plain,
    Login,
    OAuthBearer,
    XOAuth2,
    ScramSha1,
    ScramSha256,
    External,
    Other(Atom),
}

impl From<Atom> for AuthMechanism {
    fn from(atom: Atom) -> Self {
        match atom.inner().to_ascii_uppercase().as_str() {
            "PLAIN" => Self::Plain,
            "LOGIN" => Self::Login,
            "OAUTHBEARER" => Self::OAuthBearer,
            "XOAUTH2" => Self::XOAuth2,
            "SCRAM-SHA-1" => Self::ScramSha1,
            "SCRAM-SHA-256" => Self::ScramSha256,
            "EXTERNAL" => Self::External,
            _ => Self::Other(atom),
        }
    }
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("PLAIN"),
            Self::Login => f.write_str("LOGIN"),
            Self::OAuthBearer => f.write_str("OAUTHBEARER"),
            Self::XOAuth2 => f.write_str("XOAUTH2"),
            Self::ScramSha1 => f.write_str("SCRAM-SHA-1"),
            Self::ScramSha256 => f.write_str("SCRAM-SHA-256"),
            Self::External => f.write_str("EXTERNAL"),
            Self::Other(atom) => f.write_str(atom.inner()),
        }
    }
}
