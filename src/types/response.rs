//! Response-related types.

use std::{fmt, num::NonZeroU32};

use crate::types::{
    auth::AuthMechanism,
    core::{AString, Atom, Charset, IString, NString, QuotedChar, Tag, Text, ValidationError, Vec1},
    extensions::{
        metadata::{MetadataCode, MetadataResponse},
        quota::QuotaGet,
        urlauth::UrlAuthMechanism,
    },
    flag::{Flag, FlagNameAttribute, FlagPerm},
    mailbox::Mailbox,
    search::SearchReturnData,
    sequence::SequenceSet,
    status::StatusDataItem,
};

/// The first message a server sends on a fresh connection.
///
/// `greeting = "*" SP (resp-cond-auth / resp-cond-bye) CRLF`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Greeting {
    pub kind: GreetingKind,
    pub code: Option<Code>,
    pub text: Text,
}

impl Greeting {
    pub fn ok(code: Option<Code>, text: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            kind: GreetingKind::Ok,
            code,
            text: Text::try_from(text)?,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GreetingKind {
    /// The connection starts in the not-authenticated state.
    Ok,
    /// The connection starts in the authenticated state.
    PreAuth,
    /// The server is not willing to accept a connection.
    Bye,
}

/// A capability advertised in a CAPABILITY response or code.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    Imap4Rev1,
    Auth(AuthMechanism),
    LoginDisabled,
    /// RFC 7888
    LiteralPlus,
    /// RFC 7888
    LiteralMinus,
    /// RFC 3516
    Binary,
    /// RFC 7162
    CondStore,
    /// RFC 7162
    QResync,
    /// RFC 5161
    Enable,
    /// RFC 2177
    Idle,
    /// RFC 6851
    Move,
    /// RFC 4959
    SaslIr,
    /// RFC 4467
    UrlAuth,
    /// RFC 2971
    Id,
    /// RFC 2342
    Namespace,
    /// RFC 5464
    Metadata,
    /// RFC 9208
    Quota,
    /// RFC 4731
    ESearch,
    /// RFC 5182
    SearchRes,
    /// RFC 5258
    ListExtended,
    /// RFC 5819
    ListStatus,
    /// RFC 6154
    SpecialUse,
    /// RFC 4315
    UidPlus,
    /// RFC 4469
    Catenate,
    /// RFC 3502
    MultiAppend,
    /// Gmail extensions marker.
    GmailExt1,
    Other(Atom),
}

impl From<Atom> for Capability {
    fn from(atom: Atom) -> Self {
        let inner = atom.inner().to_ascii_uppercase();

        if let Some(mechanism) = inner.strip_prefix("AUTH=") {
            return match Atom::try_from(mechanism) {
                Ok(mechanism) => Self::Auth(AuthMechanism::from(mechanism)),
                Err(_) => Self::Other(atom),
            };
        }

        match inner.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "LOGINDISABLED" => Self::LoginDisabled,
            "LITERAL+" => Self::LiteralPlus,
            "LITERAL-" => Self::LiteralMinus,
            "BINARY" => Self::Binary,
            "CONDSTORE" => Self::CondStore,
            "QRESYNC" => Self::QResync,
            "ENABLE" => Self::Enable,
            "IDLE" => Self::Idle,
            "MOVE" => Self::Move,
            "SASL-IR" => Self::SaslIr,
            "URLAUTH" => Self::UrlAuth,
            "ID" => Self::Id,
            "NAMESPACE" => Self::Namespace,
            "METADATA" => Self::Metadata,
            "QUOTA" => Self::Quota,
            "ESEARCH" => Self::ESearch,
            "SEARCHRES" => Self::SearchRes,
            "LIST-EXTENDED" => Self::ListExtended,
            "LIST-STATUS" => Self::ListStatus,
            "SPECIAL-USE" => Self::SpecialUse,
            "UIDPLUS" => Self::UidPlus,
            "CATENATE" => Self::Catenate,
            "MULTIAPPEND" => Self::MultiAppend,
            "X-GM-EXT-1" => Self::GmailExt1,
            _ => Self::Other(atom),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Imap4Rev1 => f.write_str("IMAP4rev1"),
            Self::Auth(mechanism) => write!(f, "AUTH={mechanism}"),
            Self::LoginDisabled => f.write_str("LOGINDISABLED"),
            Self::LiteralPlus => f.write_str("LITERAL+"),
            Self::LiteralMinus => f.write_str("LITERAL-"),
            Self::Binary => f.write_str("BINARY"),
            Self::CondStore => f.write_str("CONDSTORE"),
            Self::QResync => f.write_str("QRESYNC"),
            Self::Enable => f.write_str("ENABLE"),
            Self::Idle => f.write_str("IDLE"),
            Self::Move => f.write_str("MOVE"),
            Self::SaslIr => f.write_str("SASL-IR"),
            Self::UrlAuth => f.write_str("URLAUTH"),
            Self::Id => f.write_str("ID"),
            Self::Namespace => f.write_str("NAMESPACE"),
            Self::Metadata => f.write_str("METADATA"),
            Self::Quota => f.write_str("QUOTA"),
            Self::ESearch => f.write_str("ESEARCH"),
            Self::SearchRes => f.write_str("SEARCHRES"),
            Self::ListExtended => f.write_str("LIST-EXTENDED"),
            Self::ListStatus => f.write_str("LIST-STATUS"),
            Self::SpecialUse => f.write_str("SPECIAL-USE"),
            Self::UidPlus => f.write_str("UIDPLUS"),
            Self::Catenate => f.write_str("CATENATE"),
            Self::MultiAppend => f.write_str("MULTIAPPEND"),
            Self::GmailExt1 => f.write_str("X-GM-EXT-1"),
            Self::Other(atom) => f.write_str(atom.inner()),
        }
    }
}

/// A response code inside `[` ... `]`.
///
/// `resp-text-code`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Code {
    Alert,
    BadCharset {
        allowed: Vec<Charset>,
    },
    Capability(Vec1<Capability>),
    Parse,
    PermanentFlags(Vec<FlagPerm>),
    ReadOnly,
    ReadWrite,
    TryCreate,
    UidNext(NonZeroU32),
    UidValidity(NonZeroU32),
    Unseen(NonZeroU32),
    /// `APPENDUID` (RFC 4315).
    AppendUid {
        uid_validity: NonZeroU32,
        uid: NonZeroU32,
    },
    /// `COPYUID` (RFC 4315).
    CopyUid {
        uid_validity: NonZeroU32,
        source: SequenceSet,
        destination: SequenceSet,
    },
    /// RFC 4315
    UidNotSticky,
    /// RFC 7162
    HighestModSeq(u64),
    /// RFC 7162
    NoModSeq,
    /// RFC 7162
    Modified(SequenceSet),
    /// RFC 7162
    Closed,
    /// RFC 4469
    TooBig,
    /// RFC 3516
    UnknownCte,
    /// RFC 4467
    UrlMech(Vec<UrlAuthMechanism>),
    /// RFC 5464
    Metadata(MetadataCode),
    /// An unknown code, kept verbatim.
    Other(CodeOther),
}

/// The raw bytes of an unknown response code.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CodeOther(pub(crate) Vec<u8>);

impl CodeOther {
    pub(crate) fn unvalidated(inner: impl Into<Vec<u8>>) -> Self {
        Self(inner.into())
    }

    pub fn inner(&self) -> &[u8] {
        &self.0
    }
}

/// The condition of a status response.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StatusKind {
    Ok,
    No,
    Bad,
}

/// `resp-cond-state = ("OK" / "NO" / "BAD") SP resp-text`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct StatusBody {
    pub kind: StatusKind,
    pub code: Option<Code>,
    pub text: Text,
}

/// A tagged status response completing a command.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tagged {
    pub tag: Tag,
    pub body: StatusBody,
}

impl Tagged {
    pub fn ok(tag: Tag, code: Option<Code>, text: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            tag,
            body: StatusBody {
                kind: StatusKind::Ok,
                code,
                text: Text::try_from(text)?,
            },
        })
    }
}

/// An untagged `BYE`, fatal for the connection.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Bye {
    pub code: Option<Code>,
    pub text: Text,
}

/// A namespace description of a NAMESPACE response (RFC 2342).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NamespaceDescr {
    pub prefix: IString,
    pub delimiter: Option<QuotedChar>,
}

/// An untagged data response.
///
/// `response-data` payloads (except FETCH, which is streamed as a
/// [`crate::stream::FetchEvent`] sub-stream).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Data {
    Capability(Vec1<Capability>),
    List {
        items: Vec<FlagNameAttribute>,
        delimiter: Option<QuotedChar>,
        mailbox: Mailbox,
    },
    Lsub {
        items: Vec<FlagNameAttribute>,
        delimiter: Option<QuotedChar>,
        mailbox: Mailbox,
    },
    Status {
        mailbox: Mailbox,
        items: Vec<StatusDataItem>,
    },
    Search(Vec<NonZeroU32>),
    /// `ESEARCH` (RFC 4731).
    ESearch {
        correlator: Option<Tag>,
        uid: bool,
        items: Vec<SearchReturnData>,
    },
    Flags(Vec<Flag>),
    Exists(u32),
    Recent(u32),
    Expunge(NonZeroU32),
    /// `VANISHED [(EARLIER)]` (RFC 7162).
    Vanished {
        earlier: bool,
        uids: SequenceSet,
    },
    /// RFC 2342
    Namespace {
        personal: Vec<NamespaceDescr>,
        other_users: Vec<NamespaceDescr>,
        shared: Vec<NamespaceDescr>,
    },
    /// RFC 9208
    Quota {
        root: AString,
        quotas: Vec1<QuotaGet>,
    },
    /// RFC 9208
    QuotaRoot {
        mailbox: Mailbox,
        roots: Vec<AString>,
    },
    /// RFC 5464
    Metadata {
        mailbox: Mailbox,
        value: MetadataResponse,
    },
    /// RFC 5161
    Enabled {
        capabilities: Vec<Capability>,
    },
    /// RFC 2971
    Id {
        parameters: Option<Vec<(IString, NString)>>,
    },
    /// RFC 4467
    UrlFetch(Vec1<(AString, NString)>),
    /// An untagged `OK`/`NO`/`BAD` status.
    Condition(StatusBody),
}

/// A continuation request (`+ ...`).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ContinuationRequest {
    Basic { code: Option<Code>, text: Text },
    Base64(Vec<u8>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_from_atom() {
        assert_eq!(
            Capability::from(Atom::try_from("imap4rev1").unwrap()),
            Capability::Imap4Rev1
        );
        assert_eq!(
            Capability::from(Atom::try_from("LITERAL+").unwrap()),
            Capability::LiteralPlus
        );
        assert_eq!(
            Capability::from(Atom::try_from("AUTH=PLAIN").unwrap()),
            Capability::Auth(AuthMechanism::Plain)
        );
        assert!(matches!(
            Capability::from(Atom::try_from("XYZZY").unwrap()),
            Capability::Other(_)
        ));
    }

    #[test]
    fn test_capability_roundtrips_through_display() {
        for name in ["LITERAL+", "CONDSTORE", "X-GM-EXT-1", "AUTH=XOAUTH2"] {
            let capability = Capability::from(Atom::try_from(name).unwrap());
            assert_eq!(capability.to_string(), name);
        }
    }
}
