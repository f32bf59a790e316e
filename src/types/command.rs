//! Command-related types.

use std::num::NonZeroU32;

use crate::types::{
    auth::AuthMechanism,
    core::{AString, Atom, Charset, IString, Literal, NString, Tag, Vec1},
    extensions::{
        metadata::{EntryName, EntryValue, GetMetadataOption},
        quota::QuotaSet,
        urlauth::{RumpUrl, UrlAuthMechanism},
    },
    fetch::MacroOrMessageDataItemNames,
    flag::{Flag, StoreResponse, StoreType},
    mailbox::{ListMailbox, Mailbox},
    response::Capability,
    search::{SearchKey, SearchReturnOption},
    sequence::SequenceSet,
    status::StatusDataItemName,
};

/// A complete tagged command.
///
/// `command = tag SP command-body CRLF`
///
/// `APPEND` is not representable here (except for the CATENATE form): message
/// ingress is streamed through [`crate::stream::CommandStreamPart`] instead of
/// being buffered into a single value.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Command {
    pub tag: Tag,
    pub body: CommandBody,
}

impl Command {
    pub fn new(
        tag: impl TryInto<Tag, Error = crate::types::core::ValidationError>,
        body: CommandBody,
    ) -> Result<Self, crate::types::core::ValidationError> {
        Ok(Self {
            tag: tag.try_into()?,
            body,
        })
    }
}

/// The body of a command.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CommandBody {
    // ----- Any state -----
    Capability,
    Noop,
    Logout,
    /// `ID` (RFC 2971).
    Id {
        parameters: Option<Vec<(IString, NString)>>,
    },

    // ----- Not authenticated -----
    Login {
        username: AString,
        password: AString,
    },
    Authenticate {
        mechanism: AuthMechanism,
        /// SASL-IR initial response (RFC 4959), already base64-decoded.
        initial_response: Option<Vec<u8>>,
    },

    // ----- Authenticated -----
    Select {
        mailbox: Mailbox,
        parameters: Vec<SelectParameter>,
    },
    Examine {
        mailbox: Mailbox,
        parameters: Vec<SelectParameter>,
    },
    Create {
        mailbox: Mailbox,
        parameters: Vec<CreateParameter>,
    },
    Delete {
        mailbox: Mailbox,
    },
    Rename {
        from: Mailbox,
        to: Mailbox,
        /// RFC 4466 extension parameters; no supported extension defines
        /// any, so they are preserved as bare atoms.
        parameters: Vec<Atom>,
    },
    Subscribe {
        mailbox: Mailbox,
    },
    Unsubscribe {
        mailbox: Mailbox,
    },
    /// `LIST`, including the LIST-EXTENDED form (RFC 5258).
    List {
        selection_options: Vec<ListSelectOption>,
        reference: Mailbox,
        patterns: Vec1<ListMailbox>,
        return_options: Vec<ListReturnOption>,
    },
    Lsub {
        reference: Mailbox,
        pattern: ListMailbox,
    },
    Status {
        mailbox: Mailbox,
        attributes: Vec<StatusDataItemName>,
    },
    /// `IDLE` (RFC 2177). Terminated by `DONE`, which surfaces as
    /// [`crate::stream::CommandStreamPart::IdleDone`].
    Idle,
    Enable {
        capabilities: Vec1<Capability>,
    },
    /// `NAMESPACE` (RFC 2342).
    Namespace,
    /// `GETQUOTA` (RFC 9208).
    GetQuota {
        root: AString,
    },
    GetQuotaRoot {
        mailbox: Mailbox,
    },
    SetQuota {
        root: AString,
        quotas: Vec<QuotaSet>,
    },
    /// `GETMETADATA` (RFC 5464).
    GetMetadata {
        options: Vec<GetMetadataOption>,
        mailbox: Mailbox,
        entries: Vec1<EntryName>,
    },
    SetMetadata {
        mailbox: Mailbox,
        entry_values: Vec1<EntryValue>,
    },
    /// `RESETKEY` (RFC 4467).
    ResetKey {
        mailbox: Option<Mailbox>,
        mechanisms: Vec<UrlAuthMechanism>,
    },
    /// `GENURLAUTH` (RFC 4467).
    GenUrlAuth {
        rumps: Vec1<(RumpUrl, UrlAuthMechanism)>,
    },
    /// `URLFETCH` (RFC 4467). URLs are preserved verbatim.
    UrlFetch {
        urls: Vec1<AString>,
    },

    // ----- Selected -----
    Check,
    Close,
    Unselect,
    Expunge,
    /// `UID EXPUNGE` (RFC 4315).
    ExpungeUid {
        sequence_set: SequenceSet,
    },
    Search {
        charset: Option<Charset>,
        criteria: SearchKey,
        return_options: Vec<SearchReturnOption>,
        uid: bool,
    },
    Fetch {
        sequence_set: SequenceSet,
        macro_or_item_names: MacroOrMessageDataItemNames,
        modifiers: Vec<FetchModifier>,
        uid: bool,
    },
    Store {
        sequence_set: SequenceSet,
        kind: StoreType,
        response: StoreResponse,
        flags: Vec<Flag>,
        modifiers: Vec<StoreModifier>,
        uid: bool,
    },
    Copy {
        sequence_set: SequenceSet,
        mailbox: Mailbox,
        uid: bool,
    },
    /// `MOVE` (RFC 6851).
    Move {
        sequence_set: SequenceSet,
        mailbox: Mailbox,
        uid: bool,
    },
}

impl CommandBody {
    pub fn login(
        username: &str,
        password: &str,
    ) -> Result<Self, crate::types::core::ValidationError> {
        Ok(Self::Login {
            username: AString::try_from(username)?,
            password: AString::try_from(password)?,
        })
    }

    pub fn select(mailbox: &str) -> Result<Self, crate::types::core::ValidationError> {
        Ok(Self::Select {
            mailbox: Mailbox::try_from(mailbox)?,
            parameters: Vec::new(),
        })
    }

    pub fn tagged(
        self,
        tag: &str,
    ) -> Result<Command, crate::types::core::ValidationError> {
        Command::new(tag, self)
    }
}

/// A SELECT/EXAMINE parameter (RFC 4466 syntax; CONDSTORE and QRESYNC are
/// understood, everything else is preserved generically).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SelectParameter {
    /// `CONDSTORE` (RFC 7162).
    CondStore,
    /// `QRESYNC (uidvalidity modseq [known-uids [seq-match-data]])`
    /// (RFC 7162).
    QResync {
        uid_validity: NonZeroU32,
        mod_seq: u64,
        known_uids: Option<SequenceSet>,
        seq_match_data: Option<(SequenceSet, SequenceSet)>,
    },
    Other(Atom),
}

/// A CREATE parameter.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CreateParameter {
    /// `USE (...)` (RFC 6154).
    Use(Vec<crate::types::flag::FlagNameAttribute>),
    Other(Atom),
}

/// A LIST selection option (RFC 5258 / RFC 6154).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ListSelectOption {
    Subscribed,
    Remote,
    RecursiveMatch,
    SpecialUse,
    Other(Atom),
}

/// A LIST return option (RFC 5258 / RFC 5819 / RFC 6154).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ListReturnOption {
    Subscribed,
    Children,
    SpecialUse,
    /// `STATUS (...)` (RFC 5819).
    Status(Vec<StatusDataItemName>),
    Other(Atom),
}

/// A FETCH modifier (RFC 7162).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FetchModifier {
    /// `CHANGEDSINCE <mod-sequence>`
    ChangedSince(u64),
    /// `VANISHED` (only valid for UID FETCH with CHANGEDSINCE).
    Vanished,
}

/// A STORE modifier (RFC 7162).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreModifier {
    /// `UNCHANGEDSINCE <mod-sequence>`
    UnchangedSince(u64),
}

/// Per-message options of an APPEND.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AppendOptions {
    pub flags: Vec<Flag>,
    pub internal_date: Option<crate::types::datetime::DateTime>,
}

/// How the octets of an appended message arrive.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AppendMessageData {
    /// A literal of `byte_count` octets that is streamed in chunks.
    Literal { byte_count: u32, binary: bool },
    /// A fully parsed `CATENATE (...)` part list (RFC 4469).
    Catenate(Vec1<CatenatePart>),
}

/// One message of a (MULTIAPPEND-capable) APPEND.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AppendMessage {
    pub options: AppendOptions,
    pub data: AppendMessageData,
}

/// One part of a CATENATE message (RFC 4469).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CatenatePart {
    /// `URL <astring>` — an IMAP URL referencing existing message data.
    Url(AString),
    /// `TEXT <literal>` — inline message data.
    Text(Literal),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new() {
        let cmd = Command::new("A1", CommandBody::Noop).unwrap();
        assert_eq!(cmd.tag.inner(), "A1");

        assert!(Command::new("", CommandBody::Noop).is_err());
        assert!(Command::new("A+", CommandBody::Noop).is_err());
    }

    #[test]
    fn test_login_constructor() {
        assert!(CommandBody::login("alice", "password").is_ok());
        assert!(CommandBody::login("alice", "pass word").is_ok());
    }
}
