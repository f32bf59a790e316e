//! Flag-related types.

use std::fmt;

use crate::types::core::Atom;

/// A message flag.
///
/// `flag = "\Answered" / "\Flagged" / "\Deleted" / "\Seen" / "\Draft" /
///         flag-keyword / flag-extension`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Flag {
    Answered,
    Deleted,
    Draft,
    Flagged,
    Seen,
    /// Keyword without leading backslash.
    Keyword(Atom),
    /// Extension flag with leading backslash.
    Extension(Atom),
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Answered => f.write_str("\\Answered"),
            Self::Deleted => f.write_str("\\Deleted"),
            Self::Draft => f.write_str("\\Draft"),
            Self::Flagged => f.write_str("\\Flagged"),
            Self::Seen => f.write_str("\\Seen"),
            Self::Keyword(atom) => f.write_str(atom.inner()),
            Self::Extension(atom) => write!(f, "\\{}", atom.inner()),
        }
    }
}

/// A flag in a FETCH FLAGS item; additionally allows `\Recent`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FlagFetch {
    Flag(Flag),
    Recent,
}

impl fmt::Display for FlagFetch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Flag(flag) => flag.fmt(f),
            Self::Recent => f.write_str("\\Recent"),
        }
    }
}

/// A flag in a PERMANENTFLAGS code; additionally allows `\*`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FlagPerm {
    Flag(Flag),
    Asterisk,
}

impl fmt::Display for FlagPerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Flag(flag) => flag.fmt(f),
            Self::Asterisk => f.write_str("\\*"),
        }
    }
}

/// A mailbox name attribute of a LIST/LSUB response.
///
/// `mbx-list-flags` of RFC 3501 plus the SPECIAL-USE attributes of RFC 6154.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FlagNameAttribute {
    Noinferiors,
    Noselect,
    Marked,
    Unmarked,
    // RFC 6154
    All,
    Archive,
    Drafts,
    Flagged,
    Junk,
    Sent,
    Trash,
    Extension(Atom),
}

impl From<Atom> for FlagNameAttribute {
    fn from(atom: Atom) -> Self {
        match atom.inner().to_ascii_lowercase().as_str() {
            "noinferiors" => Self::Noinferiors,
            "noselect" => Self::Noselect,
            "marked" => Self::Marked,
            "unmarked" => Self::Unmarked,
            "all" => Self::All,
            "archive" => Self::Archive,
            "drafts" => Self::Drafts,
            "flagged" => Self::Flagged,
            "junk" => Self::Junk,
            "sent" => Self::Sent,
            "trash" => Self::Trash,
            _ => Self::Extension(atom),
        }
    }
}

impl fmt::Display for FlagNameAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Noinferiors => f.write_str("\\Noinferiors"),
            Self::Noselect => f.write_str("\\Noselect"),
            Self::Marked => f.write_str("\\Marked"),
            Self::Unmarked => f.write_str("\\Unmarked"),
            Self::All => f.write_str("\\All"),
            Self::Archive => f.write_str("\\Archive"),
            Self::Drafts => f.write_str("\\Drafts"),
            Self::Flagged => f.write_str("\\Flagged"),
            Self::Junk => f.write_str("\\Junk"),
            Self::Sent => f.write_str("\\Sent"),
            Self::Trash => f.write_str("\\Trash"),
            Self::Extension(atom) => write!(f, "\\{}", atom.inner()),
        }
    }
}

/// How a STORE modifies the flag set.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreType {
    /// `FLAGS` — replace the flags.
    Replace,
    /// `+FLAGS` — add the flags.
    Add,
    /// `-FLAGS` — remove the flags.
    Remove,
}

/// Whether the server answers a STORE with an untagged FETCH.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StoreResponse {
    Answer,
    /// `.SILENT`
    Silent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_display() {
        assert_eq!(Flag::Seen.to_string(), "\\Seen");
        assert_eq!(
            Flag::Keyword(Atom::try_from("$Forwarded").unwrap()).to_string(),
            "$Forwarded"
        );
        assert_eq!(
            Flag::Extension(Atom::try_from("Custom").unwrap()).to_string(),
            "\\Custom"
        );
    }

    #[test]
    fn test_special_use_from_atom() {
        assert_eq!(
            FlagNameAttribute::from(Atom::try_from("Drafts").unwrap()),
            FlagNameAttribute::Drafts
        );
        assert_eq!(
            FlagNameAttribute::from(Atom::try_from("NoSelect").unwrap()),
            FlagNameAttribute::Noselect
        );
        assert!(matches!(
            FlagNameAttribute::from(Atom::try_from("HasChildren").unwrap()),
            FlagNameAttribute::Extension(_)
        ));
    }
}
