//! QUOTA types (RFC 9208).

use std::fmt;

use crate::types::core::Atom;

/// A quota resource name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Resource {
    Storage,
    Message,
    Mailbox,
    AnnotationStorage,
    Other(Atom),
}

impl From<Atom> for Resource {
    fn from(atom: Atom) -> Self {
        match atom.inner().to_ascii_lowercase().as_str() {
            "storage" => Self::Storage,
            "message" => Self::Message,
            "mailbox" => Self::Mailbox,
            "annotation-storage" => Self::AnnotationStorage,
            _ => Self::Other(atom),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Storage => f.write_str("STORAGE"),
            Self::Message => f.write_str("MESSAGE"),
            Self::Mailbox => f.write_str("MAILBOX"),
            Self::AnnotationStorage => f.write_str("ANNOTATION-STORAGE"),
            Self::Other(atom) => f.write_str(atom.inner()),
        }
    }
}

/// A resource usage/limit pair of a QUOTA response.
///
/// `quota-resource = resource-name SP resource-usage SP resource-limit`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QuotaGet {
    pub resource: Resource,
    pub usage: u64,
    pub limit: u64,
}

/// A resource limit of a SETQUOTA command.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QuotaSet {
    pub resource: Resource,
    pub limit: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_from_atom() {
        assert_eq!(
            Resource::from(Atom::try_from("storage").unwrap()),
            Resource::Storage
        );
        assert!(matches!(
            Resource::from(Atom::try_from("X-CUSTOM").unwrap()),
            Resource::Other(_)
        ));
    }
}
