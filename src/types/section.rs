//! Section specifiers for BODY fetch items (RFC 3501 §6.4.5).

use std::num::NonZeroU32;

use crate::types::core::{AString, Vec1};

/// A dot-separated, 1-indexed body part path, e.g. `4.1.2`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Part(pub Vec1<NonZeroU32>);

/// The section of a message addressed by `BODY[...]`.
///
/// An absent section (`BODY[]`) denotes the complete message and is modelled
/// as `Option<Section>` at the use sites. `Mime` structurally requires a part
/// number: `MIME` without a part path is not representable.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Section {
    /// The complete addressed part, e.g. `BODY[4.1]`.
    Part(Part),
    /// `HEADER` of the message or of an embedded `message/rfc822` part.
    Header(Option<Part>),
    /// `HEADER.FIELDS (...)`.
    HeaderFields(Option<Part>, Vec1<AString>),
    /// `HEADER.FIELDS.NOT (...)`.
    HeaderFieldsNot(Option<Part>, Vec1<AString>),
    /// `TEXT` of the message or of an embedded `message/rfc822` part.
    Text(Option<Part>),
    /// `MIME` header of a part; only valid with a part path.
    Mime(Part),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_requires_part() {
        // The invariant is structural: `Mime` carries a `Part`, not an
        // `Option<Part>`.
        let part = Part(Vec1::from(NonZeroU32::new(1).unwrap()));
        let section = Section::Mime(part);
        assert!(matches!(section, Section::Mime(_)));
    }
}
