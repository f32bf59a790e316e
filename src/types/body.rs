//! Body structure types.

use std::num::NonZeroU32;

use crate::types::{
    core::{IString, NString, Vec1},
    envelope::Envelope,
    section::Part,
};

/// The `BODY`/`BODYSTRUCTURE` of a message: a tree of parts.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum BodyStructure {
    Single(SinglePart),
    Multi(MultiPart),
}

impl BodyStructure {
    /// Navigates to the part addressed by a 1-indexed, dot-separated part
    /// path, following IMAP's part numbering: the children of a multipart are
    /// numbered from 1, and a `message/rfc822` part is transparent for the
    /// numbering of its embedded message.
    pub fn part_at(&self, part: &Part) -> Option<&BodyStructure> {
        let mut current = self;

        for index in part.0.iter() {
            current = current.child(*index)?;
        }

        Some(current)
    }

    fn child(&self, index: NonZeroU32) -> Option<&BodyStructure> {
        match self {
            Self::Multi(multi) => multi
                .bodies
                .as_ref()
                .get(u32::from(index) as usize - 1),
            Self::Single(single) => match &single.kind {
                SinglePartKind::Message { body_structure, .. } => {
                    match body_structure.as_ref() {
                        // The embedded message is itself a multipart: address
                        // its children directly.
                        BodyStructure::Multi(_) => body_structure.child(index),
                        // Part 1 addresses the embedded message's body.
                        BodyStructure::Single(_) if u32::from(index) == 1 => {
                            Some(body_structure)
                        }
                        _ => None,
                    }
                }
                // Part 1 of a non-multipart message is the part itself.
                _ if u32::from(index) == 1 => Some(self),
                _ => None,
            },
        }
    }
}

/// A non-multipart body.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SinglePart {
    /// The fields common to every single part.
    pub fields: BasicFields,
    pub kind: SinglePartKind,
    pub extension_data: Option<SinglePartExtensionData>,
}

/// What kind of single part this is.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SinglePartKind {
    /// `body-type-basic`, e.g. `application/octet-stream`.
    Basic {
        r#type: IString,
        subtype: MediaSubtype,
    },
    /// `body-type-msg`: a `message/rfc822` part carrying an embedded message.
    Message {
        envelope: Box<Envelope>,
        body_structure: Box<BodyStructure>,
        number_of_lines: u32,
    },
    /// `body-type-text`.
    Text {
        subtype: MediaSubtype,
        number_of_lines: u32,
    },
}

/// `body-fields`: the field group every single part carries.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BasicFields {
    /// List of attribute/value pairs, e.g. (`charset`, `utf-8`).
    pub parameter_list: Vec<(IString, IString)>,
    pub id: NString,
    pub description: NString,
    pub content_transfer_encoding: ContentTransferEncoding,
    /// Size of the part in octets.
    pub size: u32,
}

/// `body-fld-enc`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ContentTransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    Base64,
    QuotedPrintable,
    Other(IString),
}

impl From<IString> for ContentTransferEncoding {
    fn from(value: IString) -> Self {
        match value.as_bytes().to_ascii_lowercase().as_slice() {
            b"7bit" => Self::SevenBit,
            b"8bit" => Self::EightBit,
            b"binary" => Self::Binary,
            b"base64" => Self::Base64,
            b"quoted-printable" => Self::QuotedPrintable,
            _ => Self::Other(value),
        }
    }
}

/// A media subtype, e.g. `plain` or `alternative`.
///
/// Lowercased on construction; equality is therefore case-insensitive.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MediaSubtype(pub(crate) String);

impl MediaSubtype {
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaSubtype {
    fn from(value: &str) -> Self {
        Self(value.to_ascii_lowercase())
    }
}

impl From<IString> for MediaSubtype {
    fn from(value: IString) -> Self {
        Self(String::from_utf8_lossy(value.as_bytes()).to_ascii_lowercase())
    }
}

/// A multipart body.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MultiPart {
    pub bodies: Vec1<BodyStructure>,
    pub subtype: MediaSubtype,
    pub extension_data: Option<MultiPartExtensionData>,
}

/// `body-ext-1part`: the optional extension tail of a single part.
///
/// The tail fields nest because each is only allowed when its predecessor is
/// present.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SinglePartExtensionData {
    pub md5: NString,
    pub tail: Option<Disposition>,
}

/// `body-ext-mpart`: the optional extension tail of a multipart.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MultiPartExtensionData {
    pub parameter_list: Vec<(IString, IString)>,
    pub tail: Option<Disposition>,
}

/// `body-fld-dsp` and what may follow it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Disposition {
    pub disposition: Option<(IString, Vec<(IString, IString)>)>,
    pub tail: Option<Language>,
}

/// `body-fld-lang` and what may follow it.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Language {
    pub languages: Vec<IString>,
    pub tail: Option<Location>,
}

/// `body-fld-loc` and trailing generic extension values.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    pub location: NString,
    pub extensions: Vec<BodyExtension>,
}

/// `body-extension`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum BodyExtension {
    NString(NString),
    Number(u32),
    List(Vec1<BodyExtension>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::core::{NString, Vec1};

    fn text_part(subtype: &str) -> BodyStructure {
        BodyStructure::Single(SinglePart {
            fields: BasicFields {
                parameter_list: vec![],
                id: NString(None),
                description: NString(None),
                content_transfer_encoding: ContentTransferEncoding::SevenBit,
                size: 42,
            },
            kind: SinglePartKind::Text {
                subtype: MediaSubtype::from(subtype),
                number_of_lines: 1,
            },
            extension_data: None,
        })
    }

    #[test]
    fn test_media_subtype_is_case_insensitive() {
        assert_eq!(MediaSubtype::from("PLAIN"), MediaSubtype::from("plain"));
    }

    #[test]
    fn test_content_transfer_encoding_mapping() {
        assert_eq!(
            ContentTransferEncoding::from(IString::try_from("BASE64").unwrap()),
            ContentTransferEncoding::Base64
        );
        assert!(matches!(
            ContentTransferEncoding::from(IString::try_from("x-unknown").unwrap()),
            ContentTransferEncoding::Other(_)
        ));
    }

    #[test]
    fn test_part_navigation() {
        let multi = BodyStructure::Multi(MultiPart {
            bodies: Vec1::try_from(vec![text_part("plain"), text_part("html")]).unwrap(),
            subtype: MediaSubtype::from("alternative"),
            extension_data: None,
        });

        let part = Part(Vec1::from(NonZeroU32::new(2).unwrap()));
        let Some(BodyStructure::Single(single)) = multi.part_at(&part) else {
            panic!("part 2 not found");
        };
        assert!(matches!(
            &single.kind,
            SinglePartKind::Text { subtype, .. } if subtype.inner() == "html"
        ));

        let missing = Part(Vec1::from(NonZeroU32::new(3).unwrap()));
        assert!(multi.part_at(&missing).is_none());
    }

    #[test]
    fn test_part_one_of_single_part_message() {
        let single = text_part("plain");
        let part = Part(Vec1::from(NonZeroU32::new(1).unwrap()));
        assert!(single.part_at(&part).is_some());
    }
}
