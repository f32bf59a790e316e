//! Core data types.
//!
//! The "string types" of IMAP:
//!
//! ```text
//!        ┌───────┐ ┌─────────────────┐
//!        │AString│ │     NString     │
//!        └──┬─┬──┘ │(Option<IString>)│
//!           │ │    └─────┬───────────┘
//!           │ └──────┐   │
//!           │        │   │
//! ┌────┐ ┌──▼────┐ ┌─▼───▼─┐
//! │Atom│ │AtomExt│ │IString│
//! └────┘ └───────┘ └┬─────┬┘
//!                   │     │
//!             ┌─────▼─┐ ┌─▼────┐
//!             │Literal│ │Quoted│
//!             └───────┘ └──────┘
//! ```

use std::fmt;

use thiserror::Error;

use crate::types::indicators::{
    is_astring_char, is_atom_char, is_char8, is_tag_char, is_text_char,
};

/// Error of a validating constructor.
#[derive(Clone, Debug, Eq, Error, Hash, PartialEq)]
pub enum ValidationError {
    #[error("must not be empty")]
    Empty,
    #[error("invalid byte b'\\x{found:02x}' at index {position}")]
    ByteNotAllowed { found: u8, position: usize },
}

fn verify_bytes(
    value: &[u8],
    allow_empty: bool,
    predicate: impl Fn(u8) -> bool,
) -> Result<(), ValidationError> {
    if !allow_empty && value.is_empty() {
        return Err(ValidationError::Empty);
    }

    if let Some(position) = value.iter().position(|b| !predicate(*b)) {
        return Err(ValidationError::ByteNotAllowed {
            found: value[position],
            position,
        });
    }

    Ok(())
}

macro_rules! impl_str_newtype_conversions {
    ($target:ty) => {
        impl TryFrom<&str> for $target {
            type Error = ValidationError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::verify(value)?;

                Ok(Self(value.to_owned()))
            }
        }

        impl TryFrom<String> for $target {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::verify(&value)?;

                Ok(Self(value))
            }
        }

        impl TryFrom<&[u8]> for $target {
            type Error = ValidationError;

            fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
                Self::verify(value)?;

                // Verification also proves the bytes are ASCII, i.e. UTF-8.
                Ok(Self(String::from_utf8(value.to_vec()).unwrap()))
            }
        }

        impl AsRef<str> for $target {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $target {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

/// An atom.
///
/// "An atom consists of one or more non-special characters."
/// ([RFC 3501](https://www.rfc-editor.org/rfc/rfc3501.html))
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Atom(pub(crate) String);

impl Atom {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), false, is_atom_char)
    }

    /// Constructs an atom without validation.
    ///
    /// The caller must ensure the value is valid according to [`Self::verify`].
    /// This method will `panic!` on wrong input in debug builds.
    pub(crate) fn unvalidated(inner: impl Into<String>) -> Self {
        let inner = inner.into();

        #[cfg(debug_assertions)]
        Self::verify(&inner).unwrap();

        Self(inner)
    }

    pub fn inner(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl_str_newtype_conversions!(Atom);

/// An (extended) atom.
///
/// According to IMAP's formal syntax, an atom run that may also contain
/// resp-specials, i.e. `1*ASTRING-CHAR`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AtomExt(pub(crate) String);

impl AtomExt {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), false, is_astring_char)
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

impl_str_newtype_conversions!(AtomExt);

impl From<Atom> for AtomExt {
    fn from(value: Atom) -> Self {
        Self(value.0)
    }
}

/// A command tag.
///
/// `tag = 1*<any ASTRING-CHAR except "+">`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Tag(pub(crate) String);

impl Tag {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), false, is_tag_char)
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

impl_str_newtype_conversions!(Tag);

/// Human-readable response text.
///
/// `text = 1*TEXT-CHAR`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Text(pub(crate) String);

impl Text {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), false, is_text_char)
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

impl_str_newtype_conversions!(Text);

/// A quoted string.
///
/// The value is stored unescaped; escaping is (re)introduced on encoding.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Quoted(pub(crate) String);

impl Quoted {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), true, is_text_char)
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

impl_str_newtype_conversions!(Quoted);

/// A single quoted character, e.g. the hierarchy delimiter of a LIST response.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct QuotedChar(pub(crate) char);

impl QuotedChar {
    pub fn verify(value: char) -> Result<(), ValidationError> {
        if value.is_ascii() && is_text_char(value as u8) {
            Ok(())
        } else {
            Err(ValidationError::ByteNotAllowed {
                found: value as u8,
                position: 0,
            })
        }
    }

    pub(crate) fn unvalidated(inner: char) -> Self {
        #[cfg(debug_assertions)]
        Self::verify(inner).unwrap();

        Self(inner)
    }

    pub fn inner(&self) -> char {
        self.0
    }
}

impl TryFrom<char> for QuotedChar {
    type Error = ValidationError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::verify(value)?;

        Ok(Self(value))
    }
}

/// Synchronizing or non-synchronizing transmission of a literal.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum LiteralMode {
    /// `{N}\r\n` — the receiver must acknowledge with a continuation request
    /// before the octets follow.
    #[default]
    Sync,
    /// `{N+}\r\n` — the octets follow immediately (RFC 7888).
    NonSync,
}

/// A literal: `{N}\r\n` followed by exactly N octets.
///
/// Non-binary literals must not contain NUL.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Literal {
    pub(crate) data: Vec<u8>,
    /// Whether a continuation request is required before the octets.
    pub mode: LiteralMode,
}

impl Literal {
    pub fn verify(value: impl AsRef<[u8]>) -> Result<(), ValidationError> {
        verify_bytes(value.as_ref(), true, is_char8)
    }

    /// Constructs a binary literal (`~{N}`, RFC 3516); NULs are allowed.
    pub(crate) fn unvalidated_binary(data: Vec<u8>) -> Self {
        Self {
            data,
            mode: LiteralMode::Sync,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn into_sync(mut self) -> Self {
        self.mode = LiteralMode::Sync;
        self
    }

    pub fn into_non_sync(mut self) -> Self {
        self.mode = LiteralMode::NonSync;
        self
    }
}

impl TryFrom<&[u8]> for Literal {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Self::verify(value)?;

        Ok(Self {
            data: value.to_vec(),
            mode: LiteralMode::Sync,
        })
    }
}

impl TryFrom<Vec<u8>> for Literal {
    type Error = ValidationError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::verify(&value)?;

        Ok(Self {
            data: value,
            mode: LiteralMode::Sync,
        })
    }
}

impl TryFrom<&str> for Literal {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(value.as_bytes())
    }
}

impl AsRef<[u8]> for Literal {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Either a quoted string or a literal.
///
/// "The empty string is represented as either "" (...) or as {0} followed by
/// CRLF (...)." ([RFC 3501](https://www.rfc-editor.org/rfc/rfc3501.html))
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum IString {
    Quoted(Quoted),
    Literal(Literal),
}

impl IString {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Quoted(quoted) => quoted.0.as_bytes(),
            Self::Literal(literal) => &literal.data,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Quoted(quoted) => quoted.0.into_bytes(),
            Self::Literal(literal) => literal.data,
        }
    }
}

impl TryFrom<&str> for IString {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if Quoted::verify(value).is_ok() {
            return Ok(Self::Quoted(Quoted(value.to_owned())));
        }

        Literal::try_from(value).map(Self::Literal)
    }
}

impl TryFrom<String> for IString {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Quoted::verify(&value).is_ok() {
            return Ok(Self::Quoted(Quoted(value)));
        }

        Literal::try_from(value.into_bytes()).map(Self::Literal)
    }
}

impl TryFrom<&[u8]> for IString {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        match std::str::from_utf8(value) {
            Ok(value) if Quoted::verify(value).is_ok() => {
                Ok(Self::Quoted(Quoted(value.to_owned())))
            }
            _ => Literal::try_from(value).map(Self::Literal),
        }
    }
}

impl From<Quoted> for IString {
    fn from(value: Quoted) -> Self {
        Self::Quoted(value)
    }
}

impl From<Literal> for IString {
    fn from(value: Literal) -> Self {
        Self::Literal(value)
    }
}

impl AsRef<[u8]> for IString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// `nstring = string / nil`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NString(pub Option<IString>);

impl NString {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.0.as_ref().map(IString::as_bytes)
    }
}

impl TryFrom<&str> for NString {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(Self(Some(IString::try_from(value)?)))
    }
}

/// `astring = 1*ASTRING-CHAR / string`
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum AString {
    Atom(AtomExt),
    String(IString),
}

impl AString {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Atom(atom) => atom.0.as_bytes(),
            Self::String(string) => string.as_bytes(),
        }
    }
}

impl TryFrom<&str> for AString {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if AtomExt::verify(value).is_ok() {
            return Ok(Self::Atom(AtomExt(value.to_owned())));
        }

        IString::try_from(value).map(Self::String)
    }
}

impl TryFrom<String> for AString {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if AtomExt::verify(&value).is_ok() {
            return Ok(Self::Atom(AtomExt(value)));
        }

        IString::try_from(value).map(Self::String)
    }
}

impl TryFrom<&[u8]> for AString {
    type Error = ValidationError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if AtomExt::verify(value).is_ok() {
            return AtomExt::try_from(value).map(Self::Atom);
        }

        IString::try_from(value).map(Self::String)
    }
}

impl From<Atom> for AString {
    fn from(value: Atom) -> Self {
        Self::Atom(value.into())
    }
}

impl AsRef<[u8]> for AString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// `charset = atom / quoted`
///
/// Note: see errata id: 261
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Charset {
    Atom(Atom),
    Quoted(Quoted),
}

impl Charset {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Atom(atom) => atom.inner(),
            Self::Quoted(quoted) => quoted.inner(),
        }
    }
}

impl TryFrom<&str> for Charset {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if Atom::verify(value).is_ok() {
            return Ok(Self::Atom(Atom(value.to_owned())));
        }

        Quoted::try_from(value).map(Self::Quoted)
    }
}

/// A non-empty vector.
///
/// Backs every "is never empty" invariant of the model: sequence sets,
/// mailbox pattern lists, header lists, parameter lists, multipart children.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Vec1<T>(Vec<T>);

impl<T> Vec1<T> {
    /// Constructs a non-empty vector without validation.
    ///
    /// This method will `panic!` on an empty input in debug builds.
    pub(crate) fn unvalidated(inner: Vec<T>) -> Self {
        #[cfg(debug_assertions)]
        assert!(!inner.is_empty());

        Self(inner)
    }

    pub fn as_ref(&self) -> &[T] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn first(&self) -> &T {
        // Invariant: never empty.
        &self.0[0]
    }
}

impl<T> From<T> for Vec1<T> {
    fn from(value: T) -> Self {
        Self(vec![value])
    }
}

impl<T> TryFrom<Vec<T>> for Vec1<T> {
    type Error = ValidationError;

    fn try_from(value: Vec<T>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ValidationError::Empty);
        }

        Ok(Self(value))
    }
}

impl<T> IntoIterator for Vec1<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Vec1<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom() {
        assert!(Atom::try_from("").is_err());
        assert!(Atom::try_from("a b").is_err());
        assert!(Atom::try_from("ab]").is_err());
        assert!(Atom::try_from("über").is_err());

        let atom = Atom::try_from("NOOP").unwrap();
        assert_eq!(atom.inner(), "NOOP");
    }

    #[test]
    fn test_tag_rejects_plus() {
        assert!(Tag::try_from("A1").is_ok());
        assert!(Tag::try_from("A+1").is_err());
        assert!(Tag::try_from("").is_err());
    }

    #[test]
    fn test_quoted() {
        assert!(Quoted::try_from("").is_ok());
        assert!(Quoted::try_from("Hello \"World\"").is_ok());
        assert!(Quoted::try_from("CR\rLF").is_err());
    }

    #[test]
    fn test_literal_rejects_null() {
        assert!(Literal::try_from(b"123".as_ref()).is_ok());
        assert!(Literal::try_from(b"1\x003".as_ref()).is_err());
        assert!(Literal::try_from(b"".as_ref()).is_ok());
    }

    #[test]
    fn test_istring_prefers_quoted() {
        assert!(matches!(
            IString::try_from("hello").unwrap(),
            IString::Quoted(_)
        ));
        assert!(matches!(
            IString::try_from("multi\r\nline").unwrap(),
            IString::Literal(_)
        ));
    }

    #[test]
    fn test_astring_prefers_atom() {
        assert!(matches!(AString::try_from("box]").unwrap(), AString::Atom(_)));
        assert!(matches!(
            AString::try_from("two words").unwrap(),
            AString::String(IString::Quoted(_))
        ));
    }

    #[test]
    fn test_vec1() {
        assert!(Vec1::<u32>::try_from(vec![]).is_err());
        assert_eq!(Vec1::<i32>::try_from(vec![1, 2]).unwrap().len(), 2);
        assert_eq!(Vec1::from(7).as_ref(), &[7]);
    }
}
