//! Byte classifiers used by the tokenizers and the string-form selection of
//! the encoder.

use abnf_core::{is_alpha, is_digit};

/// `CHAR = %x01-7F`
pub(crate) fn is_char(byte: u8) -> bool {
    matches!(byte, 0x01..=0x7f)
}

/// `CHAR8 = %x01-ff`
///
/// Any octet except NUL. Literal payloads are CHAR8 runs; binary literals
/// (`~{N}`) may additionally contain NUL and are not checked with this.
pub(crate) fn is_char8(byte: u8) -> bool {
    byte != 0x00
}

/// `TEXT-CHAR = <any CHAR except CR and LF>`
pub(crate) fn is_text_char(byte: u8) -> bool {
    is_char(byte) && !matches!(byte, b'\r' | b'\n')
}

/// `quoted-specials = DQUOTE / "\"`
pub(crate) fn is_quoted_specials(byte: u8) -> bool {
    byte == b'"' || byte == b'\\'
}

pub(crate) fn is_any_text_char_except_quoted_specials(byte: u8) -> bool {
    is_text_char(byte) && !is_quoted_specials(byte)
}

/// `list-wildcards = "%" / "*"`
pub(crate) fn is_list_wildcards(byte: u8) -> bool {
    byte == b'%' || byte == b'*'
}

/// `resp-specials = "]"`
pub(crate) fn is_resp_specials(byte: u8) -> bool {
    byte == b']'
}

/// `atom-specials = "(" / ")" / "{" / SP / CTL / list-wildcards /
///                  quoted-specials / resp-specials`
pub(crate) fn is_atom_specials(byte: u8) -> bool {
    match byte {
        b'(' | b')' | b'{' | b' ' => true,
        0x00..=0x1f | 0x7f => true, // CTL
        _ => {
            is_list_wildcards(byte) || is_quoted_specials(byte) || is_resp_specials(byte)
        }
    }
}

/// `ATOM-CHAR = <any CHAR except atom-specials>`
pub(crate) fn is_atom_char(byte: u8) -> bool {
    is_char(byte) && !is_atom_specials(byte)
}

/// `ASTRING-CHAR = ATOM-CHAR / resp-specials`
pub(crate) fn is_astring_char(byte: u8) -> bool {
    is_atom_char(byte) || is_resp_specials(byte)
}

/// `tag = 1*<any ASTRING-CHAR except "+">`
pub(crate) fn is_tag_char(byte: u8) -> bool {
    is_astring_char(byte) && byte != b'+'
}

/// `list-char = ATOM-CHAR / list-wildcards / resp-specials`
pub(crate) fn is_list_char(byte: u8) -> bool {
    is_atom_char(byte) || is_list_wildcards(byte) || is_resp_specials(byte)
}

/// `base64-char = ALPHA / DIGIT / "+" / "/" ; Case-sensitive`
pub(crate) fn is_base64_char(byte: u8) -> bool {
    is_alpha(byte) || is_digit(byte) || byte == b'+' || byte == b'/'
}

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"` (RFC 3986)
pub(crate) fn is_unreserved(byte: u8) -> bool {
    is_alpha(byte) || is_digit(byte) || matches!(byte, b'-' | b'.' | b'_' | b'~')
}

/// `sub-delims-sh = "!" / "$" / "'" / "(" / ")" / "*" / "+" / ","`
///
/// Shared sub-delims of RFC 5092, i.e. `sub-delims` without "&", ";" and "=".
pub(crate) fn is_sub_delims_sh(byte: u8) -> bool {
    matches!(byte, b'!' | b'$' | b'\'' | b'(' | b')' | b'*' | b'+' | b',')
}

pub(crate) fn is_hex_digit(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_char() {
        for byte in [b'a', b'Z', b'0', b'-', b'.', b'&'] {
            assert!(is_atom_char(byte), "{byte}");
        }
        for byte in [b'(', b')', b'{', b' ', b'%', b'*', b'"', b'\\', b']', 0x00, 0x1f, 0x7f, 0x80]
        {
            assert!(!is_atom_char(byte), "{byte}");
        }
    }

    #[test]
    fn test_astring_char_allows_resp_specials() {
        assert!(is_astring_char(b']'));
        assert!(!is_astring_char(b'%'));
    }

    #[test]
    fn test_tag_char_excludes_plus() {
        assert!(is_tag_char(b'a'));
        assert!(!is_tag_char(b'+'));
    }

    #[test]
    fn test_list_char() {
        assert!(is_list_char(b'%'));
        assert!(is_list_char(b'*'));
        assert!(!is_list_char(b' '));
    }

    #[test]
    fn test_rfc3986_classes() {
        assert!(is_unreserved(b'~'));
        assert!(!is_unreserved(b'/'));
        assert!(is_sub_delims_sh(b'!'));
        assert!(!is_sub_delims_sh(b';'));
        assert!(!is_sub_delims_sh(b'&'));
    }
}
