//! IMAP URL parsers (RFC 5092, RFC 4467).
//!
//! URLs travel inside astrings (GENURLAUTH, URLFETCH), so these parsers work
//! on the complete extracted byte string instead of the streaming input: a
//! truncated URL is malformed, never "incomplete".

use std::num::NonZeroU32;

use thiserror::Error;

use crate::types::extensions::urlauth::{
    EncodedMailbox, EncodedSection, EncodedUrlAuth, EncodedUser, IMessagePart, IPartial,
    IUaVerifier, IUrlAuth, IUrlAuthRump, ImapUrl, RumpUrl, UrlAccess, UrlAuth, UrlAuthMechanism,
    UrlServer, UserInfo,
};
use crate::types::{core::Atom, indicators::{is_hex_digit, is_sub_delims_sh, is_unreserved}};

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub(crate) enum UrlParseError {
    #[error("URL does not start with the imap scheme")]
    BadScheme,
    #[error("malformed {0}")]
    Malformed(&'static str),
    #[error("trailing bytes after the URL")]
    TrailingBytes,
}

/// `achar = uchar / "&" / "="`
fn is_achar_raw(byte: u8) -> bool {
    is_unreserved(byte) || is_sub_delims_sh(byte) || byte == b'%' || byte == b'&' || byte == b'='
}

/// `bchar = achar / ":" / "@" / "/"`
fn is_bchar_raw(byte: u8) -> bool {
    is_achar_raw(byte) || matches!(byte, b':' | b'@' | b'/')
}

fn take_while<'a>(input: &'a [u8], predicate: impl Fn(u8) -> bool) -> (&'a [u8], &'a [u8]) {
    let end = input
        .iter()
        .position(|b| !predicate(*b))
        .unwrap_or(input.len());

    (&input[..end], &input[end..])
}

fn strip_prefix_no_case<'a>(input: &'a [u8], prefix: &[u8]) -> Option<&'a [u8]> {
    if input.len() >= prefix.len() && input[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

fn number<'a>(input: &'a [u8], what: &'static str) -> Result<(u32, &'a [u8]), UrlParseError> {
    let (digits, rest) = take_while(input, |b| b.is_ascii_digit());

    if digits.is_empty() {
        return Err(UrlParseError::Malformed(what));
    }

    std::str::from_utf8(digits)
        .unwrap()
        .parse::<u32>()
        .map(|value| (value, rest))
        .map_err(|_| UrlParseError::Malformed(what))
}

fn nz_number<'a>(input: &'a [u8], what: &'static str) -> Result<(NonZeroU32, &'a [u8]), UrlParseError> {
    let (value, rest) = number(input, what)?;

    NonZeroU32::new(value)
        .map(|value| (value, rest))
        .ok_or(UrlParseError::Malformed(what))
}

/// Parses a complete `imap://` URL with a mandatory URLAUTH-capable message
/// part and an optional URLAUTH suffix.
pub(crate) fn parse_imap_url(input: &[u8]) -> Result<ImapUrl, UrlParseError> {
    let (server, rest) = iserver(input)?;
    let (part, rest) = imessagepart(rest)?;

    if rest.is_empty() {
        return Ok(ImapUrl {
            server,
            part,
            urlauth: None,
        });
    }

    let (rump, rest) = iurlauth_rump(rest)?;
    let (verifier, rest) = iua_verifier(rest)?;

    if !rest.is_empty() {
        return Err(UrlParseError::TrailingBytes);
    }

    Ok(ImapUrl {
        server,
        part,
        urlauth: Some(IUrlAuth { rump, verifier }),
    })
}

/// Parses a rump URL as passed to GENURLAUTH: everything up to and including
/// the access specifier, but no verifier.
pub(crate) fn parse_rump_url(input: &[u8]) -> Result<RumpUrl, UrlParseError> {
    let (server, rest) = iserver(input)?;
    let (part, rest) = imessagepart(rest)?;
    let (rump, rest) = iurlauth_rump(rest)?;

    if !rest.is_empty() {
        return Err(UrlParseError::TrailingBytes);
    }

    Ok(RumpUrl { server, part, rump })
}

/// `"imap://" [iuserinfo "@"] host [":" port] "/"`
fn iserver(input: &[u8]) -> Result<(UrlServer, &[u8]), UrlParseError> {
    let rest = strip_prefix_no_case(input, b"imap://").ok_or(UrlParseError::BadScheme)?;

    // The authority ends at the first "/".
    let authority_end = rest
        .iter()
        .position(|b| *b == b'/')
        .ok_or(UrlParseError::Malformed("authority"))?;
    let (authority, path) = (&rest[..authority_end], &rest[authority_end + 1..]);

    let (user, host_port) = match authority.iter().rposition(|b| *b == b'@') {
        Some(at) => (Some(iuserinfo(&authority[..at])?), &authority[at + 1..]),
        None => (None, authority),
    };

    let (host, port) = match host_port.iter().rposition(|b| *b == b':') {
        // An IPv6 literal also contains ":", but inside "[...]".
        Some(colon) if !host_port[colon..].contains(&b']') => {
            let (port, rest) = number(&host_port[colon + 1..], "port")?;
            if !rest.is_empty() {
                return Err(UrlParseError::Malformed("port"));
            }
            let port = u16::try_from(port).map_err(|_| UrlParseError::Malformed("port"))?;
            (&host_port[..colon], Some(port))
        }
        _ => (host_port, None),
    };

    if host.is_empty() {
        return Err(UrlParseError::Malformed("host"));
    }

    Ok((
        UrlServer {
            user,
            host: String::from_utf8_lossy(host).into_owned(),
            port,
        },
        path,
    ))
}

/// `iuserinfo = enc-user [iauth] / [enc-user] iauth`
fn iuserinfo(input: &[u8]) -> Result<UserInfo, UrlParseError> {
    let (user_bytes, rest) = take_while(input, is_achar_raw);

    let user = if user_bytes.is_empty() {
        None
    } else {
        Some(
            EncodedUser::try_from(std::str::from_utf8(user_bytes).unwrap())
                .map_err(|_| UrlParseError::Malformed("enc-user"))?,
        )
    };

    let auth = match strip_prefix_no_case(rest, b";AUTH=") {
        Some(rest) => {
            if rest == b"*" {
                Some(UrlAuth::Any)
            } else {
                let (mechanism, trailing) = take_while(rest, is_achar_raw);
                if mechanism.is_empty() || !trailing.is_empty() {
                    return Err(UrlParseError::Malformed("iauth"));
                }
                Some(UrlAuth::Type(
                    EncodedUser::try_from(std::str::from_utf8(mechanism).unwrap())
                        .map_err(|_| UrlParseError::Malformed("iauth"))?,
                ))
            }
        }
        None if rest.is_empty() => None,
        None => return Err(UrlParseError::Malformed("iuserinfo")),
    };

    if user.is_none() && auth.is_none() {
        return Err(UrlParseError::Malformed("iuserinfo"));
    }

    Ok(UserInfo { user, auth })
}

/// Takes a run of bchars, giving back a trailing "/" when it introduces the
/// following `/;KEYWORD=` component.
fn take_bchars_component(input: &[u8]) -> (&[u8], &[u8]) {
    let (mut taken, mut rest) = take_while(input, is_bchar_raw);

    if rest.first() == Some(&b';') && taken.last() == Some(&b'/') {
        rest = &input[taken.len() - 1..];
        taken = &taken[..taken.len() - 1];
    }

    (taken, rest)
}

/// `imessagepart = enc-mailbox [";UIDVALIDITY=" nz-number] "/;UID=" nz-number
///                 ["/;SECTION=" enc-section] ["/;PARTIAL=" partial-range]`
fn imessagepart(input: &[u8]) -> Result<(IMessagePart, &[u8]), UrlParseError> {
    let (mailbox_bytes, rest) = take_bchars_component(input);

    if mailbox_bytes.is_empty() {
        return Err(UrlParseError::Malformed("enc-mailbox"));
    }

    let mailbox = EncodedMailbox::try_from(std::str::from_utf8(mailbox_bytes).unwrap())
        .map_err(|_| UrlParseError::Malformed("enc-mailbox"))?;

    let (uid_validity, rest) = match strip_prefix_no_case(rest, b";UIDVALIDITY=") {
        Some(rest) => {
            let (value, rest) = nz_number(rest, "uidvalidity")?;
            (Some(value), rest)
        }
        None => (None, rest),
    };

    let rest = strip_prefix_no_case(rest, b"/;UID=").ok_or(UrlParseError::Malformed("iuid"))?;
    let (uid, rest) = nz_number(rest, "iuid")?;

    let (section, rest) = match strip_prefix_no_case(rest, b"/;SECTION=") {
        Some(rest) => {
            let (section_bytes, rest) = take_bchars_component(rest);
            if section_bytes.is_empty() {
                return Err(UrlParseError::Malformed("enc-section"));
            }
            let section =
                EncodedSection::try_from(std::str::from_utf8(section_bytes).unwrap())
                    .map_err(|_| UrlParseError::Malformed("enc-section"))?;
            (Some(section), rest)
        }
        None => (None, rest),
    };

    let (partial, rest) = match strip_prefix_no_case(rest, b"/;PARTIAL=") {
        Some(rest) => {
            let (offset, rest) = number(rest, "partial-range")?;
            let (length, rest) = match rest.first() {
                Some(b'.') => {
                    let (length, rest) = nz_number(&rest[1..], "partial-range")?;
                    (Some(length), rest)
                }
                _ => (None, rest),
            };
            (Some(IPartial { offset, length }), rest)
        }
        None => (None, rest),
    };

    Ok((
        IMessagePart {
            mailbox,
            uid_validity,
            uid,
            section,
            partial,
        },
        rest,
    ))
}

/// `iurlauth-rump = [";EXPIRE=" date-time] ";URLAUTH=" access`
fn iurlauth_rump(input: &[u8]) -> Result<(IUrlAuthRump, &[u8]), UrlParseError> {
    let (expire, rest) = match strip_prefix_no_case(input, b";EXPIRE=") {
        Some(rest) => {
            // The timestamp ends at the ";URLAUTH=" that must follow.
            let (stamp, rest) = take_while(rest, |b| b != b';');
            if stamp.is_empty() {
                return Err(UrlParseError::Malformed("expire"));
            }
            (
                Some(String::from_utf8_lossy(stamp).into_owned()),
                rest,
            )
        }
        None => (None, input),
    };

    let rest = strip_prefix_no_case(rest, b";URLAUTH=")
        .ok_or(UrlParseError::Malformed("iurlauth-rump"))?;

    let (access, rest) = access(rest)?;

    Ok((IUrlAuthRump { expire, access }, rest))
}

/// `access = ("submit+" enc-user) / ("user+" enc-user) / "authuser" /
///           "anonymous"`
fn enc_user(rest: &[u8]) -> Result<(EncodedUser, &[u8]), UrlParseError> {
    let (user, rest) = take_while(rest, is_achar_raw);
    if user.is_empty() {
        return Err(UrlParseError::Malformed("access"));
    }
    Ok((
        EncodedUser::try_from(std::str::from_utf8(user).unwrap())
            .map_err(|_| UrlParseError::Malformed("access"))?,
        rest,
    ))
}

fn access(input: &[u8]) -> Result<(UrlAccess, &[u8]), UrlParseError> {
    if let Some(rest) = strip_prefix_no_case(input, b"submit+") {
        let (user, rest) = enc_user(rest)?;
        return Ok((UrlAccess::Submit(user), rest));
    }

    if let Some(rest) = strip_prefix_no_case(input, b"user+") {
        let (user, rest) = enc_user(rest)?;
        return Ok((UrlAccess::User(user), rest));
    }

    if let Some(rest) = strip_prefix_no_case(input, b"authuser") {
        return Ok((UrlAccess::AuthUser, rest));
    }

    if let Some(rest) = strip_prefix_no_case(input, b"anonymous") {
        return Ok((UrlAccess::Anonymous, rest));
    }

    Err(UrlParseError::Malformed("access"))
}

/// `iua-verifier = ":" uauth-mechanism ":" enc-urlauth`
fn iua_verifier(input: &[u8]) -> Result<(IUaVerifier, &[u8]), UrlParseError> {
    let rest = input
        .strip_prefix(b":")
        .ok_or(UrlParseError::Malformed("iua-verifier"))?;

    let (mechanism_bytes, rest) = take_while(rest, |b| b != b':');
    let mechanism = std::str::from_utf8(mechanism_bytes)
        .ok()
        .and_then(|s| Atom::try_from(s).ok())
        .map(UrlAuthMechanism::from)
        .ok_or(UrlParseError::Malformed("uauth-mechanism"))?;

    let rest = rest
        .strip_prefix(b":")
        .ok_or(UrlParseError::Malformed("iua-verifier"))?;

    let (token_bytes, rest) = take_while(rest, is_hex_digit);
    let token = EncodedUrlAuth::try_from(std::str::from_utf8(token_bytes).unwrap())
        .map_err(|_| UrlParseError::Malformed("enc-urlauth"))?;

    Ok((IUaVerifier { mechanism, token }, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "internal:91354a473744909de610943775f92038";

    #[test]
    fn test_parse_rump_url() {
        let url = parse_rump_url(
            b"imap://joe@example.com/INBOX.Drafts;UIDVALIDITY=385759045/;UID=20;URLAUTH=submit+fred",
        )
        .unwrap();

        assert_eq!(url.server.host, "example.com");
        assert_eq!(url.server.user.unwrap().user.unwrap().inner(), "joe");
        assert_eq!(url.part.mailbox.inner(), "INBOX.Drafts");
        assert_eq!(url.part.uid_validity.map(u32::from), Some(385759045));
        assert_eq!(u32::from(url.part.uid), 20);
        assert!(matches!(url.rump.access, UrlAccess::Submit(_)));
    }

    #[test]
    fn test_parse_full_url() {
        let input = format!(
            "imap://joe@example.com/INBOX;UIDVALIDITY=3/;UID=5/;SECTION=1.2;URLAUTH=anonymous:{TOKEN}"
        );
        let url = parse_imap_url(input.as_bytes()).unwrap();

        let urlauth = url.urlauth.unwrap();
        assert_eq!(urlauth.verifier.mechanism, UrlAuthMechanism::Internal);
        assert_eq!(url.part.section.unwrap().inner(), "1.2");
        assert!(matches!(urlauth.rump.access, UrlAccess::Anonymous));
    }

    #[test]
    fn test_parse_url_without_urlauth() {
        let url = parse_imap_url(b"imap://example.com/INBOX/;UID=7").unwrap();
        assert!(url.urlauth.is_none());
        assert!(url.server.user.is_none());
    }

    #[test]
    fn test_parse_url_with_port_and_partial() {
        let url =
            parse_imap_url(b"imap://example.com:1143/INBOX/;UID=7/;PARTIAL=0.1024").unwrap();
        assert_eq!(url.server.port, Some(1143));
        let partial = url.part.partial.unwrap();
        assert_eq!(partial.offset, 0);
        assert_eq!(partial.length.map(u32::from), Some(1024));
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        assert!(parse_imap_url(b"http://example.com/INBOX/;UID=7").is_err());
        assert!(parse_imap_url(b"imap://example.com/INBOX").is_err());
        assert!(parse_imap_url(b"imap:///INBOX/;UID=7").is_err());
        assert!(parse_rump_url(b"imap://example.com/INBOX/;UID=7").is_err());
    }
}
