//! Response parsers.
//!
//! `FETCH` responses are not parsed here as a whole: the response session
//! parser recognizes their start ([`fetch_start`]) and streams the attributes
//! one at a time.

use std::num::NonZeroU32;

use abnf_core::streaming::sp;
use base64::{engine::general_purpose::STANDARD as _base64, Engine};
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case, take_while},
    combinator::{map, map_res, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded, terminated, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{atom, charset, number64, nz_number, tag_imap, text},
        extensions::{
            condstore::vanished_response,
            enable::enable_data,
            id::id_response,
            metadata::{metadata_code, metadata_response},
            namespace::namespace_response,
            quota::{quota_response, quotaroot_response},
        },
        flag::flag_perm,
        mailbox::mailbox_data,
        newline,
        search::esearch_response,
        sequence::sequence_set,
    },
    types::{
        core::{Text, Vec1},
        response::{
            Bye, Capability, Code, CodeOther, ContinuationRequest, Data, Greeting, GreetingKind,
            StatusBody, StatusKind, Tagged,
        },
    },
};

// ----- greeting -----

/// `greeting = "*" SP (resp-cond-auth / resp-cond-bye) CRLF`
pub(crate) fn greeting(input: &[u8]) -> ImapResult<'_, Greeting> {
    let mut parser = delimited(
        tag(b"* "),
        alt((
            resp_cond_auth,
            map(resp_cond_bye, |(code, text)| (GreetingKind::Bye, (code, text))),
        )),
        newline,
    );

    let (remaining, (kind, (code, text))) = parser(input)?;

    Ok((remaining, Greeting { kind, code, text }))
}

/// `resp-cond-auth = ("OK" / "PREAUTH") SP resp-text`
///
/// Authentication condition
#[allow(clippy::type_complexity)]
fn resp_cond_auth(input: &[u8]) -> ImapResult<'_, (GreetingKind, (Option<Code>, Text))> {
    let mut parser = tuple((
        alt((
            value(GreetingKind::Ok, tag_no_case(b"OK ")),
            value(GreetingKind::PreAuth, tag_no_case(b"PREAUTH ")),
        )),
        resp_text,
    ));

    let (remaining, (kind, resp_text)) = parser(input)?;

    Ok((remaining, (kind, resp_text)))
}

/// `resp-text = ["[" resp-text-code "]" SP] text`
pub(crate) fn resp_text(input: &[u8]) -> ImapResult<'_, (Option<Code>, Text)> {
    // When the text starts with "[", a code must parse; otherwise a broken
    // code would be interpreted as text.
    let (_, start) = opt(tag(b"["))(input)?;

    if start.is_some() {
        tuple((
            preceded(
                tag(b"["),
                map(
                    alt((
                        terminated(resp_text_code, tag(b"]")),
                        map(
                            terminated(
                                take_while(|b: u8| b != b']' && b != b'\r' && b != b'\n'),
                                tag(b"]"),
                            ),
                            |bytes: &[u8]| Code::Other(CodeOther::unvalidated(bytes)),
                        ),
                    )),
                    Some,
                ),
            ),
            preceded(sp, text),
        ))(input)
    } else {
        map(text, |text| (None, text))(input)
    }
}

/// ```abnf
/// resp-text-code = "ALERT" /
///                  "BADCHARSET" [SP "(" charset *(SP charset) ")" ] /
///                  capability-data /
///                  "PARSE" /
///                  "PERMANENTFLAGS" SP "(" [flag-perm *(SP flag-perm)] ")" /
///                  "READ-ONLY" /
///                  "READ-WRITE" /
///                  "TRYCREATE" /
///                  "UIDNEXT" SP nz-number /
///                  "UIDVALIDITY" SP nz-number /
///                  "UNSEEN" SP nz-number /
///                  "APPENDUID" SP nz-number SP nz-number /   ; RFC 4315
///                  "COPYUID" SP nz-number SP set SP set /    ; RFC 4315
///                  "UIDNOTSTICKY" /                          ; RFC 4315
///                  "HIGHESTMODSEQ" SP mod-sequence-value /   ; RFC 7162
///                  "NOMODSEQ" /                              ; RFC 7162
///                  "MODIFIED" SP sequence-set /              ; RFC 7162
///                  "CLOSED" /                                ; RFC 7162
///                  "TOOBIG" /                                ; RFC 4469
///                  "UNKNOWN-CTE" /                           ; RFC 3516
///                  "URLMECH" SP "INTERNAL" *(SP mechanism) / ; RFC 4467
///                  "METADATA" SP (...) /                     ; RFC 5464
///                  atom [SP 1*<any TEXT-CHAR except "]">]
/// ```
///
/// Note: See errata id: 261
fn resp_text_code(input: &[u8]) -> ImapResult<'_, Code> {
    alt((
        alt((
            value(Code::Alert, tag_no_case(b"ALERT")),
            map(
                preceded(
                    tag_no_case(b"BADCHARSET"),
                    opt(delimited(
                        tag(b" ("),
                        separated_list1(sp, charset),
                        tag(b")"),
                    )),
                ),
                |maybe_charsets| Code::BadCharset {
                    allowed: maybe_charsets.unwrap_or_default(),
                },
            ),
            map(capability_data, Code::Capability),
            value(Code::Parse, tag_no_case(b"PARSE")),
            map(
                preceded(
                    tag_no_case(b"PERMANENTFLAGS "),
                    delimited(
                        tag(b"("),
                        map(opt(separated_list1(sp, flag_perm)), Option::unwrap_or_default),
                        tag(b")"),
                    ),
                ),
                Code::PermanentFlags,
            ),
            value(Code::ReadOnly, tag_no_case(b"READ-ONLY")),
            value(Code::ReadWrite, tag_no_case(b"READ-WRITE")),
            value(Code::TryCreate, tag_no_case(b"TRYCREATE")),
            map(preceded(tag_no_case(b"UIDNEXT "), nz_number), Code::UidNext),
            map(
                preceded(tag_no_case(b"UIDVALIDITY "), nz_number),
                Code::UidValidity,
            ),
            map(preceded(tag_no_case(b"UNSEEN "), nz_number), Code::Unseen),
        )),
        alt((
            map(
                tuple((tag_no_case(b"APPENDUID "), nz_number, sp, nz_number)),
                |(_, uid_validity, _, uid)| Code::AppendUid { uid_validity, uid },
            ),
            map(
                tuple((
                    tag_no_case(b"COPYUID "),
                    nz_number,
                    sp,
                    sequence_set,
                    sp,
                    sequence_set,
                )),
                |(_, uid_validity, _, source, _, destination)| Code::CopyUid {
                    uid_validity,
                    source,
                    destination,
                },
            ),
            value(Code::UidNotSticky, tag_no_case(b"UIDNOTSTICKY")),
            map(
                preceded(tag_no_case(b"HIGHESTMODSEQ "), number64),
                Code::HighestModSeq,
            ),
            value(Code::NoModSeq, tag_no_case(b"NOMODSEQ")),
            map(
                preceded(tag_no_case(b"MODIFIED "), sequence_set),
                Code::Modified,
            ),
            value(Code::Closed, tag_no_case(b"CLOSED")),
            value(Code::TooBig, tag_no_case(b"TOOBIG")),
            value(Code::UnknownCte, tag_no_case(b"UNKNOWN-CTE")),
            map(
                preceded(
                    tag_no_case(b"URLMECH INTERNAL"),
                    nom::multi::many0(preceded(
                        sp,
                        map(atom, crate::types::extensions::urlauth::UrlAuthMechanism::from),
                    )),
                ),
                |mut mechanisms| {
                    mechanisms.insert(
                        0,
                        crate::types::extensions::urlauth::UrlAuthMechanism::Internal,
                    );
                    Code::UrlMech(mechanisms)
                },
            ),
            map(
                preceded(tag_no_case(b"METADATA "), metadata_code),
                Code::Metadata,
            ),
        )),
    ))(input)
}

/// `capability-data = "CAPABILITY" *(SP capability) SP "IMAP4rev1"
///                    *(SP capability)`
///
/// The `IMAP4rev1` token is not required to be present: some servers don't
/// advertise it on the capability code of a login response.
pub(crate) fn capability_data(input: &[u8]) -> ImapResult<'_, Vec1<Capability>> {
    map(
        preceded(
            tag_no_case(b"CAPABILITY "),
            separated_list1(sp, map(atom, Capability::from)),
        ),
        Vec1::unvalidated,
    )(input)
}

/// `resp-cond-bye = "BYE" SP resp-text`
fn resp_cond_bye(input: &[u8]) -> ImapResult<'_, (Option<Code>, Text)> {
    preceded(tag_no_case(b"BYE "), resp_text)(input)
}

// ----- response -----

/// `continue-req = "+" SP (resp-text / base64) CRLF`
pub(crate) fn continue_req(input: &[u8]) -> ImapResult<'_, ContinuationRequest> {
    // `resp_text` accepts a subset of base64, so base64 is tried first and
    // decided by the whole line.
    enum Either<A, B> {
        Base64(A),
        Basic(B),
    }

    let mut parser = tuple((
        tag(b"+ "),
        alt((
            map(
                map_res(
                    terminated(
                        nom::combinator::recognize(tuple((
                            take_while(crate::types::indicators::is_base64_char),
                            opt(alt((tag("=="), tag("=")))),
                        ))),
                        peek_newline,
                    ),
                    |line: &[u8]| _base64.decode(line),
                ),
                Either::Base64,
            ),
            map(resp_text, Either::Basic),
        )),
        newline,
    ));

    let (remaining, (_, either, _)) = parser(input)?;

    let continue_request = match either {
        Either::Base64(data) => ContinuationRequest::Base64(data),
        Either::Basic((code, text)) => ContinuationRequest::Basic { code, text },
    };

    Ok((remaining, continue_request))
}

/// ```abnf
/// response-data = "*" SP (
///                    resp-cond-state /
///                    resp-cond-bye /
///                    mailbox-data /
///                    message-data /
///                    capability-data /
///                    enable-data /
///                    esearch-response /
///                    vanished-response /
///                    namespace-response /
///                    quota-response /
///                    quotaroot-response /
///                    metadata-response /
///                    id-response /
///                    urlfetch-response
///                  ) CRLF
/// ```
///
/// `BYE` is reported separately ([`response_fatal`]) and `FETCH` is streamed,
/// so neither appears here.
pub(crate) fn response_data(input: &[u8]) -> ImapResult<'_, Data> {
    delimited(
        tag(b"* "),
        alt((
            map(resp_cond_state, |(kind, code, text)| {
                Data::Condition(StatusBody { kind, code, text })
            }),
            mailbox_data,
            map(tuple((nz_number, tag_no_case(b" EXPUNGE"))), |(seq, _)| {
                Data::Expunge(seq)
            }),
            map(capability_data, Data::Capability),
            enable_data,
            esearch_response,
            vanished_response,
            namespace_response,
            quota_response,
            quotaroot_response,
            metadata_response,
            map(id_response, |parameters| Data::Id { parameters }),
            urlfetch_response,
        )),
        newline,
    )(input)
}

/// `urlfetch-response = "URLFETCH" 1*(SP url SP nstring)` (RFC 4467)
fn urlfetch_response(input: &[u8]) -> ImapResult<'_, Data> {
    map(
        preceded(
            tag_no_case(b"URLFETCH"),
            nom::multi::many1(map(
                tuple((
                    sp,
                    crate::parse::core::astring,
                    sp,
                    crate::parse::core::nstring,
                )),
                |(_, url, _, data)| (url, data),
            )),
        ),
        |pairs| Data::UrlFetch(Vec1::unvalidated(pairs)),
    )(input)
}

/// Peeks the upcoming line ending without consuming it.
fn peek_newline(input: &[u8]) -> ImapResult<'_, ()> {
    match input.first() {
        None => Err(nom::Err::Incomplete(nom::Needed::new(1))),
        Some(b'\r' | b'\n') => Ok((input, ())),
        Some(_) => Err(nom::Err::Error(crate::parse::ImapParseError {
            input,
            kind: crate::parse::ImapErrorKind::Nom(nom::error::ErrorKind::CrLf),
        })),
    }
}

/// `resp-cond-state = ("OK" / "NO" / "BAD") SP resp-text`
///
/// Status condition
pub(crate) fn resp_cond_state(
    input: &[u8],
) -> ImapResult<'_, (StatusKind, Option<Code>, Text)> {
    let mut parser = tuple((
        alt((
            value(StatusKind::Ok, tag_no_case("OK ")),
            value(StatusKind::No, tag_no_case("NO ")),
            value(StatusKind::Bad, tag_no_case("BAD ")),
        )),
        resp_text,
    ));

    let (remaining, (kind, (code, text))) = parser(input)?;

    Ok((remaining, (kind, code, text)))
}

/// `response-tagged = tag SP resp-cond-state CRLF`
pub(crate) fn response_tagged(input: &[u8]) -> ImapResult<'_, Tagged> {
    let mut parser = tuple((tag_imap, sp, resp_cond_state, newline));

    let (remaining, (tag, _, (kind, code, text), _)) = parser(input)?;

    Ok((
        remaining,
        Tagged {
            tag,
            body: StatusBody { kind, code, text },
        },
    ))
}

/// `response-fatal = "*" SP resp-cond-bye CRLF`
///
/// Server closes connection immediately
pub(crate) fn response_fatal(input: &[u8]) -> ImapResult<'_, Bye> {
    let mut parser = delimited(tag(b"* "), resp_cond_bye, newline);

    let (remaining, (code, text)) = parser(input)?;

    Ok((remaining, Bye { code, text }))
}

/// The head of a FETCH response: `"*" SP nz-number SP "FETCH" SP "("`.
///
/// The attributes that follow are streamed by the session parser.
pub(crate) fn fetch_start(input: &[u8]) -> ImapResult<'_, NonZeroU32> {
    let mut parser = tuple((
        tag(b"* "),
        nz_number,
        tag_no_case(b" FETCH ("),
    ));

    let (remaining, (_, seq, _)) = parser(input)?;

    Ok((remaining, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        let (rem, greeting_val) = greeting(b"* OK [ALERT] hello\r\n?").unwrap();
        assert_eq!(rem, b"?");
        assert_eq!(greeting_val.kind, GreetingKind::Ok);
        assert_eq!(greeting_val.code, Some(Code::Alert));
        assert_eq!(greeting_val.text, Text::try_from("hello").unwrap());

        let (_, greeting_val) = greeting(b"* preaUth x\r\n").unwrap();
        assert_eq!(greeting_val.kind, GreetingKind::PreAuth);

        assert!(matches!(greeting_val, Greeting { .. }));
        assert!(matches!(
            super::greeting(b"* OK ."),
            Err(nom::Err::Incomplete(_))
        ));
    }

    #[test]
    fn test_resp_text_with_unknown_code() {
        let (_, (code, text)) = resp_text(b"[XCUSTOM foo] done\r\n").unwrap();
        assert!(matches!(code, Some(Code::Other(_))));
        assert_eq!(text, Text::try_from("done").unwrap());
    }

    #[test]
    fn test_resp_text_code_permanentflags() {
        let (_, code) = resp_text_code(b"PERMANENTFLAGS (\\Deleted \\Seen \\*)]").unwrap();
        let Code::PermanentFlags(flags) = code else {
            panic!("expected permanentflags");
        };
        assert_eq!(flags.len(), 3);
    }

    #[test]
    fn test_resp_text_code_condstore() {
        let (_, code) = resp_text_code(b"HIGHESTMODSEQ 715194045007]").unwrap();
        assert_eq!(code, Code::HighestModSeq(715194045007));

        let (_, code) = resp_text_code(b"NOMODSEQ]").unwrap();
        assert_eq!(code, Code::NoModSeq);

        let (_, code) = resp_text_code(b"MODIFIED 7,9]").unwrap();
        assert!(matches!(code, Code::Modified(_)));
    }

    #[test]
    fn test_resp_text_code_uidplus() {
        let (_, code) = resp_text_code(b"APPENDUID 38505 3955]").unwrap();
        assert_eq!(
            code,
            Code::AppendUid {
                uid_validity: 38505.try_into().unwrap(),
                uid: 3955.try_into().unwrap(),
            }
        );

        let (_, code) = resp_text_code(b"COPYUID 38505 304,319:320 3956:3958]").unwrap();
        assert!(matches!(code, Code::CopyUid { .. }));
    }

    #[test]
    fn test_continue_req() {
        let (_, req) = continue_req(b"+ idling\r\n").unwrap();
        assert!(matches!(req, ContinuationRequest::Basic { .. }));

        let (_, req) = continue_req(b"+ VGVzdA==\r\n").unwrap();
        assert_eq!(req, ContinuationRequest::Base64(b"Test".to_vec()));
    }

    #[test]
    fn test_response_data() {
        let (_, data) = response_data(b"* CAPABILITY IMAP4rev1 LITERAL+\r\n").unwrap();
        let Data::Capability(caps) = data else {
            panic!("expected capabilities");
        };
        assert_eq!(caps.len(), 2);

        let (_, data) = response_data(b"* 123 EXPUNGE\r\n").unwrap();
        assert_eq!(data, Data::Expunge(123.try_into().unwrap()));

        let (_, data) = response_data(b"* VANISHED (EARLIER) 41:43\r\n").unwrap();
        assert!(matches!(data, Data::Vanished { earlier: true, .. }));

        let (_, data) = response_data(b"* OK [UNSEEN 17] Message 17 is first unseen\r\n").unwrap();
        assert!(matches!(data, Data::Condition(_)));
    }

    #[test]
    fn test_response_tagged() {
        let (_, tagged) = response_tagged(b"A1 OK [ALERT] hello\r\n").unwrap();
        assert_eq!(tagged.tag.inner(), "A1");
        assert_eq!(tagged.body.kind, StatusKind::Ok);

        let (_, tagged) = response_tagged(b"A1 BAD hello\r\n").unwrap();
        assert_eq!(tagged.body.kind, StatusKind::Bad);
    }

    #[test]
    fn test_response_fatal() {
        let (_, bye) = response_fatal(b"* BYE shutting down\r\n").unwrap();
        assert_eq!(bye.text, Text::try_from("shutting down").unwrap());
    }

    #[test]
    fn test_fetch_start() {
        let (rem, seq) = fetch_start(b"* 24 FETCH (FLAGS (\\Seen))\r\n").unwrap();
        assert_eq!(u32::from(seq), 24);
        assert_eq!(rem, b"FLAGS (\\Seen))\r\n");

        assert!(fetch_start(b"* 0 FETCH (\r\n").is_err());
        assert!(fetch_start(b"* 24 EXPUNGE\r\n").is_err());
    }
}
