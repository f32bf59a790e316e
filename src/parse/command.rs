//! Command parsers.
//!
//! `APPEND` and `IDLE` span multiple lines and are therefore driven by the
//! command session parser; this module provides their building blocks
//! ([`append_start`], [`append_message`], [`idle_done`]) next to the
//! single-line commands.

use abnf_core::streaming::sp;
use nom::{
    branch::alt,
    bytes::streaming::{tag, tag_no_case},
    combinator::{map, map_res, opt, value},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, terminated, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{astring, atom, base64, literal, literal_header, tag_imap},
        datetime::date_time,
        extensions::{
            condstore::{fetch_modifiers, select_parameters, store_modifiers},
            enable::enable,
            id::id,
            metadata::{getmetadata, setmetadata},
            quota::{getquota, getquotaroot, setquota},
            urlauth::{parse_imap_url, parse_rump_url},
        },
        fetch::fetch_atts,
        flag::{flag, flag_list, mbx_list_flags},
        mailbox::{list_mailbox, mailbox},
        newline,
        search::search,
        sequence::sequence_set,
        status::status_att,
    },
    types::{
        auth::AuthMechanism,
        command::{
            AppendMessage, AppendMessageData, AppendOptions, CatenatePart, Command, CommandBody,
            CreateParameter, ListReturnOption, ListSelectOption,
        },
        core::{AString, LiteralMode, Tag, Vec1},
        flag::{Flag, StoreResponse, StoreType},
        mailbox::Mailbox,
    },
};

/// `command = tag SP (command-any / command-auth / command-nonauth /
///            command-select) CRLF`
pub(crate) fn command(input: &[u8]) -> ImapResult<'_, Command> {
    let mut parser_tag = terminated(tag_imap, sp);
    let mut parser_body = terminated(
        alt((command_any, command_auth, command_nonauth, command_select)),
        newline,
    );

    let (remaining, tag) = parser_tag(input)?;
    let (remaining, body) = parser_body(remaining)?;

    Ok((remaining, Command { tag, body }))
}

// # Command Any

/// `command-any = "CAPABILITY" / "LOGOUT" / "NOOP" / id`
///
/// Note: Valid in all states
fn command_any(input: &[u8]) -> ImapResult<'_, CommandBody> {
    alt((
        value(CommandBody::Capability, tag_no_case(b"CAPABILITY")),
        value(CommandBody::Logout, tag_no_case(b"LOGOUT")),
        value(CommandBody::Noop, tag_no_case(b"NOOP")),
        map(id, |parameters| CommandBody::Id { parameters }),
    ))(input)
}

// # Command Auth

/// ```abnf
/// command-auth = create /
///                delete /
///                examine /
///                list /
///                lsub /
///                rename /
///                select /
///                status /
///                subscribe /
///                unsubscribe /
///                idle /         ; RFC 2177
///                enable /       ; RFC 5161
///                namespace /    ; RFC 2342
///                getquota /     ; RFC 9208
///                getquotaroot / ; RFC 9208
///                setquota /     ; RFC 9208
///                setmetadata /  ; RFC 5464
///                getmetadata /  ; RFC 5464
///                resetkey /     ; RFC 4467
///                genurlauth /   ; RFC 4467
///                urlfetch       ; RFC 4467
/// ```
///
/// Note: Valid only in Authenticated or Selected state. `APPEND` is handled
/// by the session parser.
fn command_auth(input: &[u8]) -> ImapResult<'_, CommandBody> {
    alt((
        create,
        delete,
        examine,
        list,
        lsub,
        rename,
        select,
        status,
        subscribe,
        unsubscribe,
        value(CommandBody::Idle, tag_no_case(b"IDLE")),
        enable,
        value(CommandBody::Namespace, tag_no_case(b"NAMESPACE")),
        getquotaroot,
        getquota,
        setquota,
        setmetadata,
        getmetadata,
        resetkey,
        genurlauth,
        urlfetch,
    ))(input)
}

/// `create = "CREATE" SP mailbox [SP "(" create-param *(SP create-param) ")"]`
///
/// Note: Use of INBOX gives a NO error
fn create(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"CREATE "),
        mailbox,
        opt(preceded(
            sp,
            delimited(
                tag(b"("),
                separated_list1(sp, create_param),
                tag(b")"),
            ),
        )),
    ));

    let (remaining, (_, mailbox, parameters)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Create {
            mailbox,
            parameters: parameters.unwrap_or_default(),
        },
    ))
}

/// `create-param = "USE" SP "(" [use-attr *(SP use-attr)] ")" / atom`
/// (RFC 6154)
fn create_param(input: &[u8]) -> ImapResult<'_, CreateParameter> {
    alt((
        map(
            preceded(
                tag_no_case(b"USE "),
                delimited(tag(b"("), mbx_list_flags, tag(b")")),
            ),
            CreateParameter::Use,
        ),
        map(atom, CreateParameter::Other),
    ))(input)
}

/// `delete = "DELETE" SP mailbox`
///
/// Note: Use of INBOX gives a NO error
fn delete(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let (remaining, mailbox) = preceded(tag_no_case(b"DELETE "), mailbox)(input)?;

    Ok((remaining, CommandBody::Delete { mailbox }))
}

/// `examine = "EXAMINE" SP mailbox [select-params]`
fn examine(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"EXAMINE "),
        mailbox,
        opt(preceded(sp, select_parameters)),
    ));

    let (remaining, (_, mailbox, parameters)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Examine {
            mailbox,
            parameters: parameters.unwrap_or_default(),
        },
    ))
}

/// `select = "SELECT" SP mailbox [select-params]`
fn select(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"SELECT "),
        mailbox,
        opt(preceded(sp, select_parameters)),
    ));

    let (remaining, (_, mailbox, parameters)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Select {
            mailbox,
            parameters: parameters.unwrap_or_default(),
        },
    ))
}

/// `list = "LIST" [SP list-select-opts] SP mailbox SP mbox-or-pat
///         [SP "RETURN" SP list-return-opts]` (RFC 5258; subsumes RFC 3501)
fn list(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"LIST"),
        opt(preceded(
            sp,
            delimited(
                tag(b"("),
                separated_list0(sp, list_select_option),
                tag(b")"),
            ),
        )),
        sp,
        mailbox,
        sp,
        alt((
            map(
                delimited(tag(b"("), separated_list1(sp, list_mailbox), tag(b")")),
                Vec1::unvalidated,
            ),
            map(list_mailbox, Vec1::from),
        )),
        opt(preceded(
            tag_no_case(b" RETURN "),
            delimited(
                tag(b"("),
                separated_list0(sp, list_return_option),
                tag(b")"),
            ),
        )),
    ));

    let (remaining, (_, selection_options, _, reference, _, patterns, return_options)) =
        parser(input)?;

    Ok((
        remaining,
        CommandBody::List {
            selection_options: selection_options.unwrap_or_default(),
            reference,
            patterns,
            return_options: return_options.unwrap_or_default(),
        },
    ))
}

/// `list-select-opt = "SUBSCRIBED" / "REMOTE" / "RECURSIVEMATCH" /
///                    "SPECIAL-USE" / atom`
fn list_select_option(input: &[u8]) -> ImapResult<'_, ListSelectOption> {
    alt((
        value(ListSelectOption::Subscribed, tag_no_case(b"SUBSCRIBED")),
        value(ListSelectOption::Remote, tag_no_case(b"REMOTE")),
        value(
            ListSelectOption::RecursiveMatch,
            tag_no_case(b"RECURSIVEMATCH"),
        ),
        value(ListSelectOption::SpecialUse, tag_no_case(b"SPECIAL-USE")),
        map(atom, ListSelectOption::Other),
    ))(input)
}

/// `list-return-opt = "SUBSCRIBED" / "CHILDREN" / "SPECIAL-USE" /
///                    "STATUS" SP "(" status-att *(SP status-att) ")" / atom`
fn list_return_option(input: &[u8]) -> ImapResult<'_, ListReturnOption> {
    alt((
        value(ListReturnOption::Subscribed, tag_no_case(b"SUBSCRIBED")),
        value(ListReturnOption::Children, tag_no_case(b"CHILDREN")),
        value(ListReturnOption::SpecialUse, tag_no_case(b"SPECIAL-USE")),
        map(
            preceded(
                tag_no_case(b"STATUS "),
                delimited(tag(b"("), separated_list0(sp, status_att), tag(b")")),
            ),
            ListReturnOption::Status,
        ),
        map(atom, ListReturnOption::Other),
    ))(input)
}

/// `lsub = "LSUB" SP mailbox SP list-mailbox`
fn lsub(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((tag_no_case(b"LSUB "), mailbox, sp, list_mailbox));

    let (remaining, (_, reference, _, pattern)) = parser(input)?;

    Ok((remaining, CommandBody::Lsub { reference, pattern }))
}

/// `rename = "RENAME" SP mailbox SP mailbox [SP "(" atom *(SP atom) ")"]`
///
/// Note: Use of INBOX as a destination gives a NO error
fn rename(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"RENAME "),
        mailbox,
        sp,
        mailbox,
        opt(preceded(
            sp,
            delimited(tag(b"("), separated_list1(sp, atom), tag(b")")),
        )),
    ));

    let (remaining, (_, from, _, to, parameters)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Rename {
            from,
            to,
            parameters: parameters.unwrap_or_default(),
        },
    ))
}

/// `status = "STATUS" SP mailbox SP "(" status-att *(SP status-att) ")"`
fn status(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"STATUS "),
        mailbox,
        delimited(tag(b" ("), separated_list0(sp, status_att), tag(b")")),
    ));

    let (remaining, (_, mailbox, attributes)) = parser(input)?;

    Ok((remaining, CommandBody::Status { mailbox, attributes }))
}

/// `subscribe = "SUBSCRIBE" SP mailbox`
fn subscribe(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let (remaining, mailbox) = preceded(tag_no_case(b"SUBSCRIBE "), mailbox)(input)?;

    Ok((remaining, CommandBody::Subscribe { mailbox }))
}

/// `unsubscribe = "UNSUBSCRIBE" SP mailbox`
fn unsubscribe(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let (remaining, mailbox) = preceded(tag_no_case(b"UNSUBSCRIBE "), mailbox)(input)?;

    Ok((remaining, CommandBody::Unsubscribe { mailbox }))
}

/// `resetkey = "RESETKEY" [SP mailbox *(SP mechanism)]` (RFC 4467)
fn resetkey(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"RESETKEY"),
        opt(tuple((
            preceded(sp, mailbox),
            nom::multi::many0(preceded(
                sp,
                map(atom, crate::types::extensions::urlauth::UrlAuthMechanism::from),
            )),
        ))),
    ));

    let (remaining, (_, rest)) = parser(input)?;

    let (mailbox, mechanisms) = match rest {
        Some((mailbox, mechanisms)) => (Some(mailbox), mechanisms),
        None => (None, Vec::new()),
    };

    Ok((remaining, CommandBody::ResetKey { mailbox, mechanisms }))
}

/// `genurlauth = "GENURLAUTH" 1*(SP url-rump SP mechanism)` (RFC 4467)
fn genurlauth(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = preceded(
        tag_no_case(b"GENURLAUTH"),
        nom::multi::many1(preceded(
            sp,
            map_res(
                tuple((astring, sp, atom)),
                |(url, _, mechanism)| {
                    parse_rump_url(url.as_bytes())
                        .map(|rump| {
                            (
                                rump,
                                crate::types::extensions::urlauth::UrlAuthMechanism::from(
                                    mechanism,
                                ),
                            )
                        })
                        .map_err(|_| crate::types::core::ValidationError::Empty)
                },
            ),
        )),
    );

    let (remaining, rumps) = parser(input)?;

    Ok((
        remaining,
        CommandBody::GenUrlAuth {
            rumps: Vec1::unvalidated(rumps),
        },
    ))
}

/// `urlfetch = "URLFETCH" 1*(SP url)` (RFC 4467)
///
/// Each URL must parse as an authorized IMAP URL; the verbatim astring is
/// kept so nothing needs to be re-encoded.
fn urlfetch(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = preceded(
        tag_no_case(b"URLFETCH"),
        nom::multi::many1(preceded(
            sp,
            map_res(astring, |url| {
                parse_imap_url(url.as_bytes())
                    .map(|_| url)
                    .map_err(|_| crate::types::core::ValidationError::Empty)
            }),
        )),
    );

    let (remaining, urls) = parser(input)?;

    Ok((
        remaining,
        CommandBody::UrlFetch {
            urls: Vec1::unvalidated(urls),
        },
    ))
}

// # Command NonAuth

/// `command-nonauth = login / authenticate`
///
/// Note: Valid only when in Not Authenticated state
fn command_nonauth(input: &[u8]) -> ImapResult<'_, CommandBody> {
    alt((login, authenticate))(input)
}

/// `login = "LOGIN" SP userid SP password` with `userid = password = astring`
fn login(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((tag_no_case(b"LOGIN"), sp, astring, sp, astring));

    let (remaining, (_, _, username, _, password)) = parser(input)?;

    Ok((remaining, CommandBody::Login { username, password }))
}

/// `authenticate = "AUTHENTICATE" SP auth-type [SP (base64 / "=")]`
///
/// The optional initial response was added by SASL-IR (RFC 4959); further
/// exchange lines are delivered by the session parser as continuation
/// responses.
fn authenticate(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"AUTHENTICATE "),
        map(atom, AuthMechanism::from),
        opt(preceded(
            sp,
            alt((
                // A zero-length initial response is sent as a single "=".
                value(Vec::new(), tag(b"=")),
                base64,
            )),
        )),
    ));

    let (remaining, (_, mechanism, initial_response)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Authenticate {
            mechanism,
            initial_response,
        },
    ))
}

// # Command Select

/// `command-select = "CHECK" / "CLOSE" / "EXPUNGE" / "UNSELECT" /
///                   uid-expunge / copy / move / fetch / store / uid /
///                   search`
///
/// Note: Valid only when in Selected state
fn command_select(input: &[u8]) -> ImapResult<'_, CommandBody> {
    alt((
        value(CommandBody::Check, tag_no_case(b"CHECK")),
        value(CommandBody::Close, tag_no_case(b"CLOSE")),
        value(CommandBody::Expunge, tag_no_case(b"EXPUNGE")),
        value(CommandBody::Unselect, tag_no_case(b"UNSELECT")),
        copy,
        r#move,
        fetch,
        store,
        uid,
        search,
    ))(input)
}

/// `copy = "COPY" SP sequence-set SP mailbox`
fn copy(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((tag_no_case(b"COPY"), sp, sequence_set, sp, mailbox));

    let (remaining, (_, _, sequence_set, _, mailbox)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Copy {
            sequence_set,
            mailbox,
            uid: false,
        },
    ))
}

/// `move = "MOVE" SP sequence-set SP mailbox` (RFC 6851)
fn r#move(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((tag_no_case(b"MOVE"), sp, sequence_set, sp, mailbox));

    let (remaining, (_, _, sequence_set, _, mailbox)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Move {
            sequence_set,
            mailbox,
            uid: false,
        },
    ))
}

/// `fetch = "FETCH" SP sequence-set SP ("ALL" / "FULL" / "FAST" / fetch-att /
///          "(" fetch-att *(SP fetch-att) ")") [SP fetch-modifiers]`
fn fetch(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"FETCH"),
        sp,
        sequence_set,
        sp,
        fetch_atts,
        opt(preceded(sp, fetch_modifiers)),
    ));

    let (remaining, (_, _, sequence_set, _, macro_or_item_names, modifiers)) = parser(input)?;

    Ok((
        remaining,
        CommandBody::Fetch {
            sequence_set,
            macro_or_item_names,
            modifiers: modifiers.unwrap_or_default(),
            uid: false,
        },
    ))
}

/// `store = "STORE" SP sequence-set [SP store-modifiers] SP store-att-flags`
fn store(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"STORE"),
        sp,
        sequence_set,
        opt(preceded(sp, store_modifiers)),
        sp,
        store_att_flags,
    ));

    let (remaining, (_, _, sequence_set, modifiers, _, (kind, response, flags))) =
        parser(input)?;

    Ok((
        remaining,
        CommandBody::Store {
            sequence_set,
            kind,
            response,
            flags,
            modifiers: modifiers.unwrap_or_default(),
            uid: false,
        },
    ))
}

/// `store-att-flags = (["+" / "-"] "FLAGS" [".SILENT"]) SP
///                    (flag-list / (flag *(SP flag)))`
fn store_att_flags(
    input: &[u8],
) -> ImapResult<'_, (StoreType, StoreResponse, Vec<Flag>)> {
    let mut parser = tuple((
        tuple((
            map(
                opt(alt((
                    value(StoreType::Add, tag(b"+")),
                    value(StoreType::Remove, tag(b"-")),
                ))),
                |kind| kind.unwrap_or(StoreType::Replace),
            ),
            tag_no_case(b"FLAGS"),
            map(opt(tag_no_case(b".SILENT")), |silent| match silent {
                Some(_) => StoreResponse::Silent,
                None => StoreResponse::Answer,
            }),
        )),
        sp,
        alt((flag_list, separated_list1(sp, flag))),
    ));

    let (remaining, ((kind, _, response), _, flags)) = parser(input)?;

    Ok((remaining, (kind, response, flags)))
}

/// `uid = "UID" SP (copy / move / fetch / search / store / expunge)`
///
/// Note: Unique identifiers are used instead of message sequence numbers
fn uid(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"UID"),
        sp,
        alt((uid_expunge, copy, r#move, fetch, search, store)),
    ));

    let (remaining, (_, _, mut body)) = parser(input)?;

    match body {
        CommandBody::Copy { ref mut uid, .. }
        | CommandBody::Move { ref mut uid, .. }
        | CommandBody::Fetch { ref mut uid, .. }
        | CommandBody::Search { ref mut uid, .. }
        | CommandBody::Store { ref mut uid, .. } => *uid = true,
        CommandBody::ExpungeUid { .. } => {}
        _ => unreachable!(),
    }

    Ok((remaining, body))
}

/// `uid-expunge = "EXPUNGE" SP sequence-set` (RFC 4315, always behind `UID`)
fn uid_expunge(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let (remaining, sequence_set) =
        preceded(tag_no_case(b"EXPUNGE "), sequence_set)(input)?;

    Ok((remaining, CommandBody::ExpungeUid { sequence_set }))
}

// # APPEND / IDLE building blocks

/// The head of an APPEND: `tag SP "APPEND" SP mailbox`, stopping right after
/// the mailbox.
pub(crate) fn append_start(input: &[u8]) -> ImapResult<'_, (Tag, Mailbox)> {
    let mut parser = tuple((tag_imap, sp, tag_no_case(b"APPEND"), sp, mailbox));

    let (remaining, (tag, _, _, _, mailbox)) = parser(input)?;

    Ok((remaining, (tag, mailbox)))
}

/// One `append-message`: `SP [flag-list SP] [date-time SP]
/// (literal / literal8 / "CATENATE" SP "(" cat-part *(SP cat-part) ")")`
///
/// The literal introducer is consumed up to and including its newline; the
/// octets themselves are left for the session parser to stream.
pub(crate) fn append_message(input: &[u8]) -> ImapResult<'_, AppendMessage> {
    let mut parser = tuple((
        sp,
        opt(terminated(flag_list, sp)),
        opt(terminated(date_time, sp)),
        alt((
            map(
                tuple((opt(tag(b"~")), literal_header, newline)),
                |(binary, (byte_count, _mode), _): (_, (u32, LiteralMode), _)| {
                    AppendMessageData::Literal {
                        byte_count,
                        binary: binary.is_some(),
                    }
                },
            ),
            map(
                preceded(
                    tag_no_case(b"CATENATE ("),
                    terminated(separated_list1(sp, catenate_part), tag(b")")),
                ),
                |parts| AppendMessageData::Catenate(Vec1::unvalidated(parts)),
            ),
        )),
    ));

    let (remaining, (_, flags, internal_date, data)) = parser(input)?;

    Ok((
        remaining,
        AppendMessage {
            options: AppendOptions {
                flags: flags.unwrap_or_default(),
                internal_date,
            },
            data,
        },
    ))
}

/// `cat-part = "URL" SP url / "TEXT" SP literal`
///
/// Nested part groups are not accepted.
fn catenate_part(input: &[u8]) -> ImapResult<'_, CatenatePart> {
    alt((
        map(
            preceded(
                tag_no_case(b"URL "),
                map_res(astring, |url: AString| {
                    parse_imap_url(url.as_bytes())
                        .map(|_| url.clone())
                        .map_err(|_| crate::types::core::ValidationError::Empty)
                }),
            ),
            CatenatePart::Url,
        ),
        map(preceded(tag_no_case(b"TEXT "), literal), CatenatePart::Text),
    ))(input)
}

/// `idle-done = "DONE" CRLF`
pub(crate) fn idle_done(input: &[u8]) -> ImapResult<'_, ()> {
    map(tuple((tag_no_case(b"DONE"), newline)), |_| ())(input)
}
