//! QUOTA parsers (RFC 9208).

use abnf_core::streaming::sp;
use nom::{
    bytes::streaming::{tag, tag_no_case},
    combinator::map,
    multi::{separated_list0, separated_list1},
    sequence::{delimited, preceded, tuple},
};

use crate::{
    parse::{
        ImapResult,
        core::{astring, atom, number64},
        mailbox::mailbox,
    },
    types::{
        command::CommandBody,
        core::Vec1,
        extensions::quota::{QuotaGet, QuotaSet, Resource},
        response::Data,
    },
};

/// `getquota = "GETQUOTA" SP quota-root-name`
pub(crate) fn getquota(input: &[u8]) -> ImapResult<'_, CommandBody> {
    map(preceded(tag_no_case(b"GETQUOTA "), astring), |root| {
        CommandBody::GetQuota { root }
    })(input)
}

/// `getquotaroot = "GETQUOTAROOT" SP mailbox`
pub(crate) fn getquotaroot(input: &[u8]) -> ImapResult<'_, CommandBody> {
    map(
        preceded(tag_no_case(b"GETQUOTAROOT "), mailbox),
        |mailbox| CommandBody::GetQuotaRoot { mailbox },
    )(input)
}

/// `setquota = "SETQUOTA" SP quota-root-name SP quota-limits`
pub(crate) fn setquota(input: &[u8]) -> ImapResult<'_, CommandBody> {
    let mut parser = tuple((
        tag_no_case(b"SETQUOTA "),
        astring,
        sp,
        delimited(
            tag(b"("),
            separated_list0(sp, setquota_resource),
            tag(b")"),
        ),
    ));

    let (remaining, (_, root, _, quotas)) = parser(input)?;

    Ok((remaining, CommandBody::SetQuota { root, quotas }))
}

/// `setquota-resource = resource-name SP resource-limit`
fn setquota_resource(input: &[u8]) -> ImapResult<'_, QuotaSet> {
    let mut parser = tuple((map(atom, Resource::from), sp, number64));

    let (remaining, (resource, _, limit)) = parser(input)?;

    Ok((remaining, QuotaSet { resource, limit }))
}

/// `quota-response = "QUOTA" SP quota-root-name SP quota-list`
pub(crate) fn quota_response(input: &[u8]) -> ImapResult<'_, Data> {
    let mut parser = tuple((
        tag_no_case(b"QUOTA "),
        astring,
        sp,
        delimited(
            tag(b"("),
            separated_list1(sp, quota_resource),
            tag(b")"),
        ),
    ));

    let (remaining, (_, root, _, quotas)) = parser(input)?;

    Ok((
        remaining,
        Data::Quota {
            root,
            quotas: Vec1::unvalidated(quotas),
        },
    ))
}

/// `quota-resource = resource-name SP resource-usage SP resource-limit`
fn quota_resource(input: &[u8]) -> ImapResult<'_, QuotaGet> {
    let mut parser = tuple((map(atom, Resource::from), sp, number64, sp, number64));

    let (remaining, (resource, _, usage, _, limit)) = parser(input)?;

    Ok((
        remaining,
        QuotaGet {
            resource,
            usage,
            limit,
        },
    ))
}

/// `quotaroot-response = "QUOTAROOT" SP mailbox *(SP quota-root-name)`
pub(crate) fn quotaroot_response(input: &[u8]) -> ImapResult<'_, Data> {
    let mut parser = tuple((
        tag_no_case(b"QUOTAROOT "),
        mailbox,
        nom::multi::many0(preceded(sp, astring)),
    ));

    let (remaining, (_, mailbox, roots)) = parser(input)?;

    Ok((remaining, Data::QuotaRoot { mailbox, roots }))
}
