//! ENABLE parsers (RFC 5161).

use abnf_core::streaming::sp;
use nom::{
    bytes::streaming::tag_no_case,
    combinator::map,
    multi::{many0, separated_list1},
    sequence::preceded,
};

use crate::{
    parse::{ImapResult, core::atom},
    types::{
        command::CommandBody,
        core::Vec1,
        response::{Capability, Data},
    },
};

/// `enable = "ENABLE" 1*(SP capability)`
pub(crate) fn enable(input: &[u8]) -> ImapResult<'_, CommandBody> {
    map(
        preceded(
            tag_no_case(b"ENABLE "),
            separated_list1(sp, map(atom, Capability::from)),
        ),
        |capabilities| CommandBody::Enable {
            capabilities: Vec1::unvalidated(capabilities),
        },
    )(input)
}

/// `enable-data = "ENABLED" *(SP capability)`
pub(crate) fn enable_data(input: &[u8]) -> ImapResult<'_, Data> {
    map(
        preceded(
            tag_no_case(b"ENABLED"),
            many0(preceded(sp, map(atom, Capability::from))),
        ),
        |capabilities| Data::Enabled { capabilities },
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable() {
        let (_, val) = enable(b"ENABLE QRESYNC CONDSTORE\r\n").unwrap();
        let CommandBody::Enable { capabilities } = val else {
            panic!("expected enable");
        };
        assert_eq!(
            capabilities.as_ref(),
            &[Capability::QResync, Capability::CondStore]
        );
    }

    #[test]
    fn test_enable_data() {
        let (_, val) = enable_data(b"ENABLED CONDSTORE\r\n").unwrap();
        assert_eq!(
            val,
            Data::Enabled {
                capabilities: vec![Capability::CondStore]
            }
        );

        let (_, val) = enable_data(b"ENABLED\r\n").unwrap();
        assert_eq!(val, Data::Enabled { capabilities: vec![] });
    }
}
