//! Encoding of commands and responses back to their wire form.

pub(crate) mod encode;

use crate::{
    stream::{CommandStreamPart, ResponseOrContinuationRequest},
    types::response::Capability,
};
use self::encode::{EncodeContext, EncodeIntoContext};

/// Serializes [`CommandStreamPart`]s.
///
/// The encoder is parameterised by the negotiated capabilities (`LITERAL+`,
/// `LITERAL-`, `BINARY`) and an optional logging mode. In logging mode all
/// user-sensitive payloads (passwords, authentication exchanges, mailbox
/// names, internal dates, appended message octets, Gmail labels) are replaced
/// by a `∅` placeholder, with literal lengths recomputed to match, producing
/// a redacted transcript that is still structurally byte-faithful.
#[derive(Clone, Debug, Default)]
pub struct CommandEncoder {
    capabilities: Vec<Capability>,
    logging_mode: bool,
}

impl CommandEncoder {
    pub fn new(logging_mode: bool) -> Self {
        Self {
            capabilities: Vec::new(),
            logging_mode,
        }
    }

    /// Sets the capabilities the peer advertised. Without `LITERAL+` (or
    /// `LITERAL-` for small payloads) every literal is emitted as
    /// synchronizing.
    pub fn set_capabilities(&mut self, capabilities: &[Capability]) {
        self.capabilities = capabilities.to_vec();
    }

    /// Appends the wire form of `part` to `out` and returns the number of
    /// bytes written.
    pub fn encode(&self, part: &CommandStreamPart, out: &mut Vec<u8>) -> usize {
        let mut ctx = EncodeContext::new(&self.capabilities, self.logging_mode);

        // Writing into a Vec can't fail.
        part.encode_ctx(&mut ctx).unwrap();

        let encoded = ctx.into_bytes();
        out.extend_from_slice(&encoded);

        encoded.len()
    }
}

/// Serializes [`ResponseOrContinuationRequest`]s.
///
/// The encoder keeps a little state across calls so that the events of a
/// FETCH sub-stream concatenate into one well-formed response line.
#[derive(Clone, Debug, Default)]
pub struct ResponseEncoder {
    /// Whether at least one attribute of the current FETCH was written.
    fetch_attribute_written: bool,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the wire form of `response` to `out` and returns the number of
    /// bytes written.
    pub fn encode(
        &mut self,
        response: &ResponseOrContinuationRequest,
        out: &mut Vec<u8>,
    ) -> usize {
        use crate::stream::{FetchEvent, Response};

        let mut ctx = EncodeContext::new(&[], false);

        // Fetch sub-events need a separator between attributes; everything
        // else is self-contained.
        if let ResponseOrContinuationRequest::Response(Response::Fetch(event)) = response {
            let first = !self.fetch_attribute_written;

            self.fetch_attribute_written = match event {
                FetchEvent::Start(_) => false,
                FetchEvent::Simple(_) | FetchEvent::StreamingBegin { .. } => true,
                FetchEvent::StreamingBytes(_) | FetchEvent::StreamingEnd => {
                    self.fetch_attribute_written
                }
                FetchEvent::Finish => false,
            };

            encode::encode_fetch_event(event, first, &mut ctx).unwrap();
        } else {
            response.encode_ctx(&mut ctx).unwrap();
        }

        let encoded = ctx.into_bytes();
        out.extend_from_slice(&encoded);

        encoded.len()
    }
}
