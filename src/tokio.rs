//! Transport adapter for [`tokio_util::codec`] pipelines.
//!
//! Turns the streaming session parsers into incremental message-boundary
//! decoders: bytes are appended to the framed buffer by the transport, and
//! each `decode` call drains one event or reports that more bytes are needed.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::{
    codec::{CommandEncoder, ResponseEncoder},
    error::ParsingError,
    stream::{
        CommandParser, CommandStreamPart, PartialCommandStream, ResponseOrContinuationRequest,
        ResponseParser,
    },
};

/// How much of the offending input an [`ImapCodecError`] keeps for
/// diagnostics.
const ERROR_CONTEXT_BYTES: usize = 64;

/// An error of the transport adapter, carrying the head of the offending
/// input for diagnostics.
#[derive(Debug)]
pub enum ImapCodecError {
    Io(std::io::Error),
    Parsing {
        error: ParsingError,
        /// The first bytes of the input that failed to parse.
        input: Vec<u8>,
    },
}

impl PartialEq for ImapCodecError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Io(left), Self::Io(right)) => left.kind() == right.kind(),
            (
                Self::Parsing { error: left, .. },
                Self::Parsing { error: right, .. },
            ) => left == right,
            _ => false,
        }
    }
}

impl From<std::io::Error> for ImapCodecError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

impl std::fmt::Display for ImapCodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Io(error) => write!(f, "i/o error: {error}"),
            Self::Parsing { error, .. } => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for ImapCodecError {}

fn error_context(src: &BytesMut) -> Vec<u8> {
    src[..src.len().min(ERROR_CONTEXT_BYTES)].to_vec()
}

/// The server side: decodes command stream parts, encodes responses.
#[derive(Debug)]
pub struct ImapServerCodec {
    parser: CommandParser,
    encoder: ResponseEncoder,
}

impl ImapServerCodec {
    pub fn new(buffer_limit: usize) -> Self {
        Self {
            parser: CommandParser::new(buffer_limit),
            encoder: ResponseEncoder::new(),
        }
    }

    /// See [`CommandParser::begin_authentication`].
    pub fn begin_authentication(&mut self) {
        self.parser.begin_authentication();
    }

    /// See [`CommandParser::end_authentication`].
    pub fn end_authentication(&mut self) {
        self.parser.end_authentication();
    }
}

impl Default for ImapServerCodec {
    fn default() -> Self {
        Self::new(CommandParser::DEFAULT_BUFFER_LIMIT)
    }
}

impl Decoder for ImapServerCodec {
    type Item = PartialCommandStream;
    type Error = ImapCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.parser
            .parse_command_stream(src)
            .map_err(|error| ImapCodecError::Parsing {
                error,
                input: error_context(src),
            })
    }
}

impl Encoder<&ResponseOrContinuationRequest> for ImapServerCodec {
    type Error = ImapCodecError;

    fn encode(
        &mut self,
        item: &ResponseOrContinuationRequest,
        dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        let mut out = Vec::new();
        self.encoder.encode(item, &mut out);
        dst.extend_from_slice(&out);

        Ok(())
    }
}

/// The client side: decodes responses, encodes command stream parts.
#[derive(Debug)]
pub struct ImapClientCodec {
    parser: ResponseParser,
    encoder: CommandEncoder,
}

impl ImapClientCodec {
    pub fn new(buffer_limit: usize) -> Self {
        Self {
            parser: ResponseParser::new(buffer_limit),
            encoder: CommandEncoder::new(false),
        }
    }

    /// Sets the capabilities guiding literal transmission; see
    /// [`CommandEncoder::set_capabilities`].
    pub fn set_capabilities(&mut self, capabilities: &[crate::types::response::Capability]) {
        self.encoder.set_capabilities(capabilities);
    }
}

impl Default for ImapClientCodec {
    fn default() -> Self {
        Self::new(ResponseParser::DEFAULT_BUFFER_LIMIT)
    }
}

impl Decoder for ImapClientCodec {
    type Item = ResponseOrContinuationRequest;
    type Error = ImapCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.parser
            .parse_response_stream(src)
            .map_err(|error| ImapCodecError::Parsing {
                error,
                input: error_context(src),
            })
    }
}

impl Encoder<&CommandStreamPart> for ImapClientCodec {
    type Error = ImapCodecError;

    fn encode(
        &mut self,
        item: &CommandStreamPart,
        dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        let mut out = Vec::new();
        self.encoder.encode(item, &mut out);
        dst.extend_from_slice(&out);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{FetchEvent, Response};

    #[test]
    fn test_server_codec_decodes_commands() {
        let mut codec = ImapServerCodec::default();
        let mut buffer = BytesMut::from(&b"a NOOP\r\n"[..]);

        let item = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(matches!(item.command, Some(CommandStreamPart::Tagged(_))));

        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_server_codec_wraps_errors_with_input() {
        let mut codec = ImapServerCodec::default();
        let mut buffer = BytesMut::from(&b"a FROBNICATE\r\n"[..]);

        let Err(ImapCodecError::Parsing { error, input }) = codec.decode(&mut buffer) else {
            panic!("expected parsing error");
        };
        assert!(matches!(error, ParsingError::Malformed(_)));
        assert!(input.starts_with(b"a FROBNICATE"));
    }

    #[test]
    fn test_client_codec_roundtrip() {
        let mut codec = ImapClientCodec::default();
        let mut buffer = BytesMut::from(&b"* OK ready\r\n"[..]);

        let item = codec.decode(&mut buffer).unwrap().unwrap();
        assert!(matches!(
            item,
            ResponseOrContinuationRequest::Response(Response::Greeting(_))
        ));

        let mut out = BytesMut::new();
        codec
            .encode(
                &CommandStreamPart::Tagged(
                    crate::types::command::Command::new(
                        "a",
                        crate::types::command::CommandBody::Noop,
                    )
                    .unwrap(),
                ),
                &mut out,
            )
            .unwrap();
        assert_eq!(&out[..], b"a NOOP\r\n");
    }

    #[test]
    fn test_server_codec_encodes_fetch_stream() {
        let mut codec = ImapServerCodec::default();
        let mut out = BytesMut::new();

        for event in [
            FetchEvent::Start(1.try_into().unwrap()),
            FetchEvent::Simple(crate::types::fetch::MessageDataItem::Rfc822Size(7)),
            FetchEvent::Finish,
        ] {
            codec
                .encode(
                    &ResponseOrContinuationRequest::Response(Response::Fetch(event)),
                    &mut out,
                )
                .unwrap();
        }

        assert_eq!(&out[..], b"* 1 FETCH (RFC822.SIZE 7)\r\n");
    }
}
