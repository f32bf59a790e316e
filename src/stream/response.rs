//! The server→client session parser.

use bytes::{Buf, BytesMut};

use crate::{
    error::ParsingError,
    parse::{
        fetch::{StreamableValue, msg_att_simple, streamed_att_start},
        response::{
            continue_req, fetch_start, greeting, response_data, response_fatal, response_tagged,
        },
    },
    stream::{
        FetchEvent, Progress, Response, ResponseOrContinuationRequest, classify,
        contains_line_end, find_line_end,
    },
    types::{
        core::NString,
        fetch::{MessageDataItem, StreamingKind},
    },
};

/// An incremental parser for the server→client response stream.
///
/// `FETCH` responses are delivered as a sub-stream of [`FetchEvent`]s so that
/// large body sections never have to be buffered as a whole.
#[derive(Debug)]
pub struct ResponseParser {
    buffer_limit: usize,
    mode: Mode,
    seen_greeting: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Mode {
    /// Parsing any response line.
    Normal,
    /// Inside a FETCH response, between attributes.
    FetchMiddle {
        /// Whether the next attribute is the first one (no separator yet).
        first: bool,
    },
    /// Streaming the octets of a literal-valued attribute.
    AttributeBytes(u32),
    /// A quoted attribute value is delivered as a single chunk, then ended.
    StreamingQuoted(Option<Vec<u8>>),
    /// A malformed fetch attribute aborted the response; discard input until
    /// the next line terminator.
    DiscardingLine,
}

impl ResponseParser {
    /// The default buffer limit for response lines.
    pub const DEFAULT_BUFFER_LIMIT: usize = 8_192;

    pub fn new(buffer_limit: usize) -> Self {
        Self {
            buffer_limit,
            mode: Mode::Normal,
            seen_greeting: false,
        }
    }

    /// Parses the next response event out of `buffer`.
    ///
    /// Returns `Ok(None)` when the buffered input is a strict prefix of a
    /// valid frame.
    pub fn parse_response_stream(
        &mut self,
        buffer: &mut BytesMut,
    ) -> Result<Option<ResponseOrContinuationRequest>, ParsingError> {
        loop {
            let parsed = match self.mode.clone() {
                Mode::Normal => self.parse_normal(buffer)?,
                Mode::FetchMiddle { first } => match self.parse_fetch_middle(buffer, first) {
                    Ok(parsed) => parsed,
                    Err(error) => {
                        // A broken attribute aborts only this response; the
                        // connection resynchronizes at the next line.
                        log::warn!("discarding malformed fetch response: {error}");
                        self.mode = Mode::DiscardingLine;
                        return Err(error);
                    }
                },
                Mode::AttributeBytes(remaining) => self.parse_attribute_bytes(buffer, remaining),
                Mode::StreamingQuoted(pending) => {
                    let event = match pending {
                        Some(data) => {
                            self.mode = Mode::StreamingQuoted(None);
                            FetchEvent::StreamingBytes(data)
                        }
                        None => {
                            self.mode = Mode::FetchMiddle { first: false };
                            FetchEvent::StreamingEnd
                        }
                    };

                    Some((0, Response::Fetch(event).into()))
                }
                Mode::DiscardingLine => {
                    let Some(line_end) = find_line_end(buffer) else {
                        return Ok(None);
                    };

                    buffer.advance(line_end);
                    self.mode = Mode::Normal;
                    continue;
                }
            };

            return match parsed {
                Some((consumed, event)) => {
                    buffer.advance(consumed);
                    self.seen_greeting = true;

                    Ok(Some(event))
                }
                None => {
                    self.enforce_buffer_limit(buffer)?;

                    Ok(None)
                }
            };
        }
    }

    fn parse_normal(
        &mut self,
        buffer: &[u8],
    ) -> Result<Option<(usize, ResponseOrContinuationRequest)>, ParsingError> {
        if buffer.is_empty() {
            return Ok(None);
        }

        let mut need_more = false;

        // The FETCH head diverts into the attribute sub-stream.
        match classify(fetch_start(buffer))? {
            Progress::Done((remaining, seq)) => {
                self.mode = Mode::FetchMiddle { first: true };

                return Ok(Some((
                    buffer.len() - remaining.len(),
                    Response::Fetch(FetchEvent::Start(seq)).into(),
                )));
            }
            Progress::NeedMoreBytes => need_more = true,
            Progress::NoMatch => {}
        }

        match classify(continue_req(buffer))? {
            Progress::Done((remaining, request)) => {
                return Ok(Some((
                    buffer.len() - remaining.len(),
                    ResponseOrContinuationRequest::ContinuationRequest(request),
                )));
            }
            Progress::NeedMoreBytes => need_more = true,
            Progress::NoMatch => {}
        }

        // The greeting is only valid as the very first message.
        if !self.seen_greeting {
            match classify(greeting(buffer))? {
                Progress::Done((remaining, greeting)) => {
                    return Ok(Some((
                        buffer.len() - remaining.len(),
                        Response::Greeting(greeting).into(),
                    )));
                }
                Progress::NeedMoreBytes => need_more = true,
                Progress::NoMatch => {}
            }
        }

        match classify(response_fatal(buffer))? {
            Progress::Done((remaining, bye)) => {
                return Ok(Some((
                    buffer.len() - remaining.len(),
                    Response::Fatal(bye).into(),
                )));
            }
            Progress::NeedMoreBytes => need_more = true,
            Progress::NoMatch => {}
        }

        match classify(response_data(buffer))? {
            Progress::Done((remaining, data)) => {
                return Ok(Some((
                    buffer.len() - remaining.len(),
                    Response::Untagged(data).into(),
                )));
            }
            Progress::NeedMoreBytes => need_more = true,
            Progress::NoMatch => {}
        }

        match classify(response_tagged(buffer))? {
            Progress::Done((remaining, tagged)) => {
                return Ok(Some((
                    buffer.len() - remaining.len(),
                    Response::Tagged(tagged).into(),
                )));
            }
            Progress::NeedMoreBytes => need_more = true,
            Progress::NoMatch => {}
        }

        if need_more {
            Ok(None)
        } else {
            Err(ParsingError::Malformed("unrecognized response"))
        }
    }

    fn parse_fetch_middle(
        &mut self,
        buffer: &[u8],
        first: bool,
    ) -> Result<Option<(usize, ResponseOrContinuationRequest)>, ParsingError> {
        if buffer.is_empty() {
            return Ok(None);
        }

        let mut at = 0;

        if !first {
            match buffer[0] {
                // The closing paren ends the FETCH response.
                b')' => {
                    return match classify(crate::parse::newline(&buffer[1..]))? {
                        Progress::Done((remaining, ())) => {
                            self.mode = Mode::Normal;

                            Ok(Some((
                                buffer.len() - remaining.len(),
                                Response::Fetch(FetchEvent::Finish).into(),
                            )))
                        }
                        Progress::NeedMoreBytes => Ok(None),
                        Progress::NoMatch => {
                            Err(ParsingError::Malformed("expected newline after fetch"))
                        }
                    };
                }
                b' ' => at = 1,
                _ => return Err(ParsingError::Malformed("expected fetch attribute separator")),
            }
        }

        let window = &buffer[at..];
        if window.is_empty() {
            return Ok(None);
        }

        // Streamed attributes first: their names overlap with the simple
        // forms (`BODY[...]` vs. `BODY`, `RFC822.TEXT` vs. `RFC822.SIZE`).
        match classify(streamed_att_start(window))? {
            Progress::Done((remaining, (kind, value))) => {
                let consumed = at + (window.len() - remaining.len());

                let event = match value {
                    StreamableValue::Literal { length } => {
                        self.mode = Mode::AttributeBytes(length);
                        FetchEvent::StreamingBegin {
                            kind,
                            byte_count: length,
                        }
                    }
                    StreamableValue::Quoted(data) => {
                        let byte_count = u32::try_from(data.len())
                            .map_err(|_| ParsingError::Malformed("oversized quoted value"))?;
                        self.mode = Mode::StreamingQuoted(Some(data));
                        FetchEvent::StreamingBegin { kind, byte_count }
                    }
                    StreamableValue::Nil => {
                        self.mode = Mode::FetchMiddle { first: false };
                        FetchEvent::Simple(nil_item(kind))
                    }
                };

                return Ok(Some((consumed, Response::Fetch(event).into())));
            }
            Progress::NeedMoreBytes => return Ok(None),
            Progress::NoMatch => {}
        }

        match classify(msg_att_simple(window))? {
            Progress::Done((remaining, item)) => {
                self.mode = Mode::FetchMiddle { first: false };

                Ok(Some((
                    at + (window.len() - remaining.len()),
                    Response::Fetch(FetchEvent::Simple(item)).into(),
                )))
            }
            Progress::NeedMoreBytes => Ok(None),
            Progress::NoMatch => Err(ParsingError::Malformed("unrecognized fetch attribute")),
        }
    }

    fn parse_attribute_bytes(
        &mut self,
        buffer: &[u8],
        remaining: u32,
    ) -> Option<(usize, ResponseOrContinuationRequest)> {
        if remaining == 0 {
            self.mode = Mode::FetchMiddle { first: false };

            return Some((0, Response::Fetch(FetchEvent::StreamingEnd).into()));
        }

        if buffer.is_empty() {
            return None;
        }

        let take = (remaining as usize).min(buffer.len());
        self.mode = Mode::AttributeBytes(remaining - take as u32);

        Some((
            take,
            Response::Fetch(FetchEvent::StreamingBytes(buffer[..take].to_vec())).into(),
        ))
    }

    fn enforce_buffer_limit(&self, buffer: &BytesMut) -> Result<(), ParsingError> {
        if matches!(self.mode, Mode::AttributeBytes(_)) {
            return Ok(());
        }

        if buffer.len() > self.buffer_limit && !contains_line_end(buffer) {
            return Err(ParsingError::LineTooLong {
                limit: self.buffer_limit,
            });
        }

        Ok(())
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_LIMIT)
    }
}

impl From<Response> for ResponseOrContinuationRequest {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

/// The simple item standing in for a streamed attribute whose value is `NIL`.
fn nil_item(kind: StreamingKind) -> MessageDataItem {
    match kind {
        StreamingKind::BodyExt { section, origin } => MessageDataItem::BodyExt {
            section,
            origin,
            data: NString(None),
        },
        StreamingKind::Rfc822 => MessageDataItem::Rfc822(NString(None)),
        StreamingKind::Rfc822Header => MessageDataItem::Rfc822Header(NString(None)),
        StreamingKind::Rfc822Text => MessageDataItem::Rfc822Text(NString(None)),
        StreamingKind::Binary { section } => MessageDataItem::Binary {
            section,
            data: NString(None),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        fetch::MessageDataItem,
        flag::{Flag, FlagFetch},
        response::{Data, GreetingKind, StatusKind},
        section::Section,
    };

    fn drain(
        parser: &mut ResponseParser,
        buffer: &mut BytesMut,
    ) -> Vec<ResponseOrContinuationRequest> {
        let mut events = Vec::new();

        while let Some(event) = parser.parse_response_stream(buffer).unwrap() {
            events.push(event);
        }

        events
    }

    fn fetch_events(events: &[ResponseOrContinuationRequest]) -> Vec<FetchEvent> {
        events
            .iter()
            .filter_map(|event| match event {
                ResponseOrContinuationRequest::Response(Response::Fetch(event)) => {
                    Some(event.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_greeting_is_only_first() {
        let mut parser = ResponseParser::default();
        let mut buffer =
            BytesMut::from(&b"* OK IMAP4rev1 server ready\r\n* OK still here\r\n"[..]);

        let events = drain(&mut parser, &mut buffer);

        assert!(matches!(
            &events[0],
            ResponseOrContinuationRequest::Response(Response::Greeting(greeting))
                if greeting.kind == GreetingKind::Ok
        ));
        assert!(matches!(
            &events[1],
            ResponseOrContinuationRequest::Response(Response::Untagged(Data::Condition(_)))
        ));
    }

    #[test]
    fn test_continuation_request() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(&b"+ idling\r\n"[..]);

        let events = drain(&mut parser, &mut buffer);

        assert!(matches!(
            events[0],
            ResponseOrContinuationRequest::ContinuationRequest(_)
        ));
    }

    #[test]
    fn test_untagged_bye_is_fatal() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(&b"* BYE shutting down\r\n"[..]);

        let events = drain(&mut parser, &mut buffer);

        assert!(matches!(
            events[0],
            ResponseOrContinuationRequest::Response(Response::Fatal(_))
        ));
    }

    #[test]
    fn test_fetch_simple_attributes() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(
            &b"* 1 FETCH (UID 54 RFC822.SIZE 40639)\r\n* 2 FETCH (UID 55 RFC822.SIZE 27984)\r\ntag OK Fetch completed.\r\n"[..],
        );

        let events = drain(&mut parser, &mut buffer);

        let fetch = fetch_events(&events);
        assert_eq!(
            fetch,
            vec![
                FetchEvent::Start(1.try_into().unwrap()),
                FetchEvent::Simple(MessageDataItem::Uid(54.try_into().unwrap())),
                FetchEvent::Simple(MessageDataItem::Rfc822Size(40639)),
                FetchEvent::Finish,
                FetchEvent::Start(2.try_into().unwrap()),
                FetchEvent::Simple(MessageDataItem::Uid(55.try_into().unwrap())),
                FetchEvent::Simple(MessageDataItem::Rfc822Size(27984)),
                FetchEvent::Finish,
            ]
        );
        assert!(matches!(
            events.last().unwrap(),
            ResponseOrContinuationRequest::Response(Response::Tagged(tagged))
                if tagged.body.kind == StatusKind::Ok
        ));
    }

    #[test]
    fn test_fetch_streamed_body_section() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(
            &b"* 2 FETCH (FLAGS (\\Deleted) BODY[TEXT] {1}\r\nX)\r\n2 OK Fetch completed.\r\n"[..],
        );

        let events = drain(&mut parser, &mut buffer);

        let fetch = fetch_events(&events);
        assert_eq!(
            fetch,
            vec![
                FetchEvent::Start(2.try_into().unwrap()),
                FetchEvent::Simple(MessageDataItem::Flags(vec![FlagFetch::Flag(
                    Flag::Deleted
                )])),
                FetchEvent::StreamingBegin {
                    kind: StreamingKind::BodyExt {
                        section: Some(Section::Text(None)),
                        origin: None,
                    },
                    byte_count: 1,
                },
                FetchEvent::StreamingBytes(b"X".to_vec()),
                FetchEvent::StreamingEnd,
                FetchEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_fetch_streamed_quoted_value() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer =
            BytesMut::from(&b"* 3 FETCH (RFC822.TEXT \"abc\")\r\n"[..]);

        let events = drain(&mut parser, &mut buffer);

        let fetch = fetch_events(&events);
        assert_eq!(
            fetch,
            vec![
                FetchEvent::Start(3.try_into().unwrap()),
                FetchEvent::StreamingBegin {
                    kind: StreamingKind::Rfc822Text,
                    byte_count: 3,
                },
                FetchEvent::StreamingBytes(b"abc".to_vec()),
                FetchEvent::StreamingEnd,
                FetchEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_fetch_nil_body_section() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(&b"* 4 FETCH (BODY[] NIL)\r\n"[..]);

        let events = drain(&mut parser, &mut buffer);

        let fetch = fetch_events(&events);
        assert_eq!(
            fetch,
            vec![
                FetchEvent::Start(4.try_into().unwrap()),
                FetchEvent::Simple(MessageDataItem::BodyExt {
                    section: None,
                    origin: None,
                    data: NString(None),
                }),
                FetchEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_fetch_literal_streams_in_chunks() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(&b"* 1 FETCH (BODY[] {10}\r\n01234"[..]);

        let events = drain(&mut parser, &mut buffer);
        let fetch = fetch_events(&events);
        assert_eq!(
            fetch.last(),
            Some(&FetchEvent::StreamingBytes(b"01234".to_vec()))
        );

        buffer.extend_from_slice(b"56789)\r\n");
        let events = drain(&mut parser, &mut buffer);
        let fetch = fetch_events(&events);
        assert_eq!(
            fetch,
            vec![
                FetchEvent::StreamingBytes(b"56789".to_vec()),
                FetchEvent::StreamingEnd,
                FetchEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_fetch_zero_length_literal() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer = BytesMut::from(&b"* 1 FETCH (BODY[] {0}\r\n)\r\n"[..]);

        let events = drain(&mut parser, &mut buffer);

        let fetch = fetch_events(&events);
        assert_eq!(
            fetch,
            vec![
                FetchEvent::Start(1.try_into().unwrap()),
                FetchEvent::StreamingBegin {
                    kind: StreamingKind::BodyExt {
                        section: None,
                        origin: None,
                    },
                    byte_count: 0,
                },
                FetchEvent::StreamingEnd,
                FetchEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_malformed_fetch_attribute_resynchronizes() {
        let mut parser = ResponseParser::default();
        parser.seen_greeting = true;
        let mut buffer =
            BytesMut::from(&b"* 1 FETCH (GARBAGE !!!)\r\n* 2 EXISTS\r\n"[..]);

        // The FETCH start parses...
        let event = parser.parse_response_stream(&mut buffer).unwrap().unwrap();
        assert!(matches!(
            event,
            ResponseOrContinuationRequest::Response(Response::Fetch(FetchEvent::Start(_)))
        ));

        // ... the broken attribute surfaces an error ...
        assert!(parser.parse_response_stream(&mut buffer).is_err());

        // ... and parsing resumes at the next line.
        let event = parser.parse_response_stream(&mut buffer).unwrap().unwrap();
        assert_eq!(
            event,
            ResponseOrContinuationRequest::Response(Response::Untagged(Data::Exists(2)))
        );
    }

    #[test]
    fn test_drip_feed_equivalence() {
        let input =
            b"* 2 FETCH (FLAGS (\\Deleted) BODY[TEXT] {1}\r\nX)\r\n2 OK Fetch completed.\r\n";

        let mut all_at_once = ResponseParser::default();
        all_at_once.seen_greeting = true;
        let mut buffer = BytesMut::from(&input[..]);
        let events_a = drain(&mut all_at_once, &mut buffer);

        let mut byte_by_byte = ResponseParser::default();
        byte_by_byte.seen_greeting = true;
        let mut buffer = BytesMut::new();
        let mut events_b = Vec::new();
        for byte in input {
            buffer.extend_from_slice(&[*byte]);
            while let Some(event) = byte_by_byte.parse_response_stream(&mut buffer).unwrap() {
                events_b.push(event);
            }
        }

        assert_eq!(events_a, events_b);
    }

    #[test]
    fn test_line_too_long() {
        let mut parser = ResponseParser::new(16);
        parser.seen_greeting = true;
        let mut buffer =
            BytesMut::from(&b"* OK a response line well beyond the configured limit"[..]);

        assert_eq!(
            parser.parse_response_stream(&mut buffer),
            Err(ParsingError::LineTooLong { limit: 16 })
        );
    }
}
