//! End-to-end scenarios: raw wire bytes in, typed event streams out, and
//! back.

use bytes::BytesMut;
use imap_wire::{
    ParsingError,
    codec::{CommandEncoder, ResponseEncoder},
    framing::SynchronizingLiteralParser,
    stream::{
        CommandParser, CommandStreamPart, FetchEvent, Response, ResponseOrContinuationRequest,
        ResponseParser,
    },
    types::{
        command::{AppendMessageData, CommandBody},
        fetch::{MessageDataItem, StreamingKind},
        flag::{Flag, FlagFetch},
        response::Capability,
        search::SearchKey,
        section::Section,
    },
};

fn drain_commands(
    parser: &mut CommandParser,
    buffer: &mut BytesMut,
) -> (usize, Vec<CommandStreamPart>) {
    let mut continuations = 0;
    let mut parts = Vec::new();

    while let Some(partial) = parser.parse_command_stream(buffer).unwrap() {
        continuations += partial.synchronizing_literal_count;
        if let Some(part) = partial.command {
            parts.push(part);
        }
    }

    (continuations, parts)
}

fn drain_responses(
    parser: &mut ResponseParser,
    buffer: &mut BytesMut,
) -> Vec<ResponseOrContinuationRequest> {
    let mut events = Vec::new();

    while let Some(event) = parser.parse_response_stream(buffer).unwrap() {
        events.push(event);
    }

    events
}

#[test]
fn scenario_login_with_quoted_strings() {
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&b"tag LOGIN \"foo\" \"bar\"\r\n"[..]);

    let (continuations, parts) = drain_commands(&mut parser, &mut buffer);

    assert_eq!(continuations, 0);
    let [CommandStreamPart::Tagged(command)] = parts.as_slice() else {
        panic!("expected a single command, got {parts:?}");
    };
    assert_eq!(command.tag.inner(), "tag");
    let CommandBody::Login { username, password } = &command.body else {
        panic!("expected login");
    };
    assert_eq!(username.as_bytes(), b"foo");
    assert_eq!(password.as_bytes(), b"bar");
}

#[test]
fn scenario_login_with_two_synchronizing_literals() {
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&b"tag LOGIN {3}\r\n123 {3}\r\n456\r\n"[..]);

    let (continuations, parts) = drain_commands(&mut parser, &mut buffer);

    assert_eq!(continuations, 2);
    let [CommandStreamPart::Tagged(command)] = parts.as_slice() else {
        panic!("expected a single command, got {parts:?}");
    };
    let CommandBody::Login { username, password } = &command.body else {
        panic!("expected login");
    };
    assert_eq!(username.as_bytes(), b"123");
    assert_eq!(password.as_bytes(), b"456");
}

#[test]
fn scenario_two_fetch_responses_and_completion() {
    let mut parser = ResponseParser::new(8_192);
    let mut buffer = BytesMut::from(
        &b"* 1 FETCH (UID 54 RFC822.SIZE 40639)\r\n\
           * 2 FETCH (UID 55 RFC822.SIZE 27984)\r\n\
           tag OK Fetch completed.\r\n"[..],
    );

    // The greeting was already consumed in an earlier exchange.
    let mut greeted = BytesMut::from(&b"* OK ready\r\n"[..]);
    parser.parse_response_stream(&mut greeted).unwrap().unwrap();

    let events = drain_responses(&mut parser, &mut buffer);

    let fetch: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ResponseOrContinuationRequest::Response(Response::Fetch(event)) => {
                Some(event.clone())
            }
            _ => None,
        })
        .collect();

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
            if tagged.tag.inner() == "tag" && tagged.body.text.inner() == "Fetch completed."
    ));
}

#[test]
fn scenario_fetch_with_streamed_body_section() {
    let mut parser = ResponseParser::new(8_192);
    let mut greeted = BytesMut::from(&b"* OK ready\r\n"[..]);
    parser.parse_response_stream(&mut greeted).unwrap().unwrap();

    let mut buffer = BytesMut::from(
        &b"* 2 FETCH (FLAGS (\\Deleted) BODY[TEXT] {1}\r\nX)\r\n2 OK Fetch completed.\r\n"[..],
    );

    let events = drain_responses(&mut parser, &mut buffer);

    let fetch: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            ResponseOrContinuationRequest::Response(Response::Fetch(event)) => {
                Some(event.clone())
            }
            _ => None,
        })
        .collect();

    assert_eq!(
        fetch,
        vec![
            FetchEvent::Start(2.try_into().unwrap()),
            FetchEvent::Simple(MessageDataItem::Flags(vec![FlagFetch::Flag(Flag::Deleted)])),
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
    assert!(matches!(
        events.last().unwrap(),
        ResponseOrContinuationRequest::Response(Response::Tagged(tagged))
            if tagged.tag.inner() == "2"
    ));
}

#[test]
fn scenario_append_with_literal_plus() {
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&b"tag APPEND box (\\Seen) {1+}\r\na\r\n"[..]);

    let (continuations, parts) = drain_commands(&mut parser, &mut buffer);

    assert_eq!(continuations, 0);
    assert_eq!(parts.len(), 5);
    assert!(matches!(
        &parts[0],
        CommandStreamPart::AppendStart { tag, mailbox }
            if tag.inner() == "tag" && mailbox.as_bytes() == b"box"
    ));
    let CommandStreamPart::AppendBeginMessage(message) = &parts[1] else {
        panic!("expected begin message");
    };
    assert_eq!(message.options.flags, vec![Flag::Seen]);
    assert_eq!(
        message.data,
        AppendMessageData::Literal {
            byte_count: 1,
            binary: false
        }
    );
    assert_eq!(
        parts[2],
        CommandStreamPart::AppendMessageBytes {
            data: b"a".to_vec(),
            is_final: true,
        }
    );
    assert_eq!(parts[3], CommandStreamPart::AppendEndMessage);
    assert_eq!(parts[4], CommandStreamPart::AppendFinish);
}

#[test]
fn scenario_search_parse_and_reencode() {
    let input = b"tag SEARCH CHARSET UTF-8 DRAFT TO \"foo\"\r\n";

    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&input[..]);
    let (_, parts) = drain_commands(&mut parser, &mut buffer);

    let [CommandStreamPart::Tagged(command)] = parts.as_slice() else {
        panic!("expected a single command");
    };
    let CommandBody::Search { charset, criteria, .. } = &command.body else {
        panic!("expected search");
    };
    assert_eq!(charset.as_ref().unwrap().as_str(), "UTF-8");
    let SearchKey::And(keys) = criteria else {
        panic!("expected an implicit AND");
    };
    assert_eq!(keys.as_ref()[0], SearchKey::Draft);
    assert!(matches!(&keys.as_ref()[1], SearchKey::To(to) if to.as_bytes() == b"foo"));

    // With no capabilities negotiated, encoding yields the original bytes.
    let mut out = Vec::new();
    let written = CommandEncoder::new(false).encode(&parts[0], &mut out);
    assert_eq!(out, input);
    assert_eq!(written, input.len());
}

#[test]
fn scenario_idle_round_trip() {
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&b"a1 IDLE\r\nDONE\r\na2 NOOP\r\n"[..]);

    let (_, parts) = drain_commands(&mut parser, &mut buffer);

    assert_eq!(parts.len(), 3);
    assert!(matches!(&parts[0], CommandStreamPart::Tagged(command)
        if command.body == CommandBody::Idle));
    assert_eq!(parts[1], CommandStreamPart::IdleDone);
    assert!(matches!(&parts[2], CommandStreamPart::Tagged(command)
        if command.body == CommandBody::Noop));
}

#[test]
fn command_drip_feed_equivalence() {
    let input: &[u8] = b"tag LOGIN {3}\r\n123 {3}\r\n456\r\n\
                         tag2 APPEND box {4+}\r\nwxyz\r\n\
                         tag3 SEARCH UNSEEN\r\n";

    let mut reference_parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(input);
    let (reference_continuations, reference_parts) =
        drain_commands(&mut reference_parser, &mut buffer);

    for chunk_size in [1, 2, 3, 7, 11] {
        let mut parser = CommandParser::new(1_000);
        let mut buffer = BytesMut::new();
        let mut continuations = 0;
        let mut parts = Vec::new();

        for chunk in input.chunks(chunk_size) {
            buffer.extend_from_slice(chunk);
            let (new_continuations, new_parts) = drain_commands(&mut parser, &mut buffer);
            continuations += new_continuations;
            parts.extend(new_parts);
        }

        assert_eq!(continuations, reference_continuations, "chunk {chunk_size}");

        // Byte chunking may split streamed append payloads differently, so
        // chunks are coalesced before comparing.
        assert_eq!(
            coalesce(parts),
            coalesce(reference_parts.clone()),
            "chunk {chunk_size}"
        );
    }
}

/// Merges adjacent `AppendMessageBytes` chunks.
fn coalesce(parts: Vec<CommandStreamPart>) -> Vec<CommandStreamPart> {
    let mut merged: Vec<CommandStreamPart> = Vec::new();

    for part in parts {
        match (merged.last_mut(), part) {
            (
                Some(CommandStreamPart::AppendMessageBytes { data, is_final }),
                CommandStreamPart::AppendMessageBytes {
                    data: next,
                    is_final: next_is_final,
                },
            ) => {
                data.extend_from_slice(&next);
                *is_final = next_is_final;
            }
            (_, part) => merged.push(part),
        }
    }

    merged
}

#[test]
fn framing_prefix_is_decodable_without_need_more() {
    let input = b"tag LOGIN {3}\r\n123 {3}\r\n456\r\ntag2 NOOP\r\ntag3 CAPA";

    let mut framing = SynchronizingLiteralParser::new();
    let result = framing.parse_continuations_necessary(input).unwrap();

    // The partial last line is excluded from the frame prefix.
    assert_eq!(&input[result.maximum_valid_bytes..], b"tag3 CAPA");
    assert_eq!(result.synchronizing_literal_count, 2);

    // Decoding the prefix consumes exactly those bytes.
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&input[..result.maximum_valid_bytes]);
    let (_, parts) = drain_commands(&mut parser, &mut buffer);
    assert!(buffer.is_empty());
    assert_eq!(parts.len(), 2);
}

#[test]
fn zero_length_literal_yields_empty_string() {
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&b"tag LOGIN {0}\r\n \"pw\"\r\n"[..]);

    let (continuations, parts) = drain_commands(&mut parser, &mut buffer);

    assert_eq!(continuations, 1);
    let [CommandStreamPart::Tagged(command)] = parts.as_slice() else {
        panic!("expected a single command");
    };
    let CommandBody::Login { username, .. } = &command.body else {
        panic!("expected login");
    };
    assert_eq!(username.as_bytes(), b"");
}

#[test]
fn buffer_limit_without_newline_is_line_too_long() {
    let mut parser = ResponseParser::new(80_000);
    let mut buffer = BytesMut::new();
    buffer.resize(80_001, b'a');

    assert_eq!(
        parser.parse_response_stream(&mut buffer),
        Err(ParsingError::LineTooLong { limit: 80_000 })
    );
}

#[test]
fn append_literal_bytes_are_exempt_from_the_line_bound() {
    let mut parser = CommandParser::new(64);
    let mut buffer = BytesMut::from(&b"tag APPEND box {100000+}\r\n"[..]);

    let (_, parts) = drain_commands(&mut parser, &mut buffer);
    assert!(matches!(
        parts.last(),
        Some(CommandStreamPart::AppendBeginMessage(_))
    ));

    // A body chunk far beyond the line limit streams through.
    buffer.extend_from_slice(&vec![b'x'; 1000]);
    let (_, parts) = drain_commands(&mut parser, &mut buffer);
    assert!(matches!(
        parts.last(),
        Some(CommandStreamPart::AppendMessageBytes { is_final: false, .. })
    ));
}

#[test]
fn sequence_number_boundaries() {
    let mut parser = CommandParser::new(1_000);

    let mut buffer = BytesMut::from(&b"a FETCH 4294967295 FLAGS\r\n"[..]);
    let (_, parts) = drain_commands(&mut parser, &mut buffer);
    assert!(matches!(&parts[0], CommandStreamPart::Tagged(_)));

    let mut buffer = BytesMut::from(&b"a FETCH 0 FLAGS\r\n"[..]);
    assert!(parser.parse_command_stream(&mut buffer).is_err());
}

#[test]
fn responses_encode_back_to_the_wire() {
    let inputs: &[&[u8]] = &[
        b"* 42 EXISTS\r\n",
        b"* CAPABILITY IMAP4rev1 LITERAL+ IDLE\r\n",
        b"* LIST (\\Noselect) \"/\" bbb\r\n",
        b"* SEARCH 2 3 6\r\n",
        b"* ESEARCH (TAG \"A282\") MIN 2 COUNT 3\r\n",
        b"* VANISHED (EARLIER) 300:310\r\n",
        b"* STATUS INBOX (MESSAGES 231 UIDNEXT 44292)\r\n",
        b"* NAMESPACE ((\"\" \"/\")) NIL NIL\r\n",
        b"* QUOTA \"\" (STORAGE 10 512)\r\n",
        b"* BYE shutting down\r\n",
        b"A1 OK [READ-WRITE] SELECT completed\r\n",
        b"+ Ready for literal data\r\n",
    ];

    for input in inputs {
        let mut parser = ResponseParser::new(8_192);
        let mut greeted = BytesMut::from(&b"* OK ready\r\n"[..]);
        parser.parse_response_stream(&mut greeted).unwrap().unwrap();

        let mut buffer = BytesMut::from(*input);
        let event = parser
            .parse_response_stream(&mut buffer)
            .unwrap()
            .unwrap_or_else(|| panic!("no event for {input:?}"));

        let mut out = Vec::new();
        ResponseEncoder::new().encode(&event, &mut out);
        assert_eq!(
            String::from_utf8_lossy(&out),
            String::from_utf8_lossy(input),
            "round trip failed"
        );
    }
}

#[test]
fn commands_encode_back_to_the_wire() {
    let inputs: &[&[u8]] = &[
        b"a NOOP\r\n",
        b"a LOGIN foo bar\r\n",
        b"a SELECT INBOX\r\n",
        b"a SELECT INBOX (CONDSTORE)\r\n",
        b"a RENAME foo bar\r\n",
        b"a STATUS INBOX (MESSAGES UNSEEN)\r\n",
        b"a LIST (SUBSCRIBED) \"\" % RETURN (CHILDREN)\r\n",
        b"a ENABLE QRESYNC\r\n",
        b"a UID FETCH 1:* (FLAGS UID) (CHANGEDSINCE 12345)\r\n",
        b"a STORE 7 (UNCHANGEDSINCE 320162338) +FLAGS.SILENT (\\Deleted)\r\n",
        b"a UID MOVE $ Archive\r\n",
        b"a GETQUOTAROOT INBOX\r\n",
        b"a SETMETADATA INBOX (/private/comment \"My comment\")\r\n",
        b"a UID EXPUNGE 3:5\r\n",
    ];

    for input in inputs {
        let mut parser = CommandParser::new(1_000);
        let mut buffer = BytesMut::from(*input);
        let (_, parts) = drain_commands(&mut parser, &mut buffer);
        assert_eq!(parts.len(), 1, "{input:?}");

        let mut out = Vec::new();
        CommandEncoder::new(false).encode(&parts[0], &mut out);
        assert_eq!(
            String::from_utf8_lossy(&out),
            String::from_utf8_lossy(input),
            "round trip failed"
        );
    }
}

#[test]
fn encoder_prefers_non_synchronizing_literals_when_negotiated() {
    let mut parser = CommandParser::new(1_000);
    let mut buffer = BytesMut::from(&b"a LOGIN {6}\r\nsecret {6}\r\nhunter\r\n"[..]);
    let (_, parts) = drain_commands(&mut parser, &mut buffer);

    let mut encoder = CommandEncoder::new(false);
    let mut out = Vec::new();
    encoder.encode(&parts[0], &mut out);
    assert_eq!(out, b"a LOGIN {6}\r\nsecret {6}\r\nhunter\r\n");

    encoder.set_capabilities(&[Capability::LiteralPlus]);
    let mut out = Vec::new();
    encoder.encode(&parts[0], &mut out);
    assert_eq!(out, b"a LOGIN {6+}\r\nsecret {6+}\r\nhunter\r\n");
}

#[test]
fn greeting_then_fatal_bye() {
    let mut parser = ResponseParser::new(8_192);
    let mut buffer =
        BytesMut::from(&b"* OK IMAP4rev1 Service Ready\r\n* BYE Autologout; idle too long\r\n"[..]);

    let events = drain_responses(&mut parser, &mut buffer);

    assert!(matches!(
        &events[0],
        ResponseOrContinuationRequest::Response(Response::Greeting(_))
    ));
    assert!(matches!(
        &events[1],
        ResponseOrContinuationRequest::Response(Response::Fatal(bye))
            if bye.text.inner() == "Autologout; idle too long"
    ));
}
