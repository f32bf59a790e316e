//! The client→server session parser.

use bytes::{Buf, BytesMut};

use crate::{
    error::ParsingError,
    framing::SynchronizingLiteralParser,
    parse::command::{append_message, append_start, command, idle_done},
    stream::{CommandStreamPart, Progress, classify, contains_line_end, find_line_end},
    types::command::{AppendMessageData, CommandBody},
};

/// The output of one [`CommandParser::parse_command_stream`] call: a command
/// part, a number of continuation requests the transport owes the peer, or
/// both.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PartialCommandStream {
    /// How many continuation requests (`+ ...`) must be sent before the peer
    /// transmits more data.
    pub synchronizing_literal_count: usize,
    pub command: Option<CommandStreamPart>,
}

/// An incremental parser for the client→server command stream.
///
/// The parser consumes from a caller-owned buffer, returns `Ok(None)` when
/// more bytes are needed, and owns its framing state so that continuation
/// requirements are reported alongside the parsed parts.
#[derive(Debug)]
pub struct CommandParser {
    buffer_limit: usize,
    framing: SynchronizingLiteralParser,
    mode: Mode,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    /// Parsing complete command lines.
    Lines,
    /// Inside an IDLE; only `DONE` is accepted.
    Idle,
    /// Inside an AUTHENTICATE exchange; every line is a continuation
    /// response.
    Authenticating,
    /// Inside an APPEND, before the next message or the terminating newline.
    WaitingForMessage,
    /// Streaming the octets of an appended message.
    StreamingBytes(u32),
    /// All octets of the current message were streamed.
    StreamingEnd,
}

impl CommandParser {
    /// The default buffer limit for command lines.
    pub const DEFAULT_BUFFER_LIMIT: usize = 1_000;

    pub fn new(buffer_limit: usize) -> Self {
        Self {
            buffer_limit,
            framing: SynchronizingLiteralParser::new(),
            mode: Mode::Lines,
        }
    }

    /// Switches the parser into the AUTHENTICATE exchange mode: every
    /// following line is emitted as
    /// [`CommandStreamPart::ContinuationResponse`].
    ///
    /// Only the caller's SASL engine knows how many exchange rounds remain,
    /// so entering and leaving this mode is explicit.
    pub fn begin_authentication(&mut self) {
        self.mode = Mode::Authenticating;
    }

    /// Ends the AUTHENTICATE exchange mode.
    pub fn end_authentication(&mut self) {
        if self.mode == Mode::Authenticating {
            self.mode = Mode::Lines;
        }
    }

    /// Parses the next command part out of `buffer`.
    ///
    /// Returns `Ok(None)` when the buffered input is a strict prefix of a
    /// valid frame and neither a part nor a continuation requirement is
    /// pending.
    pub fn parse_command_stream(
        &mut self,
        buffer: &mut BytesMut,
    ) -> Result<Option<PartialCommandStream>, ParsingError> {
        let framing = self.framing.parse_continuations_necessary(buffer)?;

        let parsed = self.parse_part(&buffer[..framing.maximum_valid_bytes])?;

        match parsed {
            Some((consumed, part)) => {
                buffer.advance(consumed);
                self.framing.consumed(consumed);

                Ok(Some(PartialCommandStream {
                    synchronizing_literal_count: framing.synchronizing_literal_count,
                    command: Some(part),
                }))
            }
            None if framing.synchronizing_literal_count > 0 => Ok(Some(PartialCommandStream {
                synchronizing_literal_count: framing.synchronizing_literal_count,
                command: None,
            })),
            None => {
                self.enforce_buffer_limit(buffer)?;

                Ok(None)
            }
        }
    }

    /// Runs the mode-specific handler over the framed window. Returns the
    /// consumed byte count together with the emitted part.
    fn parse_part(
        &mut self,
        window: &[u8],
    ) -> Result<Option<(usize, CommandStreamPart)>, ParsingError> {
        match self.mode {
            Mode::Lines => self.parse_line(window),
            Mode::Idle => match classify(idle_done(window))? {
                Progress::Done((remaining, ())) => {
                    self.mode = Mode::Lines;
                    Ok(Some((
                        window.len() - remaining.len(),
                        CommandStreamPart::IdleDone,
                    )))
                }
                Progress::NeedMoreBytes => Ok(None),
                Progress::NoMatch => Err(ParsingError::Malformed(
                    "only DONE may end an IDLE",
                )),
            },
            Mode::Authenticating => match find_line_end(window) {
                Some(line_end) => {
                    let content_end = window[..line_end]
                        .iter()
                        .position(|b| matches!(b, b'\r' | b'\n'))
                        .unwrap_or(line_end);

                    Ok(Some((
                        line_end,
                        CommandStreamPart::ContinuationResponse(
                            window[..content_end].to_vec(),
                        ),
                    )))
                }
                None => Ok(None),
            },
            Mode::WaitingForMessage => self.parse_append_message(window),
            Mode::StreamingBytes(remaining) => {
                if window.is_empty() {
                    return Ok(None);
                }

                let take = (remaining as usize).min(window.len());
                let is_final = take == remaining as usize;

                self.mode = if is_final {
                    Mode::StreamingEnd
                } else {
                    Mode::StreamingBytes(remaining - take as u32)
                };

                Ok(Some((
                    take,
                    CommandStreamPart::AppendMessageBytes {
                        data: window[..take].to_vec(),
                        is_final,
                    },
                )))
            }
            Mode::StreamingEnd => {
                self.mode = Mode::WaitingForMessage;

                Ok(Some((0, CommandStreamPart::AppendEndMessage)))
            }
        }
    }

    fn parse_line(
        &mut self,
        window: &[u8],
    ) -> Result<Option<(usize, CommandStreamPart)>, ParsingError> {
        if window.is_empty() {
            return Ok(None);
        }

        // APPEND opens a message stream and is therefore tried before the
        // single-line commands.
        match classify(append_start(window))? {
            Progress::Done((remaining, (tag, mailbox))) => {
                self.mode = Mode::WaitingForMessage;

                return Ok(Some((
                    window.len() - remaining.len(),
                    CommandStreamPart::AppendStart { tag, mailbox },
                )));
            }
            Progress::NeedMoreBytes => return Ok(None),
            Progress::NoMatch => {}
        }

        match classify(command(window))? {
            Progress::Done((remaining, command)) => {
                if command.body == CommandBody::Idle {
                    self.mode = Mode::Idle;
                }

                Ok(Some((
                    window.len() - remaining.len(),
                    CommandStreamPart::Tagged(command),
                )))
            }
            Progress::NeedMoreBytes => Ok(None),
            Progress::NoMatch => Err(ParsingError::Malformed("unrecognized command")),
        }
    }

    fn parse_append_message(
        &mut self,
        window: &[u8],
    ) -> Result<Option<(usize, CommandStreamPart)>, ParsingError> {
        if window.is_empty() {
            return Ok(None);
        }

        // A bare newline ends the APPEND.
        match classify(crate::parse::newline(window))? {
            Progress::Done((remaining, ())) => {
                self.mode = Mode::Lines;

                return Ok(Some((
                    window.len() - remaining.len(),
                    CommandStreamPart::AppendFinish,
                )));
            }
            Progress::NeedMoreBytes => return Ok(None),
            Progress::NoMatch => {}
        }

        match classify(append_message(window))? {
            Progress::Done((remaining, message)) => {
                self.mode = match message.data {
                    AppendMessageData::Literal { byte_count: 0, .. } => Mode::StreamingEnd,
                    AppendMessageData::Literal { byte_count, .. } => {
                        Mode::StreamingBytes(byte_count)
                    }
                    // A CATENATE message carries no streamed octets.
                    AppendMessageData::Catenate(_) => Mode::StreamingEnd,
                };

                Ok(Some((
                    window.len() - remaining.len(),
                    CommandStreamPart::AppendBeginMessage(message),
                )))
            }
            Progress::NeedMoreBytes => Ok(None),
            Progress::NoMatch => Err(ParsingError::Malformed("malformed append message")),
        }
    }

    fn enforce_buffer_limit(&self, buffer: &BytesMut) -> Result<(), ParsingError> {
        // Literal payloads are exempt: they are consumed without a line
        // bound.
        if matches!(self.mode, Mode::StreamingBytes(_)) {
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

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BUFFER_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        command::{CatenatePart, Command},
        flag::Flag,
        mailbox::Mailbox,
    };

    fn drain(
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

    #[test]
    fn test_simple_command() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"a NOOP\r\n"[..]);

        let (_, parts) = drain(&mut parser, &mut buffer);

        assert_eq!(
            parts,
            vec![CommandStreamPart::Tagged(
                Command::new("a", CommandBody::Noop).unwrap()
            )]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_login_with_synchronizing_literals() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"tag LOGIN {3}\r\n123 {3}\r\n456\r\n"[..]);

        let (continuations, parts) = drain(&mut parser, &mut buffer);

        assert_eq!(continuations, 2);
        let [CommandStreamPart::Tagged(command)] = parts.as_slice() else {
            panic!("expected one command, got {parts:?}");
        };
        let CommandBody::Login { username, password } = &command.body else {
            panic!("expected login");
        };
        assert_eq!(username.as_bytes(), b"123");
        assert_eq!(password.as_bytes(), b"456");
    }

    #[test]
    fn test_literal_head_reports_continuation_before_data_arrives() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"tag LOGIN {3}\r\n"[..]);

        let partial = parser.parse_command_stream(&mut buffer).unwrap().unwrap();
        assert_eq!(partial.synchronizing_literal_count, 1);
        assert_eq!(partial.command, None);

        // Nothing more until the literal octets arrive.
        assert_eq!(parser.parse_command_stream(&mut buffer).unwrap(), None);

        buffer.extend_from_slice(b"abc {3}\r\n");
        let partial = parser.parse_command_stream(&mut buffer).unwrap().unwrap();
        assert_eq!(partial.synchronizing_literal_count, 1);
        assert_eq!(partial.command, None);

        buffer.extend_from_slice(b"def\r\n");
        let partial = parser.parse_command_stream(&mut buffer).unwrap().unwrap();
        assert_eq!(partial.synchronizing_literal_count, 0);
        assert!(matches!(
            partial.command,
            Some(CommandStreamPart::Tagged(_))
        ));
    }

    #[test]
    fn test_append_stream() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"tag APPEND box (\\Seen) {1+}\r\na\r\n"[..]);

        let (continuations, parts) = drain(&mut parser, &mut buffer);

        assert_eq!(continuations, 0);
        assert_eq!(parts.len(), 5);
        assert_eq!(
            parts[0],
            CommandStreamPart::AppendStart {
                tag: "tag".try_into().unwrap(),
                mailbox: Mailbox::try_from("box").unwrap(),
            }
        );
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
    fn test_append_streams_partial_chunks() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"tag APPEND box {10+}\r\n01234"[..]);

        let (_, parts) = drain(&mut parser, &mut buffer);
        assert_eq!(
            parts.last(),
            Some(&CommandStreamPart::AppendMessageBytes {
                data: b"01234".to_vec(),
                is_final: false,
            })
        );

        buffer.extend_from_slice(b"56789\r\n");
        let (_, parts) = drain(&mut parser, &mut buffer);
        assert_eq!(
            parts,
            vec![
                CommandStreamPart::AppendMessageBytes {
                    data: b"56789".to_vec(),
                    is_final: true,
                },
                CommandStreamPart::AppendEndMessage,
                CommandStreamPart::AppendFinish,
            ]
        );
    }

    #[test]
    fn test_multiappend() {
        let mut parser = CommandParser::default();
        let mut buffer =
            BytesMut::from(&b"tag APPEND box {1+}\r\na {1+}\r\nb\r\n"[..]);

        let (_, parts) = drain(&mut parser, &mut buffer);

        let begins = parts
            .iter()
            .filter(|part| matches!(part, CommandStreamPart::AppendBeginMessage(_)))
            .count();
        assert_eq!(begins, 2);
        assert_eq!(parts.last(), Some(&CommandStreamPart::AppendFinish));
    }

    #[test]
    fn test_append_zero_length_message() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"tag APPEND box {0+}\r\n\r\n"[..]);

        let (_, parts) = drain(&mut parser, &mut buffer);

        assert_eq!(
            parts[2..],
            [
                CommandStreamPart::AppendEndMessage,
                CommandStreamPart::AppendFinish,
            ]
        );
    }

    #[test]
    fn test_append_catenate() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(
            &b"tag APPEND box CATENATE (URL \"imap://example.com/INBOX/;UID=20\" TEXT {3}\r\nabc)\r\n"[..],
        );

        let (continuations, parts) = drain(&mut parser, &mut buffer);

        // The TEXT literal inside the group is synchronizing.
        assert_eq!(continuations, 1);
        let CommandStreamPart::AppendBeginMessage(message) = &parts[1] else {
            panic!("expected begin message, got {parts:?}");
        };
        let AppendMessageData::Catenate(cat_parts) = &message.data else {
            panic!("expected catenate");
        };
        assert_eq!(cat_parts.len(), 2);
        assert!(matches!(cat_parts.as_ref()[0], CatenatePart::Url(_)));
        assert_eq!(parts[2], CommandStreamPart::AppendEndMessage);
        assert_eq!(parts[3], CommandStreamPart::AppendFinish);
    }

    #[test]
    fn test_idle_roundtrip() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"a IDLE\r\nDONE\r\n"[..]);

        let (_, parts) = drain(&mut parser, &mut buffer);

        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], CommandStreamPart::Tagged(_)));
        assert_eq!(parts[1], CommandStreamPart::IdleDone);
    }

    #[test]
    fn test_idle_rejects_other_input() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"a IDLE\r\nb NOOP\r\n"[..]);

        assert!(parser.parse_command_stream(&mut buffer).unwrap().is_some());
        assert_eq!(
            parser.parse_command_stream(&mut buffer),
            Err(ParsingError::Malformed("only DONE may end an IDLE"))
        );
    }

    #[test]
    fn test_authentication_mode() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"a AUTHENTICATE PLAIN\r\ndGVzdA==\r\n"[..]);

        let partial = parser.parse_command_stream(&mut buffer).unwrap().unwrap();
        assert!(matches!(
            partial.command,
            Some(CommandStreamPart::Tagged(_))
        ));

        parser.begin_authentication();

        let partial = parser.parse_command_stream(&mut buffer).unwrap().unwrap();
        assert_eq!(
            partial.command,
            Some(CommandStreamPart::ContinuationResponse(
                b"dGVzdA==".to_vec()
            ))
        );

        parser.end_authentication();
        assert_eq!(parser.parse_command_stream(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_malformed_command_is_surfaced() {
        let mut parser = CommandParser::default();
        let mut buffer = BytesMut::from(&b"a FROBNICATE\r\n"[..]);

        assert!(matches!(
            parser.parse_command_stream(&mut buffer),
            Err(ParsingError::Malformed(_))
        ));
    }

    #[test]
    fn test_line_too_long() {
        let mut parser = CommandParser::new(16);
        let mut buffer = BytesMut::from(&b"a NOOP extended well beyond the limit"[..]);

        assert_eq!(
            parser.parse_command_stream(&mut buffer),
            Err(ParsingError::LineTooLong { limit: 16 })
        );
    }

    #[test]
    fn test_drip_feed_equivalence() {
        let input = b"tag LOGIN {3}\r\n123 {3}\r\n456\r\na NOOP\r\n";

        let mut all_at_once = CommandParser::default();
        let mut buffer = BytesMut::from(&input[..]);
        let (continuations_a, parts_a) = drain(&mut all_at_once, &mut buffer);

        let mut byte_by_byte = CommandParser::default();
        let mut buffer = BytesMut::new();
        let mut continuations_b = 0;
        let mut parts_b = Vec::new();
        for byte in input {
            buffer.extend_from_slice(&[*byte]);
            while let Some(partial) = byte_by_byte.parse_command_stream(&mut buffer).unwrap() {
                continuations_b += partial.synchronizing_literal_count;
                if let Some(part) = partial.command {
                    parts_b.push(part);
                }
            }
        }

        assert_eq!(continuations_a, continuations_b);
        assert_eq!(parts_a, parts_b);
    }
}
