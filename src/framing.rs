//! Frame detection around IMAP's synchronizing-literal mechanism.
//!
//! IMAP frames can contain octet-counted literals introduced by `{N}`
//! (synchronizing), `{N+}`/`{N-}` (non-synchronizing, RFC 7888), or `~{N}` /
//! `~{N+}` (binary, RFC 3516). A server must send a continuation request
//! (`+ ...`) for each synchronizing literal before the peer transmits the
//! octets. Splitting literal handling from detailed parsing sets clear
//! message boundaries even in the presence of malformed messages, so
//! malformed input can be discarded reliably instead of, e.g., literal data
//! being interpreted as commands.

use crate::error::ParsingError;

/// The result of a framing scan.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FramingResult {
    /// The largest prefix of the input that constitutes whole frames: every
    /// complete line plus all literal octets that already arrived. Bytes of a
    /// line that is still missing its terminator are not counted.
    pub maximum_valid_bytes: usize,
    /// How many synchronizing literals were newly detected by this scan, i.e.
    /// how many continuation requests the receiver now owes the peer.
    pub synchronizing_literal_count: usize,
}

/// Scans a byte stream for frame boundaries and synchronizing literals
/// without fully parsing it.
///
/// The scan is non-consuming: the caller keeps the buffer and reports removed
/// bytes via [`SynchronizingLiteralParser::consumed`].
#[derive(Clone, Debug, Default)]
pub struct SynchronizingLiteralParser {
    /// How far into the current buffer previous scans got.
    offset: usize,
    state: FramingState,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum FramingState {
    #[default]
    WaitingForCompleteLine,
    WaitingForLiteralBytes(u32),
}

impl SynchronizingLiteralParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans any bytes appended since the last call and reports how many
    /// continuation requests they require.
    ///
    /// `buffer` must start with the same bytes as on the previous call,
    /// except for bytes removed from the head that were announced via
    /// [`SynchronizingLiteralParser::consumed`].
    pub fn parse_continuations_necessary(
        &mut self,
        buffer: &[u8],
    ) -> Result<FramingResult, ParsingError> {
        let mut synchronizing_literal_count = 0;

        loop {
            match self.state {
                FramingState::WaitingForCompleteLine => {
                    let Some(line_end) = find_line_end(&buffer[self.offset..]) else {
                        break;
                    };

                    let line = &buffer[self.offset..self.offset + line_end];
                    self.offset += line_end;

                    match classify_line(line)? {
                        LineClass::CompleteLine => {}
                        LineClass::Literal { length, sync } => {
                            if sync {
                                synchronizing_literal_count += 1;
                            }
                            if length > 0 {
                                self.state = FramingState::WaitingForLiteralBytes(length);
                            }
                        }
                    }
                }
                FramingState::WaitingForLiteralBytes(remaining) => {
                    let available = buffer.len() - self.offset;
                    let take = (remaining as usize).min(available);

                    self.offset += take;

                    if take < remaining as usize {
                        self.state =
                            FramingState::WaitingForLiteralBytes(remaining - take as u32);
                        break;
                    }

                    self.state = FramingState::WaitingForCompleteLine;
                }
            }
        }

        Ok(FramingResult {
            maximum_valid_bytes: self.offset,
            synchronizing_literal_count,
        })
    }

    /// Informs the parser that `byte_count` bytes were removed from the head
    /// of the buffer.
    pub fn consumed(&mut self, byte_count: usize) {
        debug_assert!(byte_count <= self.offset);
        self.offset -= byte_count.min(self.offset);
    }
}

enum LineClass {
    CompleteLine,
    Literal { length: u32, sync: bool },
}

/// Finds the end of the next line (exclusive index past the newline).
///
/// A line ends with CRLF, lone LF, or lone CR. A CR as the very last buffered
/// byte is not a line end yet: the next byte decides whether it is half of a
/// CRLF.
fn find_line_end(input: &[u8]) -> Option<usize> {
    for (at, byte) in input.iter().enumerate() {
        match byte {
            b'\n' => return Some(at + 1),
            b'\r' => match input.get(at + 1) {
                Some(b'\n') => return Some(at + 2),
                Some(_) => return Some(at + 1),
                None => return None,
            },
            _ => {}
        }
    }

    None
}

/// Classifies a complete line (including its newline) by reverse-scanning the
/// tail for a literal introducer.
fn classify_line(line: &[u8]) -> Result<LineClass, ParsingError> {
    // Strip the newline and any trailing spaces.
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    while end > 0 && line[end - 1] == b' ' {
        end -= 1;
    }
    let line = &line[..end];

    // No closing brace, no literal.
    if line.last() != Some(&b'}') {
        return Ok(LineClass::CompleteLine);
    }

    let mut at = line.len() - 1;

    // Optional "+" or "-" turns the literal into a non-synchronizing one.
    let sync = if at > 0 && matches!(line[at - 1], b'+' | b'-') {
        at -= 1;
        false
    } else {
        true
    };

    // The decimal length.
    let digits_end = at;
    while at > 0 && line[at - 1].is_ascii_digit() {
        at -= 1;
    }
    let digits = &line[at..digits_end];

    if digits.is_empty() {
        return Err(ParsingError::InvalidFrame {
            reason: "no digits in literal length",
        });
    }

    if at == 0 || line[at - 1] != b'{' {
        return Err(ParsingError::InvalidFrame {
            reason: "literal length not introduced by an opening brace",
        });
    }

    // A "~" prefix (binary literal) is allowed but does not change framing.

    let mut length: u32 = 0;
    for digit in digits {
        length = length
            .checked_mul(10)
            .and_then(|length| length.checked_add(u32::from(digit - b'0')))
            .ok_or(ParsingError::InvalidFrame {
                reason: "literal length overflow",
            })?;
    }

    Ok(LineClass::Literal { length, sync })
}
