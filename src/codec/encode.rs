//! `EncodeIntoContext` implementations for the whole data model.

use std::io::Write;

use base64::{engine::general_purpose::STANDARD as _base64, Engine};
use chrono::{Datelike, Timelike};

use crate::{
    stream::{CommandStreamPart, FetchEvent, Response, ResponseOrContinuationRequest},
    types::{
        auth::AuthMechanism,
        body::{
            BasicFields, BodyExtension, BodyStructure, ContentTransferEncoding, Disposition,
            Language, Location, MediaSubtype, MultiPartExtensionData, SinglePartExtensionData,
            SinglePartKind,
        },
        command::{
            AppendMessage, AppendMessageData, CatenatePart, Command, CommandBody,
            CreateParameter, FetchModifier, ListReturnOption, ListSelectOption, SelectParameter,
            StoreModifier,
        },
        core::{AString, Atom, AtomExt, Charset, IString, Literal, NString, Quoted, QuotedChar,
            Tag, Text},
        datetime::{DateTime, NaiveDate},
        envelope::{Address, Envelope},
        extensions::{
            metadata::{EntryValue, GetMetadataOption, MetadataCode, MetadataDepth,
                MetadataResponse},
            quota::{QuotaGet, QuotaSet},
            urlauth::{IMessagePart, IUrlAuth, IUrlAuthRump, IUaVerifier, RumpUrl, UrlAccess,
                UrlAuth, UrlServer, UserInfo},
        },
        fetch::{
            GmailLabel, Macro, MacroOrMessageDataItemNames, MessageDataItem,
            MessageDataItemName, StreamingKind,
        },
        flag::{Flag, FlagFetch, FlagNameAttribute, FlagPerm, StoreResponse, StoreType},
        indicators::is_text_char,
        mailbox::{ListMailbox, Mailbox},
        response::{
            Bye, Capability, Code, ContinuationRequest, Data, Greeting, GreetingKind,
            NamespaceDescr, StatusBody, StatusKind, Tagged,
        },
        search::{SearchKey, SearchReturnData, SearchReturnOption},
        section::{Part, Section},
        sequence::{SeqOrUid, Sequence, SequenceSet},
        status::{StatusDataItem, StatusDataItemName},
        utils::escape_quoted,
    },
};

/// The redaction placeholder emitted in logging mode.
const PLACEHOLDER: &str = "\u{2205}";

/// The append-only output buffer together with the encoding parameters.
#[derive(Debug)]
pub(crate) struct EncodeContext {
    accumulator: Vec<u8>,
    literal_plus: bool,
    literal_minus: bool,
    redact: bool,
}

impl EncodeContext {
    pub(crate) fn new(capabilities: &[Capability], redact: bool) -> Self {
        Self {
            accumulator: Vec::new(),
            literal_plus: capabilities.contains(&Capability::LiteralPlus),
            literal_minus: capabilities.contains(&Capability::LiteralMinus),
            redact,
        }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.accumulator
    }

    fn redact(&self) -> bool {
        self.redact
    }

    /// Writes a literal introducer and decides the transmission mode from
    /// the negotiated capabilities: `LITERAL+` always avoids the round-trip,
    /// `LITERAL-` only for literals of up to 4096 octets.
    fn write_literal_header(&mut self, length: u32, binary: bool) -> std::io::Result<()> {
        if binary {
            self.write_all(b"~")?;
        }

        let non_sync = self.literal_plus || (self.literal_minus && length <= 4096);

        if non_sync {
            write!(self, "{{{length}+}}\r\n")
        } else {
            write!(self, "{{{length}}}\r\n")
        }
    }

    /// Writes `value` in the same wire form but with the content replaced by
    /// the placeholder.
    fn write_redacted_istring(&mut self, value: &IString) -> std::io::Result<()> {
        match value {
            IString::Quoted(_) => write!(self, "\"{PLACEHOLDER}\""),
            IString::Literal(_) => {
                self.write_literal_header(PLACEHOLDER.len() as u32, false)?;
                self.write_all(PLACEHOLDER.as_bytes())
            }
        }
    }

    fn write_redacted_astring(&mut self, value: &AString) -> std::io::Result<()> {
        match value {
            AString::Atom(_) => self.write_all(PLACEHOLDER.as_bytes()),
            AString::String(string) => self.write_redacted_istring(string),
        }
    }
}

impl Write for EncodeContext {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.accumulator.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub(crate) trait EncodeIntoContext {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()>;
}

fn join_serializable<T: EncodeIntoContext>(
    items: &[T],
    separator: &[u8],
    ctx: &mut EncodeContext,
) -> std::io::Result<()> {
    if let Some((first, tail)) = items.split_first() {
        first.encode_ctx(ctx)?;

        for item in tail {
            ctx.write_all(separator)?;
            item.encode_ctx(ctx)?;
        }
    }

    Ok(())
}

// ----- Primitive ---------------------------------------------------------------------------------

impl EncodeIntoContext for u32 {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for u64 {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for std::num::NonZeroU32 {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for Tag {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(self.inner().as_bytes())
    }
}

impl EncodeIntoContext for Atom {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(self.inner().as_bytes())
    }
}

impl EncodeIntoContext for AtomExt {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(self.inner().as_bytes())
    }
}

impl EncodeIntoContext for Text {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(self.inner().as_bytes())
    }
}

impl EncodeIntoContext for Quoted {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "\"{}\"", escape_quoted(self.inner()))
    }
}

impl EncodeIntoContext for QuotedChar {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self.inner() {
            character @ ('\\' | '"') => write!(ctx, "\"\\{character}\""),
            character => write!(ctx, "\"{character}\""),
        }
    }
}

impl EncodeIntoContext for Literal {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        let binary = self.data().iter().any(|byte| *byte == 0x00);

        ctx.write_literal_header(self.data().len() as u32, binary)?;
        ctx.write_all(self.data())
    }
}

impl EncodeIntoContext for IString {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Quoted(quoted) => quoted.encode_ctx(ctx),
            Self::Literal(literal) => literal.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for NString {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match &self.0 {
            Some(string) => string.encode_ctx(ctx),
            None => ctx.write_all(b"NIL"),
        }
    }
}

impl EncodeIntoContext for AString {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Atom(atom) => atom.encode_ctx(ctx),
            Self::String(string) => string.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for Charset {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Atom(atom) => atom.encode_ctx(ctx),
            Self::Quoted(quoted) => quoted.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for AuthMechanism {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

// ----- Date and time -----------------------------------------------------------------------------

impl EncodeIntoContext for DateTime {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        if ctx.redact() {
            return write!(ctx, "\"{PLACEHOLDER}\"");
        }

        let inner = self.inner();
        let offset = inner.offset().local_minus_utc();
        let (sign, offset) = if offset < 0 {
            ('-', -offset)
        } else {
            ('+', offset)
        };

        write!(
            ctx,
            "\"{:02}-{}-{:04} {:02}:{:02}:{:02} {}{:02}{:02}\"",
            inner.day(),
            month_abbreviation(inner.month()),
            inner.year(),
            inner.hour(),
            inner.minute(),
            inner.second(),
            sign,
            offset / 3600,
            (offset % 3600) / 60,
        )
    }
}

impl EncodeIntoContext for NaiveDate {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        let inner = self.inner();

        write!(
            ctx,
            "\"{}-{}-{:04}\"",
            inner.day(),
            month_abbreviation(inner.month()),
            inner.year(),
        )
    }
}

fn month_abbreviation(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        _ => "Dec",
    }
}

// ----- Flags, mailboxes, sequences ---------------------------------------------------------------

impl EncodeIntoContext for Flag {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for FlagFetch {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for FlagPerm {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for FlagNameAttribute {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for Mailbox {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Inbox => {
                if ctx.redact() {
                    ctx.write_all(PLACEHOLDER.as_bytes())
                } else {
                    ctx.write_all(b"INBOX")
                }
            }
            Self::Other(other) => {
                if ctx.redact() {
                    ctx.write_redacted_astring(other.inner())
                } else {
                    other.inner().encode_ctx(ctx)
                }
            }
        }
    }
}

impl EncodeIntoContext for ListMailbox {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Token(token) => ctx.write_all(token.inner().as_bytes()),
            Self::String(string) => string.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for SeqOrUid {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

impl EncodeIntoContext for Sequence {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Single(seq) => seq.encode_ctx(ctx),
            Self::Range(from, to) => {
                from.encode_ctx(ctx)?;
                ctx.write_all(b":")?;
                to.encode_ctx(ctx)
            }
        }
    }
}

impl EncodeIntoContext for SequenceSet {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Sequences(sequences) => join_serializable(sequences.as_ref(), b",", ctx),
            Self::SavedResult => ctx.write_all(b"$"),
        }
    }
}

// ----- Sections and fetch attributes -------------------------------------------------------------

impl EncodeIntoContext for Part {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        join_serializable(self.0.as_ref(), b".", ctx)
    }
}

impl EncodeIntoContext for Section {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        fn part_prefix(part: &Option<Part>, ctx: &mut EncodeContext) -> std::io::Result<()> {
            if let Some(part) = part {
                part.encode_ctx(ctx)?;
                ctx.write_all(b".")?;
            }
            Ok(())
        }

        match self {
            Self::Part(part) => part.encode_ctx(ctx),
            Self::Header(part) => {
                part_prefix(part, ctx)?;
                ctx.write_all(b"HEADER")
            }
            Self::HeaderFields(part, fields) => {
                part_prefix(part, ctx)?;
                ctx.write_all(b"HEADER.FIELDS (")?;
                join_serializable(fields.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::HeaderFieldsNot(part, fields) => {
                part_prefix(part, ctx)?;
                ctx.write_all(b"HEADER.FIELDS.NOT (")?;
                join_serializable(fields.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::Text(part) => {
                part_prefix(part, ctx)?;
                ctx.write_all(b"TEXT")
            }
            Self::Mime(part) => {
                part.encode_ctx(ctx)?;
                ctx.write_all(b".MIME")
            }
        }
    }
}

impl EncodeIntoContext for Macro {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::All => ctx.write_all(b"ALL"),
            Self::Fast => ctx.write_all(b"FAST"),
            Self::Full => ctx.write_all(b"FULL"),
        }
    }
}

impl EncodeIntoContext for MacroOrMessageDataItemNames {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Macro(r#macro) => r#macro.encode_ctx(ctx),
            Self::MessageDataItemNames(items) if items.len() == 1 => items[0].encode_ctx(ctx),
            Self::MessageDataItemNames(items) => {
                ctx.write_all(b"(")?;
                join_serializable(items, b" ", ctx)?;
                ctx.write_all(b")")
            }
        }
    }
}

impl EncodeIntoContext for MessageDataItemName {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        fn section_suffix(
            section: &Option<Section>,
            ctx: &mut EncodeContext,
        ) -> std::io::Result<()> {
            ctx.write_all(b"[")?;
            if let Some(section) = section {
                section.encode_ctx(ctx)?;
            }
            ctx.write_all(b"]")
        }

        fn binary_section(
            section: &[std::num::NonZeroU32],
            ctx: &mut EncodeContext,
        ) -> std::io::Result<()> {
            ctx.write_all(b"[")?;
            join_serializable(section, b".", ctx)?;
            ctx.write_all(b"]")
        }

        fn partial_suffix(
            partial: &Option<(u32, std::num::NonZeroU32)>,
            ctx: &mut EncodeContext,
        ) -> std::io::Result<()> {
            if let Some((offset, length)) = partial {
                write!(ctx, "<{offset}.{length}>")?;
            }
            Ok(())
        }

        match self {
            Self::Body => ctx.write_all(b"BODY"),
            Self::BodyExt {
                section,
                partial,
                peek,
            } => {
                if *peek {
                    ctx.write_all(b"BODY.PEEK")?;
                } else {
                    ctx.write_all(b"BODY")?;
                }
                section_suffix(section, ctx)?;
                partial_suffix(partial, ctx)
            }
            Self::BodyStructure => ctx.write_all(b"BODYSTRUCTURE"),
            Self::Binary {
                section,
                partial,
                peek,
            } => {
                if *peek {
                    ctx.write_all(b"BINARY.PEEK")?;
                } else {
                    ctx.write_all(b"BINARY")?;
                }
                binary_section(section, ctx)?;
                partial_suffix(partial, ctx)
            }
            Self::BinarySize { section } => {
                ctx.write_all(b"BINARY.SIZE")?;
                binary_section(section, ctx)
            }
            Self::Envelope => ctx.write_all(b"ENVELOPE"),
            Self::Flags => ctx.write_all(b"FLAGS"),
            Self::InternalDate => ctx.write_all(b"INTERNALDATE"),
            Self::Rfc822 => ctx.write_all(b"RFC822"),
            Self::Rfc822Header => ctx.write_all(b"RFC822.HEADER"),
            Self::Rfc822Size => ctx.write_all(b"RFC822.SIZE"),
            Self::Rfc822Text => ctx.write_all(b"RFC822.TEXT"),
            Self::Uid => ctx.write_all(b"UID"),
            Self::ModSeq => ctx.write_all(b"MODSEQ"),
            Self::GmailMessageId => ctx.write_all(b"X-GM-MSGID"),
            Self::GmailThreadId => ctx.write_all(b"X-GM-THRID"),
            Self::GmailLabels => ctx.write_all(b"X-GM-LABELS"),
        }
    }
}

impl EncodeIntoContext for MessageDataItem {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Body(body) => {
                ctx.write_all(b"BODY ")?;
                body.encode_ctx(ctx)
            }
            Self::BodyExt {
                section,
                origin,
                data,
            } => {
                ctx.write_all(b"BODY[")?;
                if let Some(section) = section {
                    section.encode_ctx(ctx)?;
                }
                ctx.write_all(b"]")?;
                if let Some(origin) = origin {
                    write!(ctx, "<{origin}>")?;
                }
                ctx.write_all(b" ")?;
                data.encode_ctx(ctx)
            }
            Self::BodyStructure(body) => {
                ctx.write_all(b"BODYSTRUCTURE ")?;
                body.encode_ctx(ctx)
            }
            Self::Binary { section, data } => {
                ctx.write_all(b"BINARY[")?;
                join_serializable(section, b".", ctx)?;
                ctx.write_all(b"] ")?;
                data.encode_ctx(ctx)
            }
            Self::BinarySize { section, size } => {
                ctx.write_all(b"BINARY.SIZE[")?;
                join_serializable(section, b".", ctx)?;
                ctx.write_all(b"] ")?;
                size.encode_ctx(ctx)
            }
            Self::Envelope(envelope) => {
                ctx.write_all(b"ENVELOPE ")?;
                envelope.encode_ctx(ctx)
            }
            Self::Flags(flags) => {
                ctx.write_all(b"FLAGS (")?;
                join_serializable(flags, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::InternalDate(datetime) => {
                ctx.write_all(b"INTERNALDATE ")?;
                datetime.encode_ctx(ctx)
            }
            Self::Rfc822(data) => {
                ctx.write_all(b"RFC822 ")?;
                data.encode_ctx(ctx)
            }
            Self::Rfc822Header(data) => {
                ctx.write_all(b"RFC822.HEADER ")?;
                data.encode_ctx(ctx)
            }
            Self::Rfc822Size(size) => {
                ctx.write_all(b"RFC822.SIZE ")?;
                size.encode_ctx(ctx)
            }
            Self::Rfc822Text(data) => {
                ctx.write_all(b"RFC822.TEXT ")?;
                data.encode_ctx(ctx)
            }
            Self::Uid(uid) => {
                ctx.write_all(b"UID ")?;
                uid.encode_ctx(ctx)
            }
            Self::ModSeq(mod_seq) => {
                write!(ctx, "MODSEQ ({mod_seq})")
            }
            Self::GmailMessageId(id) => write!(ctx, "X-GM-MSGID {id}"),
            Self::GmailThreadId(id) => write!(ctx, "X-GM-THRID {id}"),
            Self::GmailLabels(labels) => {
                ctx.write_all(b"X-GM-LABELS (")?;
                join_serializable(labels, b" ", ctx)?;
                ctx.write_all(b")")
            }
        }
    }
}

impl EncodeIntoContext for GmailLabel {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        if ctx.redact() {
            return match self {
                Self::System(_) => ctx.write_all(PLACEHOLDER.as_bytes()),
                Self::User(label) => ctx.write_redacted_astring(label),
            };
        }

        match self {
            Self::System(atom) => {
                ctx.write_all(b"\\")?;
                atom.encode_ctx(ctx)
            }
            Self::User(label) => label.encode_ctx(ctx),
        }
    }
}

// ----- Envelope and body structure ---------------------------------------------------------------

impl EncodeIntoContext for Envelope {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        fn address_list(addresses: &[Address], ctx: &mut EncodeContext) -> std::io::Result<()> {
            if addresses.is_empty() {
                ctx.write_all(b"NIL")
            } else {
                ctx.write_all(b"(")?;
                join_serializable(addresses, b"", ctx)?;
                ctx.write_all(b")")
            }
        }

        ctx.write_all(b"(")?;
        self.date.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.subject.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        address_list(&self.from, ctx)?;
        ctx.write_all(b" ")?;
        address_list(&self.sender, ctx)?;
        ctx.write_all(b" ")?;
        address_list(&self.reply_to, ctx)?;
        ctx.write_all(b" ")?;
        address_list(&self.to, ctx)?;
        ctx.write_all(b" ")?;
        address_list(&self.cc, ctx)?;
        ctx.write_all(b" ")?;
        address_list(&self.bcc, ctx)?;
        ctx.write_all(b" ")?;
        self.in_reply_to.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.message_id.encode_ctx(ctx)?;
        ctx.write_all(b")")
    }
}

impl EncodeIntoContext for Address {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b"(")?;
        self.name.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.adl.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.mailbox.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.host.encode_ctx(ctx)?;
        ctx.write_all(b")")
    }
}

impl EncodeIntoContext for MediaSubtype {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        if self.inner().bytes().all(is_text_char) {
            write!(ctx, "\"{}\"", escape_quoted(self.inner()))
        } else {
            Literal::unvalidated_binary(self.inner().as_bytes().to_vec()).encode_ctx(ctx)
        }
    }
}

impl EncodeIntoContext for ContentTransferEncoding {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::SevenBit => ctx.write_all(b"\"7BIT\""),
            Self::EightBit => ctx.write_all(b"\"8BIT\""),
            Self::Binary => ctx.write_all(b"\"BINARY\""),
            Self::Base64 => ctx.write_all(b"\"BASE64\""),
            Self::QuotedPrintable => ctx.write_all(b"\"QUOTED-PRINTABLE\""),
            Self::Other(other) => other.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for BodyStructure {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b"(")?;

        match self {
            Self::Single(single) => {
                match &single.kind {
                    SinglePartKind::Basic { r#type, subtype } => {
                        r#type.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        subtype.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        single.fields.encode_ctx(ctx)?;
                    }
                    SinglePartKind::Message {
                        envelope,
                        body_structure,
                        number_of_lines,
                    } => {
                        ctx.write_all(b"\"MESSAGE\" \"RFC822\" ")?;
                        single.fields.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        envelope.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        body_structure.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        number_of_lines.encode_ctx(ctx)?;
                    }
                    SinglePartKind::Text {
                        subtype,
                        number_of_lines,
                    } => {
                        ctx.write_all(b"\"TEXT\" ")?;
                        subtype.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        single.fields.encode_ctx(ctx)?;
                        ctx.write_all(b" ")?;
                        number_of_lines.encode_ctx(ctx)?;
                    }
                }

                if let Some(extension_data) = &single.extension_data {
                    ctx.write_all(b" ")?;
                    extension_data.encode_ctx(ctx)?;
                }
            }
            Self::Multi(multi) => {
                join_serializable(multi.bodies.as_ref(), b"", ctx)?;
                ctx.write_all(b" ")?;
                multi.subtype.encode_ctx(ctx)?;

                if let Some(extension_data) = &multi.extension_data {
                    ctx.write_all(b" ")?;
                    extension_data.encode_ctx(ctx)?;
                }
            }
        }

        ctx.write_all(b")")
    }
}

impl EncodeIntoContext for BasicFields {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        parameter_list(&self.parameter_list, ctx)?;
        ctx.write_all(b" ")?;
        self.id.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.description.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.content_transfer_encoding.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.size.encode_ctx(ctx)
    }
}

fn parameter_list(
    parameters: &[(IString, IString)],
    ctx: &mut EncodeContext,
) -> std::io::Result<()> {
    if parameters.is_empty() {
        return ctx.write_all(b"NIL");
    }

    ctx.write_all(b"(")?;
    if let Some(((key, value), tail)) = parameters.split_first() {
        key.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        value.encode_ctx(ctx)?;

        for (key, value) in tail {
            ctx.write_all(b" ")?;
            key.encode_ctx(ctx)?;
            ctx.write_all(b" ")?;
            value.encode_ctx(ctx)?;
        }
    }
    ctx.write_all(b")")
}

impl EncodeIntoContext for SinglePartExtensionData {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        self.md5.encode_ctx(ctx)?;

        if let Some(disposition) = &self.tail {
            ctx.write_all(b" ")?;
            disposition.encode_ctx(ctx)?;
        }

        Ok(())
    }
}

impl EncodeIntoContext for MultiPartExtensionData {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        parameter_list(&self.parameter_list, ctx)?;

        if let Some(disposition) = &self.tail {
            ctx.write_all(b" ")?;
            disposition.encode_ctx(ctx)?;
        }

        Ok(())
    }
}

impl EncodeIntoContext for Disposition {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match &self.disposition {
            Some((disposition, parameters)) => {
                ctx.write_all(b"(")?;
                disposition.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                parameter_list(parameters, ctx)?;
                ctx.write_all(b")")?;
            }
            None => ctx.write_all(b"NIL")?,
        }

        if let Some(language) = &self.tail {
            ctx.write_all(b" ")?;
            language.encode_ctx(ctx)?;
        }

        Ok(())
    }
}

impl EncodeIntoContext for Language {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self.languages.len() {
            0 => ctx.write_all(b"NIL")?,
            1 => self.languages[0].encode_ctx(ctx)?,
            _ => {
                ctx.write_all(b"(")?;
                join_serializable(&self.languages, b" ", ctx)?;
                ctx.write_all(b")")?;
            }
        }

        if let Some(location) = &self.tail {
            ctx.write_all(b" ")?;
            location.encode_ctx(ctx)?;
        }

        Ok(())
    }
}

impl EncodeIntoContext for Location {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        self.location.encode_ctx(ctx)?;

        for extension in &self.extensions {
            ctx.write_all(b" ")?;
            extension.encode_ctx(ctx)?;
        }

        Ok(())
    }
}

impl EncodeIntoContext for BodyExtension {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::NString(nstring) => nstring.encode_ctx(ctx),
            Self::Number(number) => number.encode_ctx(ctx),
            Self::List(list) => {
                ctx.write_all(b"(")?;
                join_serializable(list.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")
            }
        }
    }
}

// ----- Search ------------------------------------------------------------------------------------

impl EncodeIntoContext for SearchKey {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::And(keys) => {
                ctx.write_all(b"(")?;
                join_serializable(keys.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::SequenceSet(set) => set.encode_ctx(ctx),
            Self::All => ctx.write_all(b"ALL"),
            Self::Answered => ctx.write_all(b"ANSWERED"),
            Self::Bcc(value) => {
                ctx.write_all(b"BCC ")?;
                value.encode_ctx(ctx)
            }
            Self::Before(date) => {
                ctx.write_all(b"BEFORE ")?;
                date.encode_ctx(ctx)
            }
            Self::Body(value) => {
                ctx.write_all(b"BODY ")?;
                value.encode_ctx(ctx)
            }
            Self::Cc(value) => {
                ctx.write_all(b"CC ")?;
                value.encode_ctx(ctx)
            }
            Self::Deleted => ctx.write_all(b"DELETED"),
            Self::Draft => ctx.write_all(b"DRAFT"),
            Self::Flagged => ctx.write_all(b"FLAGGED"),
            Self::From(value) => {
                ctx.write_all(b"FROM ")?;
                value.encode_ctx(ctx)
            }
            Self::Header(key, value) => {
                ctx.write_all(b"HEADER ")?;
                key.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                value.encode_ctx(ctx)
            }
            Self::Keyword(keyword) => {
                ctx.write_all(b"KEYWORD ")?;
                keyword.encode_ctx(ctx)
            }
            Self::Larger(size) => write!(ctx, "LARGER {size}"),
            Self::New => ctx.write_all(b"NEW"),
            Self::Not(key) => {
                ctx.write_all(b"NOT ")?;
                key.encode_ctx(ctx)
            }
            Self::Old => ctx.write_all(b"OLD"),
            Self::On(date) => {
                ctx.write_all(b"ON ")?;
                date.encode_ctx(ctx)
            }
            Self::Or(left, right) => {
                ctx.write_all(b"OR ")?;
                left.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                right.encode_ctx(ctx)
            }
            Self::Recent => ctx.write_all(b"RECENT"),
            Self::Seen => ctx.write_all(b"SEEN"),
            Self::SentBefore(date) => {
                ctx.write_all(b"SENTBEFORE ")?;
                date.encode_ctx(ctx)
            }
            Self::SentOn(date) => {
                ctx.write_all(b"SENTON ")?;
                date.encode_ctx(ctx)
            }
            Self::SentSince(date) => {
                ctx.write_all(b"SENTSINCE ")?;
                date.encode_ctx(ctx)
            }
            Self::Since(date) => {
                ctx.write_all(b"SINCE ")?;
                date.encode_ctx(ctx)
            }
            Self::Smaller(size) => write!(ctx, "SMALLER {size}"),
            Self::Subject(value) => {
                ctx.write_all(b"SUBJECT ")?;
                value.encode_ctx(ctx)
            }
            Self::Text(value) => {
                ctx.write_all(b"TEXT ")?;
                value.encode_ctx(ctx)
            }
            Self::To(value) => {
                ctx.write_all(b"TO ")?;
                value.encode_ctx(ctx)
            }
            Self::Uid(set) => {
                ctx.write_all(b"UID ")?;
                set.encode_ctx(ctx)
            }
            Self::Unanswered => ctx.write_all(b"UNANSWERED"),
            Self::Undeleted => ctx.write_all(b"UNDELETED"),
            Self::Undraft => ctx.write_all(b"UNDRAFT"),
            Self::Unflagged => ctx.write_all(b"UNFLAGGED"),
            Self::Unkeyword(keyword) => {
                ctx.write_all(b"UNKEYWORD ")?;
                keyword.encode_ctx(ctx)
            }
            Self::Unseen => ctx.write_all(b"UNSEEN"),
            Self::ModSeq(mod_seq) => write!(ctx, "MODSEQ {mod_seq}"),
            Self::GmailRaw(value) => {
                ctx.write_all(b"X-GM-RAW ")?;
                value.encode_ctx(ctx)
            }
        }
    }
}

impl EncodeIntoContext for SearchReturnOption {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Min => ctx.write_all(b"MIN"),
            Self::Max => ctx.write_all(b"MAX"),
            Self::All => ctx.write_all(b"ALL"),
            Self::Count => ctx.write_all(b"COUNT"),
            Self::Save => ctx.write_all(b"SAVE"),
        }
    }
}

impl EncodeIntoContext for SearchReturnData {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Min(value) => write!(ctx, "MIN {value}"),
            Self::Max(value) => write!(ctx, "MAX {value}"),
            Self::All(set) => {
                ctx.write_all(b"ALL ")?;
                set.encode_ctx(ctx)
            }
            Self::Count(count) => write!(ctx, "COUNT {count}"),
            Self::ModSeq(mod_seq) => write!(ctx, "MODSEQ {mod_seq}"),
        }
    }
}

// ----- Status ------------------------------------------------------------------------------------

impl EncodeIntoContext for StatusDataItemName {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Messages => ctx.write_all(b"MESSAGES"),
            Self::Recent => ctx.write_all(b"RECENT"),
            Self::UidNext => ctx.write_all(b"UIDNEXT"),
            Self::UidValidity => ctx.write_all(b"UIDVALIDITY"),
            Self::Unseen => ctx.write_all(b"UNSEEN"),
            Self::Deleted => ctx.write_all(b"DELETED"),
            Self::Size => ctx.write_all(b"SIZE"),
            Self::HighestModSeq => ctx.write_all(b"HIGHESTMODSEQ"),
        }
    }
}

impl EncodeIntoContext for StatusDataItem {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Messages(count) => write!(ctx, "MESSAGES {count}"),
            Self::Recent(count) => write!(ctx, "RECENT {count}"),
            Self::UidNext(value) => write!(ctx, "UIDNEXT {value}"),
            Self::UidValidity(value) => write!(ctx, "UIDVALIDITY {value}"),
            Self::Unseen(count) => write!(ctx, "UNSEEN {count}"),
            Self::Deleted(count) => write!(ctx, "DELETED {count}"),
            Self::Size(size) => write!(ctx, "SIZE {size}"),
            Self::HighestModSeq(mod_seq) => write!(ctx, "HIGHESTMODSEQ {mod_seq}"),
        }
    }
}

// ----- Extensions --------------------------------------------------------------------------------

impl EncodeIntoContext for QuotaGet {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{} {} {}", self.resource, self.usage, self.limit)
    }
}

impl EncodeIntoContext for QuotaSet {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{} {}", self.resource, self.limit)
    }
}

impl EncodeIntoContext for EntryValue {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        self.entry.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.value.encode_ctx(ctx)
    }
}

impl EncodeIntoContext for GetMetadataOption {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::MaxSize(size) => write!(ctx, "MAXSIZE {size}"),
            Self::Depth(MetadataDepth::Zero) => ctx.write_all(b"DEPTH 0"),
            Self::Depth(MetadataDepth::One) => ctx.write_all(b"DEPTH 1"),
            Self::Depth(MetadataDepth::Infinity) => ctx.write_all(b"DEPTH infinity"),
        }
    }
}

impl EncodeIntoContext for MetadataCode {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::LongEntries(count) => write!(ctx, "LONGENTRIES {count}"),
            Self::MaxSize(size) => write!(ctx, "MAXSIZE {size}"),
            Self::TooMany => ctx.write_all(b"TOOMANY"),
            Self::NoPrivate => ctx.write_all(b"NOPRIVATE"),
        }
    }
}

impl EncodeIntoContext for UrlServer {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        if let Some(user) = &self.user {
            user.encode_ctx(ctx)?;
            ctx.write_all(b"@")?;
        }

        ctx.write_all(self.host.as_bytes())?;

        if let Some(port) = self.port {
            write!(ctx, ":{port}")?;
        }

        Ok(())
    }
}

impl EncodeIntoContext for UserInfo {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        if let Some(user) = &self.user {
            ctx.write_all(user.inner().as_bytes())?;
        }

        match &self.auth {
            Some(UrlAuth::Any) => ctx.write_all(b";AUTH=*")?,
            Some(UrlAuth::Type(mechanism)) => {
                write!(ctx, ";AUTH={}", mechanism.inner())?;
            }
            None => {}
        }

        Ok(())
    }
}

impl EncodeIntoContext for IMessagePart {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(self.mailbox.inner().as_bytes())?;

        if let Some(uid_validity) = self.uid_validity {
            write!(ctx, ";UIDVALIDITY={uid_validity}")?;
        }

        write!(ctx, "/;UID={}", self.uid)?;

        if let Some(section) = &self.section {
            write!(ctx, "/;SECTION={}", section.inner())?;
        }

        if let Some(partial) = self.partial {
            write!(ctx, "/;PARTIAL={}", partial.offset)?;
            if let Some(length) = partial.length {
                write!(ctx, ".{length}")?;
            }
        }

        Ok(())
    }
}

impl EncodeIntoContext for IUrlAuthRump {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        if let Some(expire) = &self.expire {
            write!(ctx, ";EXPIRE={expire}")?;
        }

        ctx.write_all(b";URLAUTH=")?;

        match &self.access {
            UrlAccess::Submit(user) => write!(ctx, "submit+{}", user.inner()),
            UrlAccess::User(user) => write!(ctx, "user+{}", user.inner()),
            UrlAccess::AuthUser => ctx.write_all(b"authuser"),
            UrlAccess::Anonymous => ctx.write_all(b"anonymous"),
        }
    }
}

impl EncodeIntoContext for IUaVerifier {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, ":{}:{}", self.mechanism, self.token.inner())
    }
}

impl EncodeIntoContext for IUrlAuth {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        self.rump.encode_ctx(ctx)?;
        self.verifier.encode_ctx(ctx)
    }
}

impl EncodeIntoContext for RumpUrl {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b"\"imap://")?;
        self.server.encode_ctx(ctx)?;
        ctx.write_all(b"/")?;
        self.part.encode_ctx(ctx)?;
        self.rump.encode_ctx(ctx)?;
        ctx.write_all(b"\"")
    }
}

// ----- Command -----------------------------------------------------------------------------------

impl EncodeIntoContext for Command {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        self.tag.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.body.encode_ctx(ctx)?;
        ctx.write_all(b"\r\n")
    }
}

impl EncodeIntoContext for CommandBody {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Capability => ctx.write_all(b"CAPABILITY"),
            Self::Noop => ctx.write_all(b"NOOP"),
            Self::Logout => ctx.write_all(b"LOGOUT"),
            Self::Id { parameters } => {
                ctx.write_all(b"ID ")?;
                match parameters {
                    Some(parameters) => {
                        ctx.write_all(b"(")?;
                        if let Some(((key, value), tail)) = parameters.split_first() {
                            key.encode_ctx(ctx)?;
                            ctx.write_all(b" ")?;
                            value.encode_ctx(ctx)?;
                            for (key, value) in tail {
                                ctx.write_all(b" ")?;
                                key.encode_ctx(ctx)?;
                                ctx.write_all(b" ")?;
                                value.encode_ctx(ctx)?;
                            }
                        }
                        ctx.write_all(b")")
                    }
                    None => ctx.write_all(b"NIL"),
                }
            }
            Self::Login { username, password } => {
                ctx.write_all(b"LOGIN ")?;
                username.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                if ctx.redact() {
                    ctx.write_redacted_astring(password)
                } else {
                    password.encode_ctx(ctx)
                }
            }
            Self::Authenticate {
                mechanism,
                initial_response,
            } => {
                ctx.write_all(b"AUTHENTICATE ")?;
                mechanism.encode_ctx(ctx)?;

                if let Some(initial_response) = initial_response {
                    ctx.write_all(b" ")?;

                    if ctx.redact() {
                        ctx.write_all(PLACEHOLDER.as_bytes())?;
                    } else if initial_response.is_empty() {
                        // A zero-length initial response is a single pad
                        // character (RFC 4959).
                        ctx.write_all(b"=")?;
                    } else {
                        ctx.write_all(_base64.encode(initial_response).as_bytes())?;
                    }
                }

                Ok(())
            }
            Self::Select {
                mailbox,
                parameters,
            } => {
                ctx.write_all(b"SELECT ")?;
                mailbox.encode_ctx(ctx)?;
                select_parameters(parameters, ctx)
            }
            Self::Examine {
                mailbox,
                parameters,
            } => {
                ctx.write_all(b"EXAMINE ")?;
                mailbox.encode_ctx(ctx)?;
                select_parameters(parameters, ctx)
            }
            Self::Create {
                mailbox,
                parameters,
            } => {
                ctx.write_all(b"CREATE ")?;
                mailbox.encode_ctx(ctx)?;
                if !parameters.is_empty() {
                    ctx.write_all(b" (")?;
                    join_serializable(parameters, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }
                Ok(())
            }
            Self::Delete { mailbox } => {
                ctx.write_all(b"DELETE ")?;
                mailbox.encode_ctx(ctx)
            }
            Self::Rename {
                from,
                to,
                parameters,
            } => {
                ctx.write_all(b"RENAME ")?;
                from.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                to.encode_ctx(ctx)?;
                if !parameters.is_empty() {
                    ctx.write_all(b" (")?;
                    join_serializable(parameters, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }
                Ok(())
            }
            Self::Subscribe { mailbox } => {
                ctx.write_all(b"SUBSCRIBE ")?;
                mailbox.encode_ctx(ctx)
            }
            Self::Unsubscribe { mailbox } => {
                ctx.write_all(b"UNSUBSCRIBE ")?;
                mailbox.encode_ctx(ctx)
            }
            Self::List {
                selection_options,
                reference,
                patterns,
                return_options,
            } => {
                ctx.write_all(b"LIST")?;

                if !selection_options.is_empty() {
                    ctx.write_all(b" (")?;
                    join_serializable(selection_options, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }

                ctx.write_all(b" ")?;
                reference.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;

                if patterns.len() == 1 {
                    patterns.first().encode_ctx(ctx)?;
                } else {
                    ctx.write_all(b"(")?;
                    join_serializable(patterns.as_ref(), b" ", ctx)?;
                    ctx.write_all(b")")?;
                }

                if !return_options.is_empty() {
                    ctx.write_all(b" RETURN (")?;
                    join_serializable(return_options, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }

                Ok(())
            }
            Self::Lsub { reference, pattern } => {
                ctx.write_all(b"LSUB ")?;
                reference.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                pattern.encode_ctx(ctx)
            }
            Self::Status {
                mailbox,
                attributes,
            } => {
                ctx.write_all(b"STATUS ")?;
                mailbox.encode_ctx(ctx)?;
                ctx.write_all(b" (")?;
                join_serializable(attributes, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::Idle => ctx.write_all(b"IDLE"),
            Self::Enable { capabilities } => {
                ctx.write_all(b"ENABLE ")?;
                join_serializable(capabilities.as_ref(), b" ", ctx)
            }
            Self::Namespace => ctx.write_all(b"NAMESPACE"),
            Self::GetQuota { root } => {
                ctx.write_all(b"GETQUOTA ")?;
                root.encode_ctx(ctx)
            }
            Self::GetQuotaRoot { mailbox } => {
                ctx.write_all(b"GETQUOTAROOT ")?;
                mailbox.encode_ctx(ctx)
            }
            Self::SetQuota { root, quotas } => {
                ctx.write_all(b"SETQUOTA ")?;
                root.encode_ctx(ctx)?;
                ctx.write_all(b" (")?;
                join_serializable(quotas, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::GetMetadata {
                options,
                mailbox,
                entries,
            } => {
                ctx.write_all(b"GETMETADATA")?;

                if !options.is_empty() {
                    ctx.write_all(b" (")?;
                    join_serializable(options, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }

                ctx.write_all(b" ")?;
                mailbox.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;

                if entries.len() == 1 {
                    entries.first().encode_ctx(ctx)
                } else {
                    ctx.write_all(b"(")?;
                    join_serializable(entries.as_ref(), b" ", ctx)?;
                    ctx.write_all(b")")
                }
            }
            Self::SetMetadata {
                mailbox,
                entry_values,
            } => {
                ctx.write_all(b"SETMETADATA ")?;
                mailbox.encode_ctx(ctx)?;
                ctx.write_all(b" (")?;
                join_serializable(entry_values.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::ResetKey {
                mailbox,
                mechanisms,
            } => {
                ctx.write_all(b"RESETKEY")?;
                if let Some(mailbox) = mailbox {
                    ctx.write_all(b" ")?;
                    mailbox.encode_ctx(ctx)?;
                    for mechanism in mechanisms {
                        write!(ctx, " {mechanism}")?;
                    }
                }
                Ok(())
            }
            Self::GenUrlAuth { rumps } => {
                ctx.write_all(b"GENURLAUTH")?;
                for (rump, mechanism) in rumps.as_ref() {
                    ctx.write_all(b" ")?;
                    rump.encode_ctx(ctx)?;
                    write!(ctx, " {mechanism}")?;
                }
                Ok(())
            }
            Self::UrlFetch { urls } => {
                ctx.write_all(b"URLFETCH")?;
                for url in urls.as_ref() {
                    ctx.write_all(b" ")?;
                    url.encode_ctx(ctx)?;
                }
                Ok(())
            }
            Self::Check => ctx.write_all(b"CHECK"),
            Self::Close => ctx.write_all(b"CLOSE"),
            Self::Unselect => ctx.write_all(b"UNSELECT"),
            Self::Expunge => ctx.write_all(b"EXPUNGE"),
            Self::ExpungeUid { sequence_set } => {
                ctx.write_all(b"UID EXPUNGE ")?;
                sequence_set.encode_ctx(ctx)
            }
            Self::Search {
                charset,
                criteria,
                return_options,
                uid,
            } => {
                if *uid {
                    ctx.write_all(b"UID SEARCH")?;
                } else {
                    ctx.write_all(b"SEARCH")?;
                }

                if !return_options.is_empty() {
                    ctx.write_all(b" RETURN (")?;
                    join_serializable(return_options, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }

                // CHARSET is only meaningful when a key actually carries a
                // string argument.
                if let Some(charset) = charset {
                    if criteria.contains_string() {
                        ctx.write_all(b" CHARSET ")?;
                        charset.encode_ctx(ctx)?;
                    }
                }

                ctx.write_all(b" ")?;

                // The top-level conjunction is written without parentheses.
                match criteria {
                    SearchKey::And(keys) => join_serializable(keys.as_ref(), b" ", ctx),
                    key => key.encode_ctx(ctx),
                }
            }
            Self::Fetch {
                sequence_set,
                macro_or_item_names,
                modifiers,
                uid,
            } => {
                if *uid {
                    ctx.write_all(b"UID FETCH ")?;
                } else {
                    ctx.write_all(b"FETCH ")?;
                }

                sequence_set.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                macro_or_item_names.encode_ctx(ctx)?;

                if !modifiers.is_empty() {
                    ctx.write_all(b" (")?;
                    join_serializable(modifiers, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }

                Ok(())
            }
            Self::Store {
                sequence_set,
                kind,
                response,
                flags,
                modifiers,
                uid,
            } => {
                if *uid {
                    ctx.write_all(b"UID STORE ")?;
                } else {
                    ctx.write_all(b"STORE ")?;
                }

                sequence_set.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;

                if !modifiers.is_empty() {
                    ctx.write_all(b"(")?;
                    join_serializable(modifiers, b" ", ctx)?;
                    ctx.write_all(b") ")?;
                }

                match kind {
                    StoreType::Add => ctx.write_all(b"+")?,
                    StoreType::Remove => ctx.write_all(b"-")?,
                    StoreType::Replace => {}
                }

                ctx.write_all(b"FLAGS")?;

                match response {
                    StoreResponse::Answer => {}
                    StoreResponse::Silent => ctx.write_all(b".SILENT")?,
                }

                ctx.write_all(b" (")?;
                join_serializable(flags, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::Copy {
                sequence_set,
                mailbox,
                uid,
            } => {
                if *uid {
                    ctx.write_all(b"UID COPY ")?;
                } else {
                    ctx.write_all(b"COPY ")?;
                }
                sequence_set.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                mailbox.encode_ctx(ctx)
            }
            Self::Move {
                sequence_set,
                mailbox,
                uid,
            } => {
                if *uid {
                    ctx.write_all(b"UID MOVE ")?;
                } else {
                    ctx.write_all(b"MOVE ")?;
                }
                sequence_set.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                mailbox.encode_ctx(ctx)
            }
        }
    }
}

fn select_parameters(
    parameters: &[SelectParameter],
    ctx: &mut EncodeContext,
) -> std::io::Result<()> {
    if parameters.is_empty() {
        return Ok(());
    }

    ctx.write_all(b" (")?;
    join_serializable(parameters, b" ", ctx)?;
    ctx.write_all(b")")
}

impl EncodeIntoContext for SelectParameter {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::CondStore => ctx.write_all(b"CONDSTORE"),
            Self::QResync {
                uid_validity,
                mod_seq,
                known_uids,
                seq_match_data,
            } => {
                write!(ctx, "QRESYNC ({uid_validity} {mod_seq}")?;

                if let Some(known_uids) = known_uids {
                    ctx.write_all(b" ")?;
                    known_uids.encode_ctx(ctx)?;
                }

                if let Some((sequences, uids)) = seq_match_data {
                    ctx.write_all(b" (")?;
                    sequences.encode_ctx(ctx)?;
                    ctx.write_all(b" ")?;
                    uids.encode_ctx(ctx)?;
                    ctx.write_all(b")")?;
                }

                ctx.write_all(b")")
            }
            Self::Other(atom) => atom.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for CreateParameter {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Use(attributes) => {
                ctx.write_all(b"USE (")?;
                join_serializable(attributes, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::Other(atom) => atom.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for ListSelectOption {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Subscribed => ctx.write_all(b"SUBSCRIBED"),
            Self::Remote => ctx.write_all(b"REMOTE"),
            Self::RecursiveMatch => ctx.write_all(b"RECURSIVEMATCH"),
            Self::SpecialUse => ctx.write_all(b"SPECIAL-USE"),
            Self::Other(atom) => atom.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for ListReturnOption {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Subscribed => ctx.write_all(b"SUBSCRIBED"),
            Self::Children => ctx.write_all(b"CHILDREN"),
            Self::SpecialUse => ctx.write_all(b"SPECIAL-USE"),
            Self::Status(attributes) => {
                ctx.write_all(b"STATUS (")?;
                join_serializable(attributes, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::Other(atom) => atom.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for FetchModifier {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::ChangedSince(mod_seq) => write!(ctx, "CHANGEDSINCE {mod_seq}"),
            Self::Vanished => ctx.write_all(b"VANISHED"),
        }
    }
}

impl EncodeIntoContext for StoreModifier {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::UnchangedSince(mod_seq) => write!(ctx, "UNCHANGEDSINCE {mod_seq}"),
        }
    }
}

impl EncodeIntoContext for Capability {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        write!(ctx, "{self}")
    }
}

// ----- Command stream ----------------------------------------------------------------------------

impl EncodeIntoContext for CommandStreamPart {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Tagged(command) => command.encode_ctx(ctx),
            Self::AppendStart { tag, mailbox } => {
                tag.encode_ctx(ctx)?;
                ctx.write_all(b" APPEND ")?;
                mailbox.encode_ctx(ctx)
            }
            Self::AppendBeginMessage(message) => message.encode_ctx(ctx),
            Self::AppendMessageBytes { data, is_final } => {
                if ctx.redact() {
                    // The octets were redacted to a single placeholder when
                    // the literal header was written.
                    if *is_final {
                        ctx.write_all(PLACEHOLDER.as_bytes())?;
                    }
                    Ok(())
                } else {
                    ctx.write_all(data)
                }
            }
            Self::AppendEndMessage => Ok(()),
            Self::AppendFinish => ctx.write_all(b"\r\n"),
            Self::IdleDone => ctx.write_all(b"DONE\r\n"),
            Self::ContinuationResponse(data) => {
                if ctx.redact() {
                    ctx.write_all(PLACEHOLDER.as_bytes())?;
                } else {
                    ctx.write_all(data)?;
                }
                ctx.write_all(b"\r\n")
            }
        }
    }
}

impl EncodeIntoContext for AppendMessage {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b" ")?;

        if !self.options.flags.is_empty() {
            ctx.write_all(b"(")?;
            join_serializable(&self.options.flags, b" ", ctx)?;
            ctx.write_all(b") ")?;
        }

        if let Some(date) = &self.options.internal_date {
            date.encode_ctx(ctx)?;
            ctx.write_all(b" ")?;
        }

        match &self.data {
            AppendMessageData::Literal { byte_count, binary } => {
                if ctx.redact() {
                    ctx.write_literal_header(PLACEHOLDER.len() as u32, *binary)
                } else {
                    ctx.write_literal_header(*byte_count, *binary)
                }
            }
            AppendMessageData::Catenate(parts) => {
                ctx.write_all(b"CATENATE (")?;
                join_serializable(parts.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")
            }
        }
    }
}

impl EncodeIntoContext for CatenatePart {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Url(url) => {
                ctx.write_all(b"URL ")?;
                url.encode_ctx(ctx)
            }
            Self::Text(literal) => {
                ctx.write_all(b"TEXT ")?;
                if ctx.redact() {
                    ctx.write_literal_header(PLACEHOLDER.len() as u32, false)?;
                    ctx.write_all(PLACEHOLDER.as_bytes())
                } else {
                    literal.encode_ctx(ctx)
                }
            }
        }
    }
}

// ----- Response ----------------------------------------------------------------------------------

impl EncodeIntoContext for ResponseOrContinuationRequest {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::ContinuationRequest(request) => request.encode_ctx(ctx),
            Self::Response(response) => response.encode_ctx(ctx),
        }
    }
}

impl EncodeIntoContext for Response {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Greeting(greeting) => greeting.encode_ctx(ctx),
            Self::Untagged(data) => data.encode_ctx(ctx),
            Self::Tagged(tagged) => tagged.encode_ctx(ctx),
            Self::Fetch(event) => encode_fetch_event(event, true, ctx),
            Self::Fatal(bye) => bye.encode_ctx(ctx),
        }
    }
}

/// Encodes one FETCH sub-event. `first` suppresses the attribute separator.
pub(crate) fn encode_fetch_event(
    event: &FetchEvent,
    first: bool,
    ctx: &mut EncodeContext,
) -> std::io::Result<()> {
    match event {
        FetchEvent::Start(seq) => write!(ctx, "* {seq} FETCH ("),
        FetchEvent::Simple(item) => {
            if !first {
                ctx.write_all(b" ")?;
            }
            item.encode_ctx(ctx)
        }
        FetchEvent::StreamingBegin { kind, byte_count } => {
            if !first {
                ctx.write_all(b" ")?;
            }
            match kind {
                StreamingKind::BodyExt { section, origin } => {
                    ctx.write_all(b"BODY[")?;
                    if let Some(section) = section {
                        section.encode_ctx(ctx)?;
                    }
                    ctx.write_all(b"]")?;
                    if let Some(origin) = origin {
                        write!(ctx, "<{origin}>")?;
                    }
                }
                StreamingKind::Rfc822 => ctx.write_all(b"RFC822")?,
                StreamingKind::Rfc822Header => ctx.write_all(b"RFC822.HEADER")?,
                StreamingKind::Rfc822Text => ctx.write_all(b"RFC822.TEXT")?,
                StreamingKind::Binary { section } => {
                    ctx.write_all(b"BINARY[")?;
                    join_serializable(section, b".", ctx)?;
                    ctx.write_all(b"]")?;
                }
            }
            write!(ctx, " {{{byte_count}}}\r\n")
        }
        FetchEvent::StreamingBytes(data) => ctx.write_all(data),
        FetchEvent::StreamingEnd => Ok(()),
        FetchEvent::Finish => ctx.write_all(b")\r\n"),
    }
}

impl EncodeIntoContext for Greeting {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b"* ")?;

        match self.kind {
            GreetingKind::Ok => ctx.write_all(b"OK ")?,
            GreetingKind::PreAuth => ctx.write_all(b"PREAUTH ")?,
            GreetingKind::Bye => ctx.write_all(b"BYE ")?,
        }

        if let Some(code) = &self.code {
            ctx.write_all(b"[")?;
            code.encode_ctx(ctx)?;
            ctx.write_all(b"] ")?;
        }

        self.text.encode_ctx(ctx)?;
        ctx.write_all(b"\r\n")
    }
}

impl EncodeIntoContext for Code {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Alert => ctx.write_all(b"ALERT"),
            Self::BadCharset { allowed } => {
                ctx.write_all(b"BADCHARSET")?;
                if !allowed.is_empty() {
                    ctx.write_all(b" (")?;
                    join_serializable(allowed, b" ", ctx)?;
                    ctx.write_all(b")")?;
                }
                Ok(())
            }
            Self::Capability(capabilities) => {
                ctx.write_all(b"CAPABILITY ")?;
                join_serializable(capabilities.as_ref(), b" ", ctx)
            }
            Self::Parse => ctx.write_all(b"PARSE"),
            Self::PermanentFlags(flags) => {
                ctx.write_all(b"PERMANENTFLAGS (")?;
                join_serializable(flags, b" ", ctx)?;
                ctx.write_all(b")")
            }
            Self::ReadOnly => ctx.write_all(b"READ-ONLY"),
            Self::ReadWrite => ctx.write_all(b"READ-WRITE"),
            Self::TryCreate => ctx.write_all(b"TRYCREATE"),
            Self::UidNext(value) => write!(ctx, "UIDNEXT {value}"),
            Self::UidValidity(value) => write!(ctx, "UIDVALIDITY {value}"),
            Self::Unseen(value) => write!(ctx, "UNSEEN {value}"),
            Self::AppendUid { uid_validity, uid } => {
                write!(ctx, "APPENDUID {uid_validity} {uid}")
            }
            Self::CopyUid {
                uid_validity,
                source,
                destination,
            } => {
                write!(ctx, "COPYUID {uid_validity} ")?;
                source.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                destination.encode_ctx(ctx)
            }
            Self::UidNotSticky => ctx.write_all(b"UIDNOTSTICKY"),
            Self::HighestModSeq(mod_seq) => write!(ctx, "HIGHESTMODSEQ {mod_seq}"),
            Self::NoModSeq => ctx.write_all(b"NOMODSEQ"),
            Self::Modified(set) => {
                ctx.write_all(b"MODIFIED ")?;
                set.encode_ctx(ctx)
            }
            Self::Closed => ctx.write_all(b"CLOSED"),
            Self::TooBig => ctx.write_all(b"TOOBIG"),
            Self::UnknownCte => ctx.write_all(b"UNKNOWN-CTE"),
            Self::UrlMech(mechanisms) => {
                ctx.write_all(b"URLMECH")?;
                for mechanism in mechanisms {
                    write!(ctx, " {mechanism}")?;
                }
                Ok(())
            }
            Self::Metadata(code) => {
                ctx.write_all(b"METADATA ")?;
                code.encode_ctx(ctx)
            }
            Self::Other(other) => ctx.write_all(other.inner()),
        }
    }
}

impl EncodeIntoContext for StatusBody {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self.kind {
            StatusKind::Ok => ctx.write_all(b"OK ")?,
            StatusKind::No => ctx.write_all(b"NO ")?,
            StatusKind::Bad => ctx.write_all(b"BAD ")?,
        }

        if let Some(code) = &self.code {
            ctx.write_all(b"[")?;
            code.encode_ctx(ctx)?;
            ctx.write_all(b"] ")?;
        }

        self.text.encode_ctx(ctx)
    }
}

impl EncodeIntoContext for Tagged {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        self.tag.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        self.body.encode_ctx(ctx)?;
        ctx.write_all(b"\r\n")
    }
}

impl EncodeIntoContext for Bye {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b"* BYE ")?;

        if let Some(code) = &self.code {
            ctx.write_all(b"[")?;
            code.encode_ctx(ctx)?;
            ctx.write_all(b"] ")?;
        }

        self.text.encode_ctx(ctx)?;
        ctx.write_all(b"\r\n")
    }
}

impl EncodeIntoContext for ContinuationRequest {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        match self {
            Self::Basic { code, text } => {
                ctx.write_all(b"+ ")?;
                if let Some(code) = code {
                    ctx.write_all(b"[")?;
                    code.encode_ctx(ctx)?;
                    ctx.write_all(b"] ")?;
                }
                text.encode_ctx(ctx)?;
                ctx.write_all(b"\r\n")
            }
            Self::Base64(data) => {
                ctx.write_all(_base64.encode(data).as_bytes())?;
                ctx.write_all(b"\r\n")
            }
        }
    }
}

impl EncodeIntoContext for NamespaceDescr {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        ctx.write_all(b"(")?;
        self.prefix.encode_ctx(ctx)?;
        ctx.write_all(b" ")?;
        match self.delimiter {
            Some(delimiter) => delimiter.encode_ctx(ctx)?,
            None => ctx.write_all(b"NIL")?,
        }
        ctx.write_all(b")")
    }
}

impl EncodeIntoContext for Data {
    fn encode_ctx(&self, ctx: &mut EncodeContext) -> std::io::Result<()> {
        fn namespace_group(
            descriptors: &[NamespaceDescr],
            ctx: &mut EncodeContext,
        ) -> std::io::Result<()> {
            if descriptors.is_empty() {
                return ctx.write_all(b"NIL");
            }

            ctx.write_all(b"(")?;
            join_serializable(descriptors, b"", ctx)?;
            ctx.write_all(b")")
        }

        ctx.write_all(b"* ")?;

        match self {
            Self::Capability(capabilities) => {
                ctx.write_all(b"CAPABILITY ")?;
                join_serializable(capabilities.as_ref(), b" ", ctx)?;
            }
            Self::List {
                items,
                delimiter,
                mailbox,
            }
            | Self::Lsub {
                items,
                delimiter,
                mailbox,
            } => {
                if matches!(self, Self::List { .. }) {
                    ctx.write_all(b"LIST (")?;
                } else {
                    ctx.write_all(b"LSUB (")?;
                }
                join_serializable(items, b" ", ctx)?;
                ctx.write_all(b") ")?;
                match delimiter {
                    Some(delimiter) => delimiter.encode_ctx(ctx)?,
                    None => ctx.write_all(b"NIL")?,
                }
                ctx.write_all(b" ")?;
                mailbox.encode_ctx(ctx)?;
            }
            Self::Status { mailbox, items } => {
                ctx.write_all(b"STATUS ")?;
                mailbox.encode_ctx(ctx)?;
                ctx.write_all(b" (")?;
                join_serializable(items, b" ", ctx)?;
                ctx.write_all(b")")?;
            }
            Self::Search(sequence_numbers) => {
                ctx.write_all(b"SEARCH")?;
                for number in sequence_numbers {
                    write!(ctx, " {number}")?;
                }
            }
            Self::ESearch {
                correlator,
                uid,
                items,
            } => {
                ctx.write_all(b"ESEARCH")?;
                if let Some(correlator) = correlator {
                    write!(ctx, " (TAG \"{}\")", correlator.inner())?;
                }
                if *uid {
                    ctx.write_all(b" UID")?;
                }
                for item in items {
                    ctx.write_all(b" ")?;
                    item.encode_ctx(ctx)?;
                }
            }
            Self::Flags(flags) => {
                ctx.write_all(b"FLAGS (")?;
                join_serializable(flags, b" ", ctx)?;
                ctx.write_all(b")")?;
            }
            Self::Exists(count) => write!(ctx, "{count} EXISTS")?,
            Self::Recent(count) => write!(ctx, "{count} RECENT")?,
            Self::Expunge(seq) => write!(ctx, "{seq} EXPUNGE")?,
            Self::Vanished { earlier, uids } => {
                ctx.write_all(b"VANISHED")?;
                if *earlier {
                    ctx.write_all(b" (EARLIER)")?;
                }
                ctx.write_all(b" ")?;
                uids.encode_ctx(ctx)?;
            }
            Self::Namespace {
                personal,
                other_users,
                shared,
            } => {
                ctx.write_all(b"NAMESPACE ")?;
                namespace_group(personal, ctx)?;
                ctx.write_all(b" ")?;
                namespace_group(other_users, ctx)?;
                ctx.write_all(b" ")?;
                namespace_group(shared, ctx)?;
            }
            Self::Quota { root, quotas } => {
                ctx.write_all(b"QUOTA ")?;
                root.encode_ctx(ctx)?;
                ctx.write_all(b" (")?;
                join_serializable(quotas.as_ref(), b" ", ctx)?;
                ctx.write_all(b")")?;
            }
            Self::QuotaRoot { mailbox, roots } => {
                ctx.write_all(b"QUOTAROOT ")?;
                mailbox.encode_ctx(ctx)?;
                for root in roots {
                    ctx.write_all(b" ")?;
                    root.encode_ctx(ctx)?;
                }
            }
            Self::Metadata { mailbox, value } => {
                ctx.write_all(b"METADATA ")?;
                mailbox.encode_ctx(ctx)?;
                ctx.write_all(b" ")?;
                match value {
                    MetadataResponse::WithValues(values) => {
                        ctx.write_all(b"(")?;
                        join_serializable(values.as_ref(), b" ", ctx)?;
                        ctx.write_all(b")")?;
                    }
                    MetadataResponse::WithoutValues(entries) => {
                        join_serializable(entries.as_ref(), b" ", ctx)?;
                    }
                }
            }
            Self::Enabled { capabilities } => {
                ctx.write_all(b"ENABLED")?;
                for capability in capabilities {
                    write!(ctx, " {capability}")?;
                }
            }
            Self::Id { parameters } => {
                ctx.write_all(b"ID ")?;
                match parameters {
                    Some(parameters) => {
                        ctx.write_all(b"(")?;
                        if let Some(((key, value), tail)) = parameters.split_first() {
                            key.encode_ctx(ctx)?;
                            ctx.write_all(b" ")?;
                            value.encode_ctx(ctx)?;
                            for (key, value) in tail {
                                ctx.write_all(b" ")?;
                                key.encode_ctx(ctx)?;
                                ctx.write_all(b" ")?;
                                value.encode_ctx(ctx)?;
                            }
                        }
                        ctx.write_all(b")")?;
                    }
                    None => ctx.write_all(b"NIL")?,
                }
            }
            Self::UrlFetch(pairs) => {
                ctx.write_all(b"URLFETCH")?;
                for (url, data) in pairs.as_ref() {
                    ctx.write_all(b" ")?;
                    url.encode_ctx(ctx)?;
                    ctx.write_all(b" ")?;
                    data.encode_ctx(ctx)?;
                }
            }
            Self::Condition(body) => {
                body.encode_ctx(ctx)?;
            }
        }

        ctx.write_all(b"\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CommandEncoder, ResponseEncoder};
    use crate::types::core::Vec1;

    fn encode_command(part: &CommandStreamPart) -> Vec<u8> {
        let mut out = Vec::new();
        CommandEncoder::new(false).encode(part, &mut out);
        out
    }

    fn tagged(body: CommandBody) -> CommandStreamPart {
        CommandStreamPart::Tagged(Command::new("A", body).unwrap())
    }

    #[test]
    fn test_encode_simple_commands() {
        assert_eq!(encode_command(&tagged(CommandBody::Noop)), b"A NOOP\r\n");
        assert_eq!(
            encode_command(&tagged(CommandBody::Check)),
            b"A CHECK\r\n"
        );
        assert_eq!(
            encode_command(&tagged(CommandBody::select("inbox").unwrap())),
            b"A SELECT INBOX\r\n"
        );
    }

    #[test]
    fn test_encode_login_chooses_string_forms() {
        assert_eq!(
            encode_command(&tagged(CommandBody::login("alice", "pa ss").unwrap())),
            b"A LOGIN alice \"pa ss\"\r\n"
        );
    }

    #[test]
    fn test_encode_login_redacted() {
        let mut out = Vec::new();
        CommandEncoder::new(true).encode(
            &tagged(CommandBody::login("alice", "secret").unwrap()),
            &mut out,
        );

        assert_eq!(out, "A LOGIN alice \u{2205}\r\n".as_bytes());
    }

    #[test]
    fn test_encode_literal_respects_capabilities() {
        let part = tagged(CommandBody::login("alice", "pa\rss").unwrap());

        assert_eq!(
            encode_command(&part),
            b"A LOGIN alice {5}\r\npa\rss\r\n"
        );

        let mut encoder = CommandEncoder::new(false);
        encoder.set_capabilities(&[Capability::LiteralPlus]);
        let mut out = Vec::new();
        encoder.encode(&part, &mut out);
        assert_eq!(out, b"A LOGIN alice {5+}\r\npa\rss\r\n");
    }

    #[test]
    fn test_encode_search_elides_charset_without_strings() {
        let with_string = tagged(CommandBody::Search {
            charset: Some(Charset::try_from("UTF-8").unwrap()),
            criteria: SearchKey::And(
                Vec1::try_from(vec![
                    SearchKey::Draft,
                    SearchKey::To(AString::try_from("foo").unwrap()),
                ])
                .unwrap(),
            ),
            return_options: Vec::new(),
            uid: false,
        });
        assert_eq!(
            encode_command(&with_string),
            b"A SEARCH CHARSET UTF-8 DRAFT TO foo\r\n"
        );

        let without_string = tagged(CommandBody::Search {
            charset: Some(Charset::try_from("UTF-8").unwrap()),
            criteria: SearchKey::Deleted,
            return_options: Vec::new(),
            uid: false,
        });
        assert_eq!(encode_command(&without_string), b"A SEARCH DELETED\r\n");
    }

    #[test]
    fn test_encode_append_stream() {
        let parts = [
            CommandStreamPart::AppendStart {
                tag: Tag::try_from("A").unwrap(),
                mailbox: Mailbox::try_from("box").unwrap(),
            },
            CommandStreamPart::AppendBeginMessage(AppendMessage {
                options: crate::types::command::AppendOptions {
                    flags: vec![Flag::Seen],
                    internal_date: None,
                },
                data: AppendMessageData::Literal {
                    byte_count: 5,
                    binary: false,
                },
            }),
            CommandStreamPart::AppendMessageBytes {
                data: b"hello".to_vec(),
                is_final: true,
            },
            CommandStreamPart::AppendEndMessage,
            CommandStreamPart::AppendFinish,
        ];

        let mut encoder = CommandEncoder::new(false);
        encoder.set_capabilities(&[Capability::LiteralPlus]);
        let mut out = Vec::new();
        for part in &parts {
            encoder.encode(part, &mut out);
        }

        assert_eq!(out, b"A APPEND box (\\Seen) {5+}\r\nhello\r\n");
    }

    #[test]
    fn test_encode_append_stream_redacted() {
        let parts = [
            CommandStreamPart::AppendStart {
                tag: Tag::try_from("A").unwrap(),
                mailbox: Mailbox::try_from("box").unwrap(),
            },
            CommandStreamPart::AppendBeginMessage(AppendMessage {
                options: Default::default(),
                data: AppendMessageData::Literal {
                    byte_count: 5,
                    binary: false,
                },
            }),
            CommandStreamPart::AppendMessageBytes {
                data: b"hello".to_vec(),
                is_final: true,
            },
            CommandStreamPart::AppendEndMessage,
            CommandStreamPart::AppendFinish,
        ];

        let mut out = Vec::new();
        let encoder = CommandEncoder::new(true);
        for part in &parts {
            encoder.encode(part, &mut out);
        }

        // The mailbox and the payload are replaced; the literal length
        // matches the placeholder.
        assert_eq!(out, "A APPEND \u{2205} {3}\r\n\u{2205}\r\n".as_bytes());
    }

    #[test]
    fn test_encode_idle_done() {
        assert_eq!(encode_command(&CommandStreamPart::IdleDone), b"DONE\r\n");
    }

    #[test]
    fn test_encode_fetch_event_stream() {
        use crate::stream::{FetchEvent, Response};

        let events = [
            FetchEvent::Start(2.try_into().unwrap()),
            FetchEvent::Simple(MessageDataItem::Uid(54.try_into().unwrap())),
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
        ];

        let mut encoder = ResponseEncoder::new();
        let mut out = Vec::new();
        for event in events {
            encoder.encode(
                &ResponseOrContinuationRequest::Response(Response::Fetch(event)),
                &mut out,
            );
        }

        assert_eq!(out, b"* 2 FETCH (UID 54 BODY[TEXT] {1}\r\nX)\r\n");
    }

    #[test]
    fn test_encode_tagged_response() {
        let mut encoder = ResponseEncoder::new();
        let mut out = Vec::new();
        encoder.encode(
            &ResponseOrContinuationRequest::Response(Response::Tagged(Tagged {
                tag: Tag::try_from("tag").unwrap(),
                body: StatusBody {
                    kind: StatusKind::Ok,
                    code: None,
                    text: Text::try_from("Fetch completed.").unwrap(),
                },
            })),
            &mut out,
        );

        assert_eq!(out, b"tag OK Fetch completed.\r\n");
    }

    #[test]
    fn test_encode_untagged_data() {
        let mut encoder = ResponseEncoder::new();
        let mut out = Vec::new();
        encoder.encode(
            &ResponseOrContinuationRequest::Response(Response::Untagged(Data::Exists(42))),
            &mut out,
        );
        assert_eq!(out, b"* 42 EXISTS\r\n");

        let mut out = Vec::new();
        encoder.encode(
            &ResponseOrContinuationRequest::Response(Response::Untagged(Data::Capability(
                Vec1::try_from(vec![Capability::Imap4Rev1, Capability::LiteralPlus]).unwrap(),
            ))),
            &mut out,
        );
        assert_eq!(out, b"* CAPABILITY IMAP4rev1 LITERAL+\r\n");
    }

    #[test]
    fn test_encode_continuation_request() {
        let mut encoder = ResponseEncoder::new();
        let mut out = Vec::new();
        encoder.encode(
            &ResponseOrContinuationRequest::ContinuationRequest(ContinuationRequest::Basic {
                code: None,
                text: Text::try_from("Ready for literal data").unwrap(),
            }),
            &mut out,
        );

        assert_eq!(out, b"+ Ready for literal data\r\n");
    }

    #[test]
    fn test_encode_datetime() {
        let datetime = DateTime::try_from(
            chrono::DateTime::parse_from_rfc2822("Mon, 7 Feb 1994 21:52:25 -0800").unwrap(),
        )
        .unwrap();

        let mut ctx = EncodeContext::new(&[], false);
        datetime.encode_ctx(&mut ctx).unwrap();
        assert_eq!(ctx.into_bytes(), b"\"07-Feb-1994 21:52:25 -0800\"");
    }

    #[test]
    fn test_encode_sequence_set() {
        let mut ctx = EncodeContext::new(&[], false);
        SequenceSet::Sequences(
            Vec1::try_from(vec![
                Sequence::Single(SeqOrUid::Value(2.try_into().unwrap())),
                Sequence::Range(SeqOrUid::Value(4.try_into().unwrap()), SeqOrUid::Asterisk),
            ])
            .unwrap(),
        )
        .encode_ctx(&mut ctx)
        .unwrap();
        assert_eq!(ctx.into_bytes(), b"2,4:*");

        let mut ctx = EncodeContext::new(&[], false);
        SequenceSet::SavedResult.encode_ctx(&mut ctx).unwrap();
        assert_eq!(ctx.into_bytes(), b"$");
    }

    #[test]
    fn test_encode_store() {
        let part = tagged(CommandBody::Store {
            sequence_set: SequenceSet::try_from(7).unwrap(),
            kind: StoreType::Add,
            response: StoreResponse::Silent,
            flags: vec![Flag::Deleted],
            modifiers: vec![StoreModifier::UnchangedSince(320162338)],
            uid: false,
        });

        assert_eq!(
            encode_command(&part),
            b"A STORE 7 (UNCHANGEDSINCE 320162338) +FLAGS.SILENT (\\Deleted)\r\n"
        );
    }

    #[test]
    fn test_encode_body_structure() {
        let body = BodyStructure::Single(crate::types::body::SinglePart {
            fields: BasicFields {
                parameter_list: vec![],
                id: NString(None),
                description: NString(None),
                content_transfer_encoding: ContentTransferEncoding::Base64,
                size: 42,
            },
            kind: SinglePartKind::Text {
                subtype: MediaSubtype::from("foo"),
                number_of_lines: 1337,
            },
            extension_data: None,
        });

        let mut ctx = EncodeContext::new(&[], false);
        MessageDataItem::Body(body).encode_ctx(&mut ctx).unwrap();
        assert_eq!(
            ctx.into_bytes(),
            b"BODY (\"TEXT\" \"foo\" NIL NIL NIL \"BASE64\" 42 1337)".to_vec()
        );
    }
}
