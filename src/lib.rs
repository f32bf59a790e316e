//! # imap-wire
//!
//! A streaming wire-protocol codec for IMAP4rev1 ([RFC 3501]) and common
//! extensions (CONDSTORE/QRESYNC, ENABLE, ID, NAMESPACE, METADATA, QUOTA,
//! URLAUTH, ESEARCH, LIST-EXTENDED, SPECIAL-USE, MOVE, BINARY, LITERAL+,
//! CATENATE, MULTIAPPEND, and the Gmail attributes).
//!
//! The crate is built from three layers:
//!
//! * [`framing::SynchronizingLiteralParser`] splits a raw byte stream into
//!   whole protocol frames and counts synchronizing literals, so a server
//!   knows how many continuation requests (`+ ...`) to emit before the peer
//!   will send more data.
//! * [`stream::CommandParser`] and [`stream::ResponseParser`] are pull-style
//!   session parsers. They consume what is buffered, return `None` when a
//!   production is truncated, and stream large payloads (`APPEND` message
//!   ingress, `FETCH` body sections) in chunks instead of buffering them.
//! * [`codec::CommandEncoder`] and [`codec::ResponseEncoder`] serialize every
//!   parsed entity back to its canonical wire form, guided by the negotiated
//!   capabilities and an optional redacting mode for debug transcripts.
//!
//! All interactions are 8-bit clean: mailbox names and string payloads are
//! preserved verbatim and never decoded.
//!
//! [RFC 3501]: https://datatracker.ietf.org/doc/html/rfc3501

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations)]

pub mod codec;
pub mod error;
pub mod framing;
mod parse;
pub mod stream;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod tokio;
pub mod types;

pub use error::ParsingError;
