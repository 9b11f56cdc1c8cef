//! Composes transport-ready RFC 5322 / MIME email messages.
//!
//! `mailforge` turns a [`ComposeRequest`] — sender, recipients, subject,
//! plain and/or HTML bodies, threading headers, attachments — into a
//! complete email byte stream: CRLF line endings, the right multipart
//! nesting for the given bodies and attachments, RFC 2047 encoded
//! subjects, RFC 5987 attachment filenames and 76-column base64 attachment
//! bodies. The result is what a mail provider's send or draft API expects
//! as its raw message (typically base64url-encoded by the caller before
//! embedding; that step is not this crate's concern, and neither are
//! transport, authentication or retries).
//!
//! Encoding is a pure function of the request plus two injectable
//! capabilities, a [`RandomSource`] and a [`Clock`]. The request is only
//! borrowed and never modified. Validation is all-or-nothing: a request
//! that would produce a malformed message fails before any output exists,
//! and a header value carrying a raw CR or LF is always an error rather
//! than an opportunity for header injection.
//!
//! # Examples
//!
//! ```rust
//! use mailforge::{encode, Attachment, ComposeRequest};
//!
//! # fn main() -> Result<(), mailforge::Error> {
//! let request = ComposeRequest {
//!     from: "NoBody <nobody@domain.tld>".into(),
//!     to: vec!["hei@domain.tld".into()],
//!     subject: "Happy new year".into(),
//!     plain_body: Some("Be happy!".into()),
//!     attachments: vec![Attachment::from_data("notes.txt", "see attached")],
//!     ..ComposeRequest::default()
//! };
//!
//! let message = encode(&request)?;
//! assert!(message.as_bytes().starts_with(b"From: NoBody <nobody@domain.tld>\r\n"));
//! # Ok(())
//! # }
//! ```
//!
//! Tests that need byte-exact output inject deterministic capabilities
//! through [`Encoder::with_capabilities`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod random;
mod request;
mod time;

pub mod message;

pub use crate::error::{BoxError, Error};
pub use crate::message::{encode, EncodedMessage, Encoder};
pub use crate::random::{RandomSource, SystemRandom};
pub use crate::request::{Attachment, ComposeRequest};
pub use crate::time::{Clock, SystemClock};
