//! Message assembly: request validation, the fixed header block and the
//! four body shapes.
//!
//! The emitted shape depends on which bodies are present and whether there
//! are attachments:
//!
//! * plain and HTML → `multipart/alternative`, plain part first;
//! * HTML only → a single `text/html` part;
//! * plain only (or neither) → a single `text/plain` part;
//! * any attachments → `multipart/mixed` wrapping the shape above, one
//!   base64 part per attachment in input order.

pub(crate) mod attachment;
pub(crate) mod header;
pub(crate) mod part;
pub(crate) mod token;

use tracing::debug;

use crate::error::Error;
use crate::random::{RandomSource, SystemRandom};
use crate::request::ComposeRequest;
use crate::time::{Clock, SystemClock};

use self::attachment::ResolvedAttachment;
use self::header::write_header;

/// Date header format: RFC 5322 date-time with a numeric zone offset.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Encodes `request` using the system clock and operating-system entropy.
///
/// Shortcut for `Encoder::new().encode(request)`.
pub fn encode(request: &ComposeRequest) -> Result<EncodedMessage, Error> {
    Encoder::new().encode(request)
}

/// A transport-ready message: CRLF line endings throughout, every
/// multipart region closed. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    bytes: Vec<u8>,
}

impl EncodedMessage {
    /// The raw message bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the message, returning the underlying buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Message length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the message is empty. A successful encode never is.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for EncodedMessage {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Turns compose requests into RFC 5322 / MIME byte streams.
///
/// [`Encoder::new`] draws randomness and time from the operating system;
/// [`Encoder::with_capabilities`] injects both, letting tests pin exact
/// output. The encoder holds no shared mutable state, so concurrent
/// encodes of independent requests need no locking.
#[derive(Debug, Clone, Default)]
pub struct Encoder<R = SystemRandom, C = SystemClock> {
    random: R,
    clock: C,
}

impl Encoder {
    /// Creates an encoder backed by the system capabilities.
    pub fn new() -> Self {
        Self {
            random: SystemRandom,
            clock: SystemClock,
        }
    }
}

impl<R: RandomSource, C: Clock> Encoder<R, C> {
    /// Creates an encoder with explicit randomness and clock.
    pub fn with_capabilities(random: R, clock: C) -> Self {
        Self { random, clock }
    }

    /// Encodes one request into a complete message.
    ///
    /// Validation and attachment resolution run to completion before any
    /// output is assembled; on error the caller observes nothing of the
    /// message. The request itself is never modified.
    pub fn encode(&self, request: &ComposeRequest) -> Result<EncodedMessage, Error> {
        validate(request)?;

        let attachments = request
            .attachments
            .iter()
            .map(attachment::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        for resolved in &attachments {
            header::check_header_value("Content-Type", &resolved.mime_type)?;
            header::check_header_value(
                "Content-Disposition",
                &part::disposition_filename(&resolved.filename),
            )?;
        }

        let plain = normalize_crlf(request.plain_body.as_deref().unwrap_or(""));
        let html = normalize_crlf(request.html_body.as_deref().unwrap_or(""));
        let has_plain = !plain.trim().is_empty();
        let has_html = !html.trim().is_empty();

        debug!(
            has_plain,
            has_html,
            attachments = attachments.len(),
            "assembling message"
        );

        let mut out = Vec::with_capacity(estimate_capacity(request, &attachments));
        self.write_header_block(&mut out, request)?;

        if attachments.is_empty() {
            self.write_body(&mut out, &plain, &html, has_plain, has_html)?;
            return Ok(EncodedMessage { bytes: out });
        }

        let mixed = token::boundary(&self.random)?;
        write_header(
            &mut out,
            "Content-Type",
            &format!("multipart/mixed; boundary=\"{mixed}\""),
        )?;
        out.extend_from_slice(b"\r\n");

        part::open_boundary(&mut out, &mixed);
        self.write_body(&mut out, &plain, &html, has_plain, has_html)?;

        for resolved in &attachments {
            part::attachment_part(&mut out, &mixed, resolved)?;
        }
        part::close_boundary(&mut out, &mixed);

        Ok(EncodedMessage { bytes: out })
    }

    /// Writes the fixed-order header block, up to but excluding the
    /// Content-Type of the body.
    fn write_header_block(&self, out: &mut Vec<u8>, request: &ComposeRequest) -> Result<(), Error> {
        write_header(out, "From", &request.from)?;
        write_header(out, "To", &request.to.join(", "))?;
        if !request.cc.is_empty() {
            write_header(out, "Cc", &request.cc.join(", "))?;
        }
        if !request.bcc.is_empty() {
            write_header(out, "Bcc", &request.bcc.join(", "))?;
        }
        if let Some(reply_to) = nonblank(&request.reply_to) {
            write_header(out, "Reply-To", reply_to)?;
        }
        write_header(out, "Subject", &header::encode_if_needed(&request.subject))?;
        write_header(out, "Date", &self.clock.now().format(DATE_FORMAT).to_string())?;
        if !has_caller_message_id(request) {
            write_header(
                out,
                "Message-ID",
                &token::message_id(&self.random, &request.from)?,
            )?;
        }
        write_header(out, "MIME-Version", "1.0")?;
        if let Some(in_reply_to) = nonblank(&request.in_reply_to) {
            write_header(out, "In-Reply-To", in_reply_to)?;
        }
        if let Some(references) = nonblank(&request.references) {
            write_header(out, "References", references)?;
        }
        for (name, value) in &request.additional_headers {
            if name.trim().is_empty() || value.trim().is_empty() {
                continue;
            }
            write_header(out, name, value)?;
        }
        Ok(())
    }

    /// Writes the body in one of its three shapes. Inside a
    /// `multipart/mixed` region the same bytes serve as the first part.
    fn write_body(
        &self,
        out: &mut Vec<u8>,
        plain: &str,
        html: &str,
        has_plain: bool,
        has_html: bool,
    ) -> Result<(), Error> {
        match (has_plain, has_html) {
            (true, true) => {
                let alternative = token::boundary(&self.random)?;
                write_header(
                    out,
                    "Content-Type",
                    &format!("multipart/alternative; boundary=\"{alternative}\""),
                )?;
                out.extend_from_slice(b"\r\n");
                part::text_part(out, &alternative, part::TEXT_PLAIN, plain);
                part::text_part(out, &alternative, part::TEXT_HTML, html);
                part::close_boundary(out, &alternative);
            }
            (false, true) => {
                write_header(out, "Content-Type", part::TEXT_HTML)?;
                write_header(out, "Content-Transfer-Encoding", "7bit")?;
                out.extend_from_slice(b"\r\n");
                part::body_with_trailing_crlf(out, html);
            }
            // Plain only, or neither; an empty plain body is permitted.
            _ => {
                write_header(out, "Content-Type", part::TEXT_PLAIN)?;
                write_header(out, "Content-Transfer-Encoding", "7bit")?;
                out.extend_from_slice(b"\r\n");
                part::body_with_trailing_crlf(out, plain);
            }
        }
        Ok(())
    }
}

/// Checks the request before anything is assembled: required fields, and
/// no header-bound string smuggling a line break.
fn validate(request: &ComposeRequest) -> Result<(), Error> {
    if request.from.trim().is_empty() {
        return Err(Error::MissingField("From"));
    }
    if request.to.is_empty() {
        return Err(Error::MissingField("To"));
    }
    if request.subject.trim().is_empty() {
        return Err(Error::MissingField("Subject"));
    }

    header::check_header_value("From", &request.from)?;
    for address in &request.to {
        header::check_header_value("To", address)?;
    }
    for address in &request.cc {
        header::check_header_value("Cc", address)?;
    }
    for address in &request.bcc {
        header::check_header_value("Bcc", address)?;
    }
    if let Some(reply_to) = nonblank(&request.reply_to) {
        header::check_header_value("Reply-To", reply_to)?;
    }
    header::check_header_value("Subject", &request.subject)?;
    if let Some(in_reply_to) = nonblank(&request.in_reply_to) {
        header::check_header_value("In-Reply-To", in_reply_to)?;
    }
    if let Some(references) = nonblank(&request.references) {
        header::check_header_value("References", references)?;
    }
    for (name, value) in &request.additional_headers {
        if name.trim().is_empty() || value.trim().is_empty() {
            continue;
        }
        header::check_header_value(name, name)?;
        header::check_header_value(name, value)?;
    }
    Ok(())
}

/// Trimmed value of an optional header, `None` when blank.
fn nonblank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Whether the caller supplied a Message-ID through additional headers.
fn has_caller_message_id(request: &ComposeRequest) -> bool {
    request
        .additional_headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("Message-ID"))
}

/// Normalizes any mix of line endings to CRLF.
fn normalize_crlf(body: &str) -> String {
    body.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\r\n")
}

fn estimate_capacity(request: &ComposeRequest, attachments: &[ResolvedAttachment]) -> usize {
    let bodies = request.plain_body.as_deref().map_or(0, str::len)
        + request.html_body.as_deref().map_or(0, str::len);
    let data: usize = attachments.iter().map(|a| a.data.len()).sum();
    // base64 plus headers grows the payload by roughly a third
    bodies + data + data / 2 + 1024
}

#[cfg(test)]
mod tests {
    use super::{encode, has_caller_message_id, normalize_crlf, validate};
    use crate::error::Error;
    use crate::request::ComposeRequest;

    fn request() -> ComposeRequest {
        ComposeRequest::new("a@b.com", ["c@d.com"], "Hi")
    }

    #[test]
    fn missing_from() {
        let mut req = request();
        req.from = "  ".into();
        assert!(matches!(validate(&req), Err(Error::MissingField("From"))));
    }

    #[test]
    fn missing_to() {
        let mut req = request();
        req.to.clear();
        assert!(matches!(validate(&req), Err(Error::MissingField("To"))));
    }

    #[test]
    fn missing_subject() {
        let mut req = request();
        req.subject = "\t".into();
        assert!(matches!(
            validate(&req),
            Err(Error::MissingField("Subject"))
        ));
    }

    #[test]
    fn line_break_in_recipient_is_rejected() {
        let mut req = request();
        req.to.push("evil@x.com\r\nBcc: hidden@x.com".into());
        assert!(matches!(
            validate(&req),
            Err(Error::InvalidHeaderValue { name }) if name == "To"
        ));
    }

    #[test]
    fn blank_reply_to_is_ignored() {
        let mut req = request();
        req.reply_to = Some("   ".into());
        assert!(validate(&req).is_ok());

        let message = encode(&req).unwrap();
        let text = String::from_utf8(message.into_bytes()).unwrap();
        assert!(!text.contains("Reply-To"));
    }

    #[test]
    fn caller_message_id_detection_is_case_insensitive() {
        let mut req = request();
        req.additional_headers
            .push(("message-id".into(), "<x@y>".into()));
        assert!(has_caller_message_id(&req));

        req.additional_headers.clear();
        req.additional_headers
            .push(("X-Campaign".into(), "spring".into()));
        assert!(!has_caller_message_id(&req));
    }

    #[test]
    fn normalizes_mixed_line_endings() {
        assert_eq!(normalize_crlf("a\nb\r\nc\rd"), "a\r\nb\r\nc\r\nd");
        assert_eq!(normalize_crlf(""), "");
    }

    #[test]
    fn empty_body_is_permitted() {
        let message = encode(&request()).unwrap();
        let text = String::from_utf8(message.into_bytes()).unwrap();
        assert!(text.contains("Content-Type: text/plain; charset=\"utf-8\"\r\n"));
        assert!(text.ends_with("Content-Transfer-Encoding: 7bit\r\n\r\n\r\n"));
    }
}
