use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::Error;
use crate::message::attachment::ResolvedAttachment;
use crate::message::header::write_header;

pub(crate) const TEXT_PLAIN: &str = "text/plain; charset=\"utf-8\"";
pub(crate) const TEXT_HTML: &str = "text/html; charset=\"utf-8\"";

/// Base64 bodies are hard-wrapped at this many characters per line.
const BASE64_LINE_LEN: usize = 76;

/// RFC 5987 keeps only ALPHA / DIGIT / `-._~` unescaped; spaces become
/// `%20`, never `+`.
const RFC5987_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Writes a `--boundary` part opener.
pub(crate) fn open_boundary(out: &mut Vec<u8>, boundary: &str) {
    out.extend_from_slice(b"--");
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(b"\r\n");
}

/// Writes the `--boundary--` terminator closing a multipart region.
pub(crate) fn close_boundary(out: &mut Vec<u8>, boundary: &str) {
    out.extend_from_slice(b"--");
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(b"--\r\n");
}

/// Writes one 7bit text part, opener included.
pub(crate) fn text_part(out: &mut Vec<u8>, boundary: &str, content_type: &str, body: &str) {
    open_boundary(out, boundary);
    out.extend_from_slice(b"Content-Type: ");
    out.extend_from_slice(content_type.as_bytes());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(b"Content-Transfer-Encoding: 7bit\r\n\r\n");
    body_with_trailing_crlf(out, body);
}

/// Writes the body followed by a CRLF unless it already ends with one.
pub(crate) fn body_with_trailing_crlf(out: &mut Vec<u8>, body: &str) {
    out.extend_from_slice(body.as_bytes());
    if !body.ends_with("\r\n") {
        out.extend_from_slice(b"\r\n");
    }
}

/// Writes one base64 attachment part into a `multipart/mixed` region.
pub(crate) fn attachment_part(
    out: &mut Vec<u8>,
    boundary: &str,
    attachment: &ResolvedAttachment,
) -> Result<(), Error> {
    out.extend_from_slice(b"\r\n");
    open_boundary(out, boundary);
    write_header(out, "Content-Type", &attachment.mime_type)?;
    write_header(out, "Content-Transfer-Encoding", "base64")?;
    write_header(
        out,
        "Content-Disposition",
        &format!("attachment; {}", disposition_filename(&attachment.filename)),
    )?;
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(wrap_base64(&attachment.data).as_bytes());
    out.extend_from_slice(b"\r\n");
    Ok(())
}

/// Base64-encodes `data`, hard-wrapped with CRLF line breaks. The last line
/// carries no terminator; the caller appends it.
pub(crate) fn wrap_base64(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + 2 * (encoded.len() / BASE64_LINE_LEN + 1));
    let mut rest = encoded.as_str();
    while rest.len() > BASE64_LINE_LEN {
        let (line, tail) = rest.split_at(BASE64_LINE_LEN);
        out.push_str(line);
        out.push_str("\r\n");
        rest = tail;
    }
    out.push_str(rest);
    out
}

/// Renders the Content-Disposition filename parameter: a quoted string for
/// ASCII names, the RFC 5987/2231 `filename*=UTF-8''..` form otherwise. A
/// blank name falls back to the literal `attachment`.
pub(crate) fn disposition_filename(filename: &str) -> String {
    let filename = filename.trim();
    if filename.is_empty() {
        return "filename=\"attachment\"".to_string();
    }
    if filename.is_ascii() {
        let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("filename=\"{escaped}\"")
    } else {
        format!(
            "filename*=UTF-8''{}",
            utf8_percent_encode(filename, RFC5987_ESCAPE)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{disposition_filename, text_part, wrap_base64};

    #[test]
    fn text_part_layout() {
        let mut out = Vec::new();
        text_part(&mut out, "b0undary", "text/plain; charset=\"utf-8\"", "Hello");

        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "--b0undary\r\n",
                "Content-Type: text/plain; charset=\"utf-8\"\r\n",
                "Content-Transfer-Encoding: 7bit\r\n",
                "\r\n",
                "Hello\r\n",
            )
        );
    }

    #[test]
    fn body_keeps_existing_trailing_crlf() {
        let mut out = Vec::new();
        text_part(&mut out, "b", "text/plain", "Hello\r\n");
        assert!(String::from_utf8(out).unwrap().ends_with("\r\nHello\r\n"));
    }

    #[test]
    fn base64_lines_stay_within_limit() {
        let wrapped = wrap_base64(&[0xAB; 200]);
        assert!(!wrapped.ends_with("\r\n"));
        for line in wrapped.split("\r\n") {
            assert!(line.len() <= 76);
            assert!(!line.is_empty());
        }
    }

    #[test]
    fn base64_exact_wrapping() {
        // 57 input bytes encode to exactly one 76-character line.
        assert_eq!(wrap_base64(&[0u8; 57]).len(), 76);
        assert!(!wrap_base64(&[0u8; 57]).contains("\r\n"));
        assert!(wrap_base64(&[0u8; 58]).contains("\r\n"));
        assert_eq!(wrap_base64(b""), "");
        assert_eq!(wrap_base64(b"abc"), "YWJj");
    }

    #[test]
    fn ascii_filename_is_quoted() {
        assert_eq!(disposition_filename("a.txt"), "filename=\"a.txt\"");
    }

    #[test]
    fn quotes_in_filenames_are_escaped() {
        assert_eq!(
            disposition_filename("a \"b\".txt"),
            "filename=\"a \\\"b\\\".txt\""
        );
    }

    #[test]
    fn non_ascii_filename_uses_extended_form() {
        assert_eq!(
            disposition_filename("Grüße.txt"),
            "filename*=UTF-8''Gr%C3%BC%C3%9Fe.txt"
        );
    }

    #[test]
    fn extended_form_uses_percent20_for_spaces() {
        assert_eq!(
            disposition_filename("übers nächste.txt"),
            "filename*=UTF-8''%C3%BCbers%20n%C3%A4chste.txt"
        );
    }

    #[test]
    fn blank_filename_falls_back() {
        assert_eq!(disposition_filename("  "), "filename=\"attachment\"");
        assert_eq!(disposition_filename(""), "filename=\"attachment\"");
    }
}
