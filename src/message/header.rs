use std::borrow::Cow;
use std::fmt::Write as _;

use crate::error::Error;

/// Longest allowed RFC 2047 encoded word, delimiters included.
const MAX_ENCODED_WORD_LEN: usize = 75;

const ENCODED_WORD_PREFIX: &str = "=?utf-8?q?";
const ENCODED_WORD_SUFFIX: &str = "?=";

/// Appends one `name: value` CRLF-terminated header line.
///
/// Rejecting embedded CR and LF here is the defense against header
/// injection: every header-bound string passes through this function.
pub(crate) fn write_header(out: &mut Vec<u8>, name: &str, value: &str) -> Result<(), Error> {
    check_header_value(name, name)?;
    check_header_value(name, value)?;
    out.extend_from_slice(name.as_bytes());
    out.extend_from_slice(b": ");
    out.extend_from_slice(value.as_bytes());
    out.extend_from_slice(b"\r\n");
    Ok(())
}

/// Rejects strings that would break out of the header line they belong to.
pub(crate) fn check_header_value(name: &str, value: &str) -> Result<(), Error> {
    if value.contains(['\r', '\n']) {
        return Err(Error::InvalidHeaderValue { name: name.into() });
    }
    Ok(())
}

/// ASCII values pass through verbatim; anything else becomes RFC 2047
/// encoded words.
pub(crate) fn encode_if_needed(value: &str) -> Cow<'_, str> {
    if value.is_ascii() {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(q_encode(value))
    }
}

/// RFC 2047 "Q" encoding over UTF-8. Content that does not fit one
/// 75-character encoded word is split on character boundaries into several,
/// joined by a single space.
fn q_encode(value: &str) -> String {
    let max_content_len = MAX_ENCODED_WORD_LEN - ENCODED_WORD_PREFIX.len() - ENCODED_WORD_SUFFIX.len();

    let mut words = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        let mut piece = String::new();
        let mut utf8 = [0u8; 4];
        for &byte in ch.encode_utf8(&mut utf8).as_bytes() {
            match byte {
                b' ' => piece.push('_'),
                b'=' | b'?' | b'_' => push_hex(&mut piece, byte),
                0x21..=0x7e => piece.push(char::from(byte)),
                _ => push_hex(&mut piece, byte),
            }
        }
        if !current.is_empty() && current.len() + piece.len() > max_content_len {
            words.push(std::mem::take(&mut current));
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        words.push(current);
    }

    let words: Vec<String> = words
        .into_iter()
        .map(|word| format!("{ENCODED_WORD_PREFIX}{word}{ENCODED_WORD_SUFFIX}"))
        .collect();
    words.join(" ")
}

fn push_hex(out: &mut String, byte: u8) {
    let _ = write!(out, "={byte:02X}");
}
