use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use email_address::EmailAddress;

use crate::error::Error;
use crate::random::RandomSource;

/// Fixed application tag prefixed to every multipart boundary.
const BOUNDARY_TAG: &str = "mailforge_";

/// Random bytes drawn per boundary token.
const BOUNDARY_LEN: usize = 18;

/// Random bytes drawn per Message-ID local part.
const MESSAGE_ID_LEN: usize = 16;

/// Domain used when none can be recovered from the From mailbox.
const DEFAULT_MESSAGE_ID_DOMAIN: &str = "localhost";

/// Generates one multipart boundary.
///
/// Boundaries within a message differ because each is an independent
/// 18-byte draw; the token is never checked against message content, the
/// collision odds being negligible at this entropy.
pub(crate) fn boundary<R: RandomSource>(random: &R) -> Result<String, Error> {
    let mut bytes = [0u8; BOUNDARY_LEN];
    random.fill(&mut bytes).map_err(Error::RandomSource)?;
    Ok(format!("{}{}", BOUNDARY_TAG, URL_SAFE_NO_PAD.encode(bytes)))
}

/// Generates a `<local@domain>` Message-ID rooted at the sender's domain.
pub(crate) fn message_id<R: RandomSource>(random: &R, from: &str) -> Result<String, Error> {
    let mut bytes = [0u8; MESSAGE_ID_LEN];
    random.fill(&mut bytes).map_err(Error::RandomSource)?;
    Ok(format!(
        "<{}@{}>",
        URL_SAFE_NO_PAD.encode(bytes),
        message_id_domain(from)
    ))
}

/// Recovers the sender's domain: structured mailbox parse first, then a
/// naive scan for `@`, then the fixed fallback.
fn message_id_domain(from: &str) -> String {
    let from = from.trim();

    let addr_spec = match (from.rfind('<'), from.rfind('>')) {
        (Some(open), Some(close)) if open < close => from[open + 1..close].trim(),
        _ => from,
    };
    if let Ok(mailbox) = EmailAddress::from_str(addr_spec) {
        return mailbox.domain().to_string();
    }

    if let Some(at) = from.rfind('@') {
        let domain = from[at + 1..].trim_matches([' ', '>']);
        if !domain.is_empty() {
            return domain.to_string();
        }
    }

    DEFAULT_MESSAGE_ID_DOMAIN.to_string()
}

#[cfg(test)]
mod tests {
    use super::{boundary, message_id, message_id_domain};
    use crate::error::{BoxError, Error};
    use crate::random::RandomSource;

    struct ZeroRandom;

    impl RandomSource for ZeroRandom {
        fn fill(&self, buf: &mut [u8]) -> Result<(), BoxError> {
            buf.fill(0);
            Ok(())
        }
    }

    struct NoRandom;

    impl RandomSource for NoRandom {
        fn fill(&self, _buf: &mut [u8]) -> Result<(), BoxError> {
            Err("entropy pool exhausted".into())
        }
    }

    #[test]
    fn boundary_is_tagged_and_url_safe() {
        let boundary = boundary(&ZeroRandom).unwrap();
        assert_eq!(boundary, "mailforge_AAAAAAAAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn message_id_uses_sender_domain() {
        let id = message_id(&ZeroRandom, "a@b.com").unwrap();
        assert_eq!(id, "<AAAAAAAAAAAAAAAAAAAAAA@b.com>");
    }

    #[test]
    fn entropy_failure_is_reported() {
        assert!(matches!(boundary(&NoRandom), Err(Error::RandomSource(_))));
        assert!(matches!(
            message_id(&NoRandom, "a@b.com"),
            Err(Error::RandomSource(_))
        ));
    }

    #[test]
    fn domain_from_display_name_mailbox() {
        assert_eq!(message_id_domain("Ada Lovelace <ada@example.org>"), "example.org");
    }

    #[test]
    fn domain_from_bare_address() {
        assert_eq!(message_id_domain("ada@example.org"), "example.org");
    }

    #[test]
    fn domain_naive_scan_trims_angle_bracket() {
        assert_eq!(message_id_domain("not really an address @example.org> "), "example.org");
    }

    #[test]
    fn domain_falls_back_when_unrecoverable() {
        assert_eq!(message_id_domain("no at sign here"), "localhost");
        assert_eq!(message_id_domain("trailing@"), "localhost");
    }
}
