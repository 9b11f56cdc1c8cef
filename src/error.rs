use std::io;

/// Boxed error, used where the concrete cause is supplied by a caller.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for message encoding
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required compose-request field (`From`, `To` or `Subject`) is
    /// empty.
    #[error("missing {0} in compose request")]
    MissingField(&'static str),

    /// A header-bound string contains a raw CR or LF.
    #[error("invalid {name} header: value contains a line break")]
    InvalidHeaderValue {
        /// Name of the header the value was destined for.
        name: String,
    },

    /// Attachment bytes could not be obtained from the descriptor.
    #[error("could not read attachment {name}")]
    AttachmentUnreadable {
        /// Path or filename identifying the attachment.
        name: String,
        /// The underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// The random source could not supply entropy for boundary or
    /// Message-ID generation.
    #[error("random source unavailable")]
    RandomSource(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::Error;

    #[test]
    fn attachment_error_keeps_cause() {
        let err = Error::AttachmentUnreadable {
            name: "notes.txt".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };

        assert_eq!(err.to_string(), "could not read attachment notes.txt");
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_header_names_the_header() {
        let err = Error::InvalidHeaderValue { name: "To".into() };
        assert!(err.to_string().contains("To"));
    }
}
