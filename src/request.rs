use std::path::PathBuf;

/// One message to compose: sender, recipients, subject, bodies, threading
/// headers and attachments.
///
/// Built once per send or draft operation and borrowed by
/// [`encode`](crate::encode); encoding never modifies it, so a request can
/// be inspected or reused afterwards. `from`, at least one `to` entry and
/// `subject` are required; everything else is optional.
#[derive(Debug, Clone, Default)]
pub struct ComposeRequest {
    /// Sender mailbox, e.g. `Ada <ada@example.com>`.
    pub from: String,
    /// Primary recipients, one mailbox per entry.
    pub to: Vec<String>,
    /// Carbon-copy recipients.
    pub cc: Vec<String>,
    /// Blind-carbon-copy recipients.
    pub bcc: Vec<String>,
    /// Mailbox replies should go to instead of `from`.
    pub reply_to: Option<String>,
    /// Subject line. Encoded as RFC 2047 words when it is not pure ASCII.
    pub subject: String,
    /// Plain-text body. Treated as absent when blank.
    pub plain_body: Option<String>,
    /// HTML body. Treated as absent when blank.
    pub html_body: Option<String>,
    /// Message-ID of the message being replied to.
    pub in_reply_to: Option<String>,
    /// Thread reference chain, space-separated Message-IDs.
    pub references: Option<String>,
    /// Extra headers, emitted in insertion order. Entries with a blank
    /// name or value are skipped. Supplying a `Message-ID` entry (any
    /// letter case) suppresses the generated one.
    pub additional_headers: Vec<(String, String)>,
    /// Attachments, emitted in order.
    pub attachments: Vec<Attachment>,
}

impl ComposeRequest {
    /// Creates a request with the three required fields set.
    pub fn new(
        from: impl Into<String>,
        to: impl IntoIterator<Item = impl Into<String>>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into_iter().map(Into::into).collect(),
            subject: subject.into(),
            ..Self::default()
        }
    }
}

/// Source descriptor for one attachment.
///
/// Exactly one of `data` or a readable `path` must be available at encode
/// time. A missing `filename` is derived from the last `path` segment; a
/// missing `mime_type` is sniffed from the filename extension, falling
/// back to `application/octet-stream`. The descriptor itself is never
/// modified by encoding.
#[derive(Debug, Clone, Default)]
pub struct Attachment {
    /// Filesystem location to load bytes from when `data` is absent.
    pub path: Option<PathBuf>,
    /// Name presented to the recipient.
    pub filename: Option<String>,
    /// Declared MIME type, e.g. `application/pdf`.
    pub mime_type: Option<String>,
    /// Raw content. When `None`, read from `path` at encode time.
    pub data: Option<Vec<u8>>,
}

impl Attachment {
    /// Attachment loaded from the filesystem at encode time.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Attachment carrying its bytes inline.
    pub fn from_data(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Sets the declared MIME type, overriding extension sniffing.
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}
