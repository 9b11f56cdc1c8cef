use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::request::Attachment;

/// Fully resolved attachment, ready for emission.
///
/// Built fresh for every encode; the caller's [`Attachment`] descriptors
/// stay untouched.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedAttachment {
    pub(crate) filename: String,
    pub(crate) mime_type: String,
    pub(crate) data: Vec<u8>,
}

/// Fills in filename, MIME type and bytes for one descriptor.
pub(crate) fn resolve(attachment: &Attachment) -> Result<ResolvedAttachment, Error> {
    let filename = match attachment.filename.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => attachment
            .path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let mime_type = match attachment.mime_type.as_deref() {
        Some(mime_type) if !mime_type.trim().is_empty() => mime_type.to_string(),
        _ => mime_guess::from_path(&filename)
            .first()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM)
            .to_string(),
    };

    let data = match (&attachment.data, &attachment.path) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => fs::read(path).map_err(|source| Error::AttachmentUnreadable {
            name: path.display().to_string(),
            source,
        })?,
        (None, None) => {
            return Err(Error::AttachmentUnreadable {
                name: if filename.is_empty() {
                    "<unnamed>".to_string()
                } else {
                    filename
                },
                source: io::Error::new(
                    io::ErrorKind::NotFound,
                    "attachment has neither data nor a path",
                ),
            });
        }
    };

    debug!(
        filename = %filename,
        mime_type = %mime_type,
        bytes = data.len(),
        "resolved attachment"
    );

    Ok(ResolvedAttachment {
        filename,
        mime_type,
        data,
    })
}
