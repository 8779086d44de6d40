//! Reading uploaded files out of a multipart body.

use super::error::IngestError;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use bytes::Bytes;
use stashbox_utils::DeclaredFile;
use stashbox_utils::wire::FILES_FIELD;

/// One file part as delivered by the transport.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    /// Part content type, empty when the client sent none.
    pub mime_type: String,
    pub content: Bytes,
}

impl IncomingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Size as received, independent of anything the client declared.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn declared(&self) -> DeclaredFile<'_> {
        DeclaredFile::new(&self.name, self.size(), &self.mime_type)
    }
}

fn map_multipart_error(err: MultipartError) -> IngestError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IngestError::PayloadTooLarge
    } else {
        IngestError::Multipart(err.body_text())
    }
}

/// Collects every file part under the `files` field, in submission order.
///
/// Parts under other field names and parts without a file name are skipped.
/// Reading stops with [`IngestError::TooManyFiles`] as soon as the batch
/// grows past `max_files`.
pub async fn read_files(
    multipart: &mut Multipart,
    max_files: usize,
) -> Result<Vec<IncomingFile>, IngestError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if files.len() == max_files {
            return Err(IngestError::TooManyFiles { max: max_files });
        }

        let mime_type = field.content_type().unwrap_or_default().to_owned();
        let content = field.bytes().await.map_err(map_multipart_error)?;

        files.push(IncomingFile {
            name,
            mime_type,
            content,
        });
    }

    Ok(files)
}
