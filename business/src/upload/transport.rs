//! Sending a batch to the ingest endpoint.

use super::pending::PendingFile;
use crate::BusinessConfig;
use reqwest::multipart::{Form, Part};
use stashbox_utils::UploadedFile;
use stashbox_utils::wire::{FILES_FIELD, UploadResponseBody};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Fallback message for a 2xx response that does not report success.
pub const GENERIC_FAILURE: &str = "Upload failed";

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The caller cancelled the transfer.
    #[error("Upload cancelled")]
    Aborted,

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response, with the server's message when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response that did not report success.
    #[error("{message}")]
    Rejected { message: String },
}

/// How a batch ended, as seen by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success(Vec<UploadedFile>),
    Failed(String),
    Aborted,
}

impl From<Result<Vec<UploadedFile>, TransportError>> for TransferOutcome {
    fn from(result: Result<Vec<UploadedFile>, TransportError>) -> Self {
        match result {
            Ok(files) => Self::Success(files),
            Err(TransportError::Aborted) => Self::Aborted,
            Err(TransportError::Network(e)) => {
                log::warn!("Upload request failed: {e}");
                Self::Failed(GENERIC_FAILURE.to_owned())
            }
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Sends one batch and reports the uploaded files.
///
/// Implementations must return [`TransportError::Aborted`] once `cancel`
/// fires, whatever state the request is in.
pub trait UploadTransport: Clone + Send + Sync + 'static {
    fn send(
        &self,
        files: Vec<PendingFile>,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Vec<UploadedFile>, TransportError>> + Send;
}

/// Multipart `POST` to the ingest endpoint over reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    upload_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &BusinessConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config.upload_url())
    }

    pub fn with_client(client: reqwest::Client, upload_url: impl Into<String>) -> Self {
        Self {
            client,
            upload_url: upload_url.into(),
        }
    }

    pub fn upload_url(&self) -> &str {
        &self.upload_url
    }
}

impl UploadTransport for ReqwestTransport {
    async fn send(
        &self,
        files: Vec<PendingFile>,
        cancel: CancellationToken,
    ) -> Result<Vec<UploadedFile>, TransportError> {
        let count = files.len();
        let form = build_form(files)?;

        log::info!("Uploading {} file(s) to {}", count, self.upload_url);

        let request = self.client.post(&self.upload_url).multipart(form).send();
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransportError::Aborted),
            response = request => response?,
        };

        let status = response.status().as_u16();
        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransportError::Aborted),
            body = response.bytes() => body?,
        };

        interpret_response(status, &body)
    }
}

/// One `files` part per file, in order, with name and declared type.
pub fn build_form(files: Vec<PendingFile>) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for file in files {
        let mut part = Part::bytes(file.content.to_vec()).file_name(file.name);
        if !file.mime_type.is_empty() {
            part = part.mime_str(&file.mime_type)?;
        }
        form = form.part(FILES_FIELD, part);
    }
    Ok(form)
}

/// Maps a status code and body to the uploaded files or an error.
///
/// The server's `error` field wins when present. Otherwise non-2xx becomes
/// `Upload failed with status {code}` and an unsuccessful 2xx becomes
/// [`GENERIC_FAILURE`].
pub fn interpret_response(status: u16, body: &[u8]) -> Result<Vec<UploadedFile>, TransportError> {
    let parsed: UploadResponseBody = serde_json::from_slice(body).unwrap_or_else(|e| {
        log::warn!("Unreadable upload response body (status {}): {}", status, e);
        UploadResponseBody::default()
    });

    if !(200..300).contains(&status) {
        let message = parsed
            .error
            .unwrap_or_else(|| format!("Upload failed with status {status}"));
        return Err(TransportError::Status { status, message });
    }

    if !parsed.success {
        let message = parsed.error.unwrap_or_else(|| GENERIC_FAILURE.to_owned());
        return Err(TransportError::Rejected { message });
    }

    Ok(parsed.files)
}
