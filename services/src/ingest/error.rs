//! Errors raised while ingesting an upload batch.

use axum::http::StatusCode;
use stashbox_utils::{UploadErrorBody, ValidationError};

/// Message returned for every server-side failure.
pub const GENERIC_FAILURE: &str = "Upload failed";

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("No files provided")]
    NoFiles,

    #[error("Too many files. Maximum {max} files allowed")]
    TooManyFiles { max: usize },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Upload exceeds the maximum request size")]
    PayloadTooLarge,

    #[error("Failed to read multipart body: {0}")]
    Multipart(String),

    #[error("{failed} of {total} file(s) could not be stored: {message}")]
    Storage {
        failed: usize,
        total: usize,
        message: String,
    },

    #[error("Upload task failed: {0}")]
    Task(String),
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoFiles | Self::TooManyFiles { .. } | Self::Invalid(_) | Self::PayloadTooLarge => {
                StatusCode::BAD_REQUEST
            }
            Self::Multipart(_) | Self::Storage { .. } | Self::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Response body for this error.
    ///
    /// Client errors carry their own message. Server errors carry the generic
    /// message, plus the internal text in `details` only when
    /// `expose_details` is set.
    pub fn to_body(&self, expose_details: bool) -> UploadErrorBody {
        if self.is_client_error() {
            return UploadErrorBody::new(self.to_string());
        }

        let body = UploadErrorBody::new(GENERIC_FAILURE);
        if expose_details {
            body.with_details(self.to_string())
        } else {
            body
        }
    }
}
