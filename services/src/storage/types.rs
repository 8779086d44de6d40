//! File storage types.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};

/// Metadata attached to every stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// The file name the uploader submitted.
    pub original_name: String,
    pub upload_date: DateTime<Utc>,
}

impl ObjectMetadata {
    pub fn new(original_name: impl Into<String>, upload_date: DateTime<Utc>) -> Self {
        Self {
            original_name: original_name.into(),
            upload_date,
        }
    }

    /// Key/value pairs as sent to the backend's user metadata.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("originalName".to_owned(), self.original_name.clone()),
            (
                "uploadDate".to_owned(),
                self.upload_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            ),
        ]
    }
}

/// Request to store one object.
#[derive(Debug, Clone)]
pub struct StorageRequest {
    pub key: String,
    pub content: Bytes,
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

impl StorageRequest {
    pub fn new(
        key: impl Into<String>,
        content: impl Into<Bytes>,
        content_type: impl Into<String>,
        metadata: ObjectMetadata,
    ) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            content_type: content_type.into(),
            metadata,
        }
    }
}

/// What the backend reports back after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub content_type: String,
}

/// Error type for file storage operations.
#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}
