//! JSON bodies exchanged with the `/api/upload` endpoint.

use serde::{Deserialize, Serialize};

/// Multipart field name carrying each uploaded file.
pub const FILES_FIELD: &str = "files";

/// Path of the ingest endpoint, relative to the API base.
pub const UPLOAD_PATH: &str = "/api/upload";

/// One stored file, as reported back to the uploader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// The name the file was submitted with.
    pub file_name: String,
    /// Storage key, always under `uploads/`.
    pub key: String,
    /// Public URL: `{base}/{key}`.
    pub url: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Body of a `200 OK` upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSuccessBody {
    pub success: bool,
    pub files: Vec<UploadedFile>,
}

impl UploadSuccessBody {
    pub fn new(files: Vec<UploadedFile>) -> Self {
        Self {
            success: true,
            files,
        }
    }
}

/// Body of every error response (400, 405, 500).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl UploadErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Lenient view over any upload response body.
///
/// Clients parse with this first so a malformed or partial body still yields
/// whatever `error` message the server sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponseBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploaded_file_uses_camel_case_and_type_field() {
        let file = UploadedFile {
            file_name: "a.png".to_owned(),
            key: "uploads/a_1.png".to_owned(),
            url: "https://cdn.example.com/uploads/a_1.png".to_owned(),
            size: 42,
            mime_type: "image/png".to_owned(),
        };

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["fileName"], "a.png");
        assert_eq!(json["type"], "image/png");
        assert_eq!(json["size"], 42);
    }

    #[test]
    fn error_body_omits_missing_details() {
        let json = serde_json::to_string(&UploadErrorBody::new("Upload failed")).unwrap();
        assert_eq!(json, r#"{"error":"Upload failed"}"#);

        let json =
            serde_json::to_value(UploadErrorBody::new("Upload failed").with_details("boom")).unwrap();
        assert_eq!(json["details"], "boom");
    }

    #[test]
    fn lenient_body_reads_error_only_payloads() {
        let body: UploadResponseBody = serde_json::from_str(r#"{"error":"No files provided"}"#).unwrap();
        assert!(!body.success);
        assert!(body.files.is_empty());
        assert_eq!(body.error.as_deref(), Some("No files provided"));
    }
}
