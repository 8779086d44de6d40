//! Files waiting to be uploaded.

use bytes::Bytes;
use stashbox_utils::DeclaredFile;
use std::path::{Path, PathBuf};

/// A file selected for upload, held in memory until the batch is sent.
///
/// Duplicate detection uses `name` only, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    pub name: String,
    /// Declared MIME type, empty when unknown.
    pub mime_type: String,
    pub content: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum PendingFileError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no file name", .path.display())]
    NoFileName { path: PathBuf },
}

impl PendingFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
        }
    }

    /// Reads a file from disk, guessing its type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, PendingFileError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PendingFileError::NoFileName {
                path: path.to_path_buf(),
            })?;

        let content = tokio::fs::read(path)
            .await
            .map_err(|source| PendingFileError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mime_type = mime_guess::from_path(path).first_raw().unwrap_or_default();

        Ok(Self::new(name, mime_type, content))
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn declared(&self) -> DeclaredFile<'_> {
        DeclaredFile::new(&self.name, self.size_bytes(), &self.mime_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_from_path_guesses_type_and_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not really a png")
            .unwrap();

        let file = PendingFile::from_path(&path).await.unwrap();
        assert_eq!(file.name, "photo.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size_bytes(), 16);
    }

    #[tokio::test]
    async fn test_from_path_unknown_extension_has_empty_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.zzunknown");
        std::fs::write(&path, b"x").unwrap();

        let file = PendingFile::from_path(&path).await.unwrap();
        assert_eq!(file.mime_type, "");
    }

    #[tokio::test]
    async fn test_from_path_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PendingFile::from_path(dir.path().join("missing.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PendingFileError::Read { .. }));
    }
}
