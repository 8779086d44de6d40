//! S3-compatible object storage through OpenDAL.

use super::traits::FileStorage;
use super::types::{FileStorageError, StorageRequest, StoredObject};
use crate::config::S3Settings;
use opendal::Operator;

/// File storage backed by an S3 bucket.
#[derive(Clone)]
pub struct S3FileStorage {
    operator: Operator,
    bucket: String,
}

impl S3FileStorage {
    /// Builds the operator. Fails only on invalid settings; reachability is
    /// checked separately by [`FileStorage::could_connected`].
    pub fn new(settings: &S3Settings) -> Result<Self, FileStorageError> {
        let mut builder = opendal::services::S3::default()
            .bucket(&settings.bucket)
            .region(&settings.region)
            .access_key_id(&settings.access_key_id)
            .secret_access_key(&settings.secret_access_key);

        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint(endpoint);
        }

        let operator = Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| FileStorageError::ConnectionError(e.to_string()))?;

        Ok(Self {
            operator,
            bucket: settings.bucket.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl FileStorage for S3FileStorage {
    type Error = FileStorageError;

    async fn put(&self, request: StorageRequest) -> Result<StoredObject, Self::Error> {
        let size = request.content.len() as u64;

        let mut write = self
            .operator
            .write_with(&request.key, request.content)
            .user_metadata(request.metadata.to_pairs());
        if !request.content_type.is_empty() {
            write = write.content_type(&request.content_type);
        }
        write
            .await
            .map_err(|e| FileStorageError::StorageError(e.to_string()))?;

        Ok(StoredObject {
            key: request.key,
            size,
            content_type: request.content_type,
        })
    }

    async fn delete(&self, key: &str) -> Result<bool, Self::Error> {
        let exists = self.exists(key).await?;
        if exists {
            self.operator
                .delete(key)
                .await
                .map_err(|e| FileStorageError::StorageError(e.to_string()))?;
        }
        Ok(exists)
    }

    async fn exists(&self, key: &str) -> Result<bool, Self::Error> {
        self.operator
            .exists(key)
            .await
            .map_err(|e| FileStorageError::StorageError(e.to_string()))
    }

    async fn could_connected(&self) -> bool {
        self.operator.check().await.is_ok()
    }
}
