//! Storage trait definitions.

use super::types::{StorageRequest, StoredObject};
use std::future::Future;

/// Generic interface for the object-storage backend.
pub trait FileStorage: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes one object, replacing anything already stored under its key.
    fn put(
        &self,
        request: StorageRequest,
    ) -> impl Future<Output = Result<StoredObject, Self::Error>> + Send;

    /// Deletes an object. Returns `false` when nothing was stored under `key`.
    fn delete(&self, key: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Check if the storage backend could be reached.
    fn could_connected(&self) -> impl Future<Output = bool> + Send;
}
