//! Mock file storage for testing and local development.

use super::traits::FileStorage;
use super::types::{FileStorageError, ObjectMetadata, StorageRequest, StoredObject};
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory implementation of `FileStorage`.
///
/// Failures can be injected per original file name to exercise the
/// ingest error paths.
#[derive(Clone)]
pub struct MockFileStorage {
    objects: Arc<RwLock<HashMap<String, MockObject>>>,
    failing_names: Arc<RwLock<HashSet<String>>>,
    put_attempts: Arc<AtomicUsize>,
    reachable: Arc<AtomicBool>,
}

/// An object held by [`MockFileStorage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockObject {
    pub content: Bytes,
    pub content_type: String,
    pub metadata: ObjectMetadata,
}

impl Default for MockFileStorage {
    fn default() -> Self {
        Self {
            objects: Arc::default(),
            failing_names: Arc::default(),
            put_attempts: Arc::default(),
            reachable: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every `put` for a file submitted as `original_name` fail.
    pub fn fail_uploads_for(&self, original_name: impl Into<String>) {
        self.failing_names
            .write()
            .expect("lock poisoned")
            .insert(original_name.into());
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn get(&self, key: &str) -> Option<MockObject> {
        self.objects.read().expect("lock poisoned").get(key).cloned()
    }

    /// Number of `put` calls received, failed ones included.
    pub fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileStorage for MockFileStorage {
    type Error = FileStorageError;

    async fn put(&self, request: StorageRequest) -> Result<StoredObject, Self::Error> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);

        let should_fail = self
            .failing_names
            .read()
            .expect("lock poisoned")
            .contains(&request.metadata.original_name);
        if should_fail {
            return Err(FileStorageError::StorageError(format!(
                "injected failure writing {}",
                request.key
            )));
        }

        let stored = StoredObject {
            key: request.key.clone(),
            size: request.content.len() as u64,
            content_type: request.content_type.clone(),
        };

        self.objects.write().expect("lock poisoned").insert(
            request.key,
            MockObject {
                content: request.content,
                content_type: request.content_type,
                metadata: request.metadata,
            },
        );

        Ok(stored)
    }

    async fn delete(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self
            .objects
            .write()
            .expect("lock poisoned")
            .remove(key)
            .is_some())
    }

    async fn exists(&self, key: &str) -> Result<bool, Self::Error> {
        Ok(self.objects.read().expect("lock poisoned").contains_key(key))
    }

    async fn could_connected(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}
