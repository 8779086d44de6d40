//! Object storage behind the ingest endpoint.
//!
//! Provides the [`FileStorage`] capability with two implementations: an
//! S3-compatible bucket through OpenDAL and an in-memory store used for local
//! development and tests. Keys come from [`keys::generate_key`].

pub mod keys;
mod mock;
mod s3;
mod traits;
mod types;

pub use mock::{MockFileStorage, MockObject};
pub use s3::S3FileStorage;
pub use traits::FileStorage;
pub use types::{FileStorageError, ObjectMetadata, StorageRequest, StoredObject};
