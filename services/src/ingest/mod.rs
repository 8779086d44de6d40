//! Batch upload ingestion.
//!
//! A request is read into [`IncomingFile`]s, validated as a whole against
//! [`stashbox_utils::ValidationPolicy::server`], then stored concurrently.

mod error;
mod handler;
mod multipart;

pub use error::{GENERIC_FAILURE, IngestError};
pub use handler::{ingest, method_not_allowed, upload};
pub use multipart::{IncomingFile, read_files};

/// Request body limit for the upload route: a full batch of maximum-size
/// files plus room for multipart framing.
pub const MAX_REQUEST_BYTES: usize = stashbox_utils::validation::SERVER_MAX_FILES
    * stashbox_utils::validation::SERVER_MAX_FILE_SIZE_BYTES as usize
    + 1024 * 1024;
