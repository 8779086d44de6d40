//! Client library for the stashbox upload service.
//!
//! Holds the uploader state machine, its async controller and the HTTP
//! transport used to reach the ingest endpoint.

mod config;
pub mod upload;

pub use config::{BusinessConfig, DEFAULT_API_BASE_URL};
pub use stashbox_utils::{UploadedFile, ValidationError, format_file_size};
pub use upload::{
    PendingFile, ReqwestTransport, TransferOutcome, UploadController, UploadPhase, UploadSession,
    UploaderOptions,
};
