//! Shared building blocks for the Stashbox workspace.
//!
//! Both the client (`stashbox-business`) and the ingest service
//! (`stashbox-services`) depend on this crate for the file validation rules
//! and the JSON contract of the upload endpoint.

pub mod validation;
pub mod version_info;
pub mod wire;

pub use validation::{AllowedTypes, DeclaredFile, ValidationError, ValidationPolicy};
pub use validation::{duplicate_names, format_file_size, validate};
pub use wire::{UploadErrorBody, UploadResponseBody, UploadSuccessBody, UploadedFile};
