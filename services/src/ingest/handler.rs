//! `/api/upload` endpoint handlers.

use super::error::IngestError;
use super::multipart::{IncomingFile, read_files};
use crate::config::Config;
use crate::state::AppState;
use crate::storage::{FileStorage, ObjectMetadata, StorageRequest, StoredObject, keys};
use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use futures::future::join_all;
use stashbox_utils::{UploadErrorBody, UploadSuccessBody, UploadedFile, ValidationPolicy};

/// Accept a batch of files and store them.
///
/// Every file is validated before anything is written, so a single invalid
/// file rejects the whole batch. Valid batches are stored concurrently and
/// reported in submission order.
pub async fn upload<S>(
    State(state): State<AppState<S>>,
    Extension(config): Extension<Config>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
    S: FileStorage,
{
    let policy = ValidationPolicy::server();

    let result = match multipart {
        Ok(mut multipart) => match read_files(&mut multipart, policy.max_file_count).await {
            Ok(files) => ingest(&state.storage, &config, &policy, files).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(IngestError::Multipart(rejection.body_text())),
    };

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            if e.is_client_error() {
                tracing::info!("Upload rejected: {}", e);
            } else {
                tracing::error!("Upload error: {:?}", e);
            }
            (
                e.status_code(),
                Json(e.to_body(config.exposes_error_details())),
            )
                .into_response()
        }
    }
}

/// Any method other than `POST` on the upload route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(UploadErrorBody::new("Method not allowed")),
    )
}

/// Validates and stores a batch that has already been read off the wire.
#[tracing::instrument(skip_all, fields(file_count = files.len()))]
pub async fn ingest<S>(
    storage: &S,
    config: &Config,
    policy: &ValidationPolicy,
    files: Vec<IncomingFile>,
) -> Result<UploadSuccessBody, IngestError>
where
    S: FileStorage,
{
    if files.is_empty() {
        return Err(IngestError::NoFiles);
    }
    if files.len() > policy.max_file_count {
        return Err(IngestError::TooManyFiles {
            max: policy.max_file_count,
        });
    }

    for file in &files {
        policy.validate(&file.declared())?;
    }

    let described: Vec<(String, String, u64)> = files
        .iter()
        .map(|f| (f.name.clone(), f.mime_type.clone(), f.size()))
        .collect();

    let results = store_all(storage, files).await;

    let total = results.len();
    let mut stored_keys = Vec::with_capacity(total);
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(stored) => stored_keys.push(stored.key),
            Err(e) => failures.push(e),
        }
    }

    if let Some(first) = failures.first() {
        let err = IngestError::Storage {
            failed: failures.len(),
            total,
            message: first.to_string(),
        };
        compensate(storage, &stored_keys).await;
        return Err(err);
    }

    let files = described
        .into_iter()
        .zip(stored_keys)
        .map(|((file_name, mime_type, size), key)| UploadedFile {
            url: config.public_url(&key),
            file_name,
            key,
            size,
            mime_type,
        })
        .collect();

    Ok(UploadSuccessBody::new(files))
}

/// Stores every file on its own task and returns one result per file, in
/// input order.
async fn store_all<S>(storage: &S, files: Vec<IncomingFile>) -> Vec<Result<StoredObject, IngestError>>
where
    S: FileStorage,
{
    let handles: Vec<_> = files
        .into_iter()
        .map(|file| {
            let storage = storage.clone();
            tokio::spawn(async move {
                let key = keys::generate_key(&file.name);
                let request = StorageRequest::new(
                    key,
                    file.content,
                    file.mime_type,
                    ObjectMetadata::new(file.name, Utc::now()),
                );
                storage.put(request).await
            })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(Ok(stored)) => {
                tracing::debug!(key = %stored.key, size = stored.size, "Stored object");
                Ok(stored)
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to store object: {}", e);
                Err(IngestError::Storage {
                    failed: 1,
                    total: 1,
                    message: e.to_string(),
                })
            }
            Err(e) => {
                tracing::error!("Store task failed: {}", e);
                Err(IngestError::Task(e.to_string()))
            }
        })
        .collect()
}

/// Best-effort removal of objects written by a batch that failed overall.
async fn compensate<S>(storage: &S, keys: &[String])
where
    S: FileStorage,
{
    if keys.is_empty() {
        return;
    }

    tracing::warn!(count = keys.len(), "Removing objects stored by a failed batch");
    let results = join_all(keys.iter().map(|key| storage.delete(key))).await;
    for (key, result) in keys.iter().zip(results) {
        if let Err(e) = result {
            tracing::warn!(key = %key, "Failed to remove object after batch failure: {}", e);
        }
    }
}
