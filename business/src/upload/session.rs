//! Upload session state machine.
//!
//! [`UploadSession`] owns everything a single uploader shows: the pending
//! files, the phase, the progress estimate, the last batch's results and the
//! last error. Every operation is a synchronous transition. Operations with
//! side effects return the [`Effect`]s the host must carry out; the session
//! itself never does IO, which keeps it drivable from plain unit tests.
//!
//! ```text
//! Idle ──select──▶ FilesSelected ──start──▶ Uploading ──▶ Completed
//!                                               │      ├─▶ Failed
//!                                               └cancel┴─▶ Cancelled
//! ```
//!
//! The three batch-terminal phases go back to `FilesSelected` on the next
//! successful selection, or to `Idle` on reset or once no files remain.

use super::pending::PendingFile;
use super::progress::{self, PROGRESS_DONE};
use super::transport::TransferOutcome;
use stashbox_utils::{UploadedFile, ValidationError, ValidationPolicy, duplicate_names};
use tokio_util::sync::CancellationToken;

/// Message recorded when the user cancels an in-flight batch.
pub const CANCELLED_MESSAGE: &str = "Upload cancelled";

/// Uploader configuration, fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderOptions {
    /// Append new selections instead of replacing the pending set.
    pub multiple: bool,
    /// `accept`-style type hint, e.g. `image/*,application/pdf`.
    pub accept: String,
    pub max_size_mb: u64,
    pub max_files: usize,
    /// Ignore every selection while set.
    pub disabled: bool,
}

impl Default for UploaderOptions {
    fn default() -> Self {
        Self {
            multiple: true,
            accept: "image/*".to_owned(),
            max_size_mb: 20,
            max_files: 10,
            disabled: false,
        }
    }
}

impl UploaderOptions {
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy::client(self.max_size_mb, self.max_files, &self.accept)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    FilesSelected,
    Uploading,
    Completed,
    Failed,
    Cancelled,
}

/// Work the host performs on behalf of a transition.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Send every file in one request. The outcome must be fed back through
    /// [`UploadSession::finish`] with the same `batch_id`.
    SendBatch {
        batch_id: u64,
        files: Vec<PendingFile>,
        cancel: CancellationToken,
    },
    /// Abort the in-flight request.
    AbortTransfer(CancellationToken),
    NotifyComplete(Vec<UploadedFile>),
    NotifyError(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("An upload is already in progress")]
    Busy,

    #[error("No pending file at index {index}")]
    NoSuchFile { index: usize },
}

#[derive(Debug, Clone)]
pub struct UploadSession {
    options: UploaderOptions,
    policy: ValidationPolicy,
    pending: Vec<PendingFile>,
    phase: UploadPhase,
    progress: f32,
    results: Vec<UploadedFile>,
    last_error: Option<String>,
    cancel_handle: Option<CancellationToken>,
    active_batch: Option<u64>,
    next_batch_id: u64,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new(UploaderOptions::default())
    }
}

impl UploadSession {
    pub fn new(options: UploaderOptions) -> Self {
        let policy = options.policy();
        Self {
            options,
            policy,
            pending: Vec::new(),
            phase: UploadPhase::Idle,
            progress: 0.0,
            results: Vec::new(),
            last_error: None,
            cancel_handle: None,
            active_batch: None,
            next_batch_id: 1,
        }
    }

    pub fn options(&self) -> &UploaderOptions {
        &self.options
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// Estimated progress in percent.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn results(&self) -> &[UploadedFile] {
        &self.results
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Id of the batch currently in flight.
    pub fn active_batch(&self) -> Option<u64> {
        self.active_batch
    }

    /// Adds (or, for single-file uploaders, replaces) pending files.
    ///
    /// A rejected selection leaves the pending set and phase as they were
    /// and records the message in `last_error`.
    pub fn select_files(&mut self, files: Vec<PendingFile>) -> Result<(), SessionError> {
        if self.options.disabled {
            log::debug!("Uploader is disabled, ignoring {} file(s)", files.len());
            return Ok(());
        }
        if files.is_empty() {
            return Ok(());
        }
        if self.is_uploading() {
            return Err(SessionError::Busy);
        }

        if let Err(e) = self.check_selection(&files) {
            log::info!("Rejected file selection: {}", e);
            self.last_error = Some(e.to_string());
            return Err(e.into());
        }

        if self.options.multiple {
            self.pending.extend(files);
        } else {
            self.pending = files;
        }
        self.last_error = None;
        self.phase = UploadPhase::FilesSelected;
        Ok(())
    }

    fn check_selection(&self, files: &[PendingFile]) -> Result<(), ValidationError> {
        let effective = if self.options.multiple {
            self.pending.len() + files.len()
        } else {
            files.len()
        };
        if effective > self.policy.max_file_count {
            return Err(ValidationError::TooManyFiles {
                max: self.policy.max_file_count,
            });
        }

        for file in files {
            self.policy.validate(&file.declared())?;
        }

        let existing: &[PendingFile] = if self.options.multiple {
            &self.pending
        } else {
            &[]
        };
        let names = duplicate_names(
            existing.iter().map(|f| f.name.as_str()),
            files.iter().map(|f| f.name.as_str()),
        );
        if !names.is_empty() {
            return Err(ValidationError::Duplicates { names });
        }

        Ok(())
    }

    /// Drops one pending file and clears any stale error.
    pub fn remove_file(&mut self, index: usize) -> Result<PendingFile, SessionError> {
        if self.is_uploading() {
            return Err(SessionError::Busy);
        }
        if index >= self.pending.len() {
            return Err(SessionError::NoSuchFile { index });
        }

        let removed = self.pending.remove(index);
        self.last_error = None;
        if self.pending.is_empty() {
            self.phase = UploadPhase::Idle;
        } else if self.phase != UploadPhase::FilesSelected {
            self.phase = UploadPhase::FilesSelected;
        }
        Ok(removed)
    }

    /// Starts sending every pending file as one batch.
    ///
    /// Does nothing when there is nothing to send or a batch is already in
    /// flight.
    pub fn start_upload(&mut self) -> Vec<Effect> {
        if self.pending.is_empty() || self.is_uploading() {
            return Vec::new();
        }

        let batch_id = self.next_batch_id;
        self.next_batch_id += 1;

        let cancel = CancellationToken::new();
        self.cancel_handle = Some(cancel.clone());
        self.active_batch = Some(batch_id);
        self.phase = UploadPhase::Uploading;
        self.progress = 0.0;
        self.last_error = None;

        log::debug!("Starting batch {} with {} file(s)", batch_id, self.pending.len());

        vec![Effect::SendBatch {
            batch_id,
            files: self.pending.clone(),
            cancel,
        }]
    }

    /// Advances the progress estimate while a batch is in flight.
    pub fn tick_progress(&mut self, increment: f32) {
        if self.is_uploading() {
            self.progress = progress::advance(self.progress, increment);
        }
    }

    /// Aborts the in-flight batch. Pending files are kept for a retry.
    pub fn cancel_upload(&mut self) -> Vec<Effect> {
        if !self.is_uploading() {
            return Vec::new();
        }

        self.active_batch = None;
        self.phase = UploadPhase::Cancelled;
        self.progress = 0.0;
        self.last_error = Some(CANCELLED_MESSAGE.to_owned());

        self.cancel_handle
            .take()
            .map(Effect::AbortTransfer)
            .into_iter()
            .collect()
    }

    /// Cancels any in-flight batch, then returns to a blank `Idle` session.
    pub fn reset(&mut self) -> Vec<Effect> {
        let effects = self.cancel_upload();

        self.pending.clear();
        self.results.clear();
        self.last_error = None;
        self.progress = 0.0;
        self.phase = UploadPhase::Idle;

        effects
    }

    /// Applies the outcome of batch `batch_id`.
    ///
    /// Outcomes for any batch other than the one in flight are dropped, so a
    /// response arriving after a cancel or reset changes nothing.
    pub fn finish(&mut self, batch_id: u64, outcome: TransferOutcome) -> Vec<Effect> {
        if !self.is_uploading() || self.active_batch != Some(batch_id) {
            log::debug!("Ignoring outcome of stale batch {}", batch_id);
            return Vec::new();
        }

        self.active_batch = None;
        self.cancel_handle = None;
        self.progress = PROGRESS_DONE;

        match outcome {
            TransferOutcome::Success(files) => {
                log::info!("Batch {} uploaded {} file(s)", batch_id, files.len());
                self.phase = UploadPhase::Completed;
                self.pending.clear();
                self.last_error = None;
                self.results.clone_from(&files);
                vec![Effect::NotifyComplete(files)]
            }
            TransferOutcome::Failed(message) => {
                log::warn!("Batch {} failed: {}", batch_id, message);
                self.phase = UploadPhase::Failed;
                self.last_error = Some(message.clone());
                vec![Effect::NotifyError(message)]
            }
            TransferOutcome::Aborted => {
                self.phase = UploadPhase::Cancelled;
                self.progress = 0.0;
                self.last_error = Some(CANCELLED_MESSAGE.to_owned());
                Vec::new()
            }
        }
    }
}
