//! Async driver for an [`UploadSession`].
//!
//! The controller carries out the session's effects: each batch runs on its
//! own tokio task and reports back over a `flume` channel, while the
//! controller's owner keeps exclusive access to the session. Progress ticks
//! and transfer outcomes are applied by [`UploadController::step`].

use super::pending::PendingFile;
use super::progress::{self, TICK_INTERVAL};
use super::session::{Effect, SessionError, UploadPhase, UploadSession, UploaderOptions};
use super::transport::{TransferOutcome, UploadTransport};
use stashbox_utils::UploadedFile;
use tokio::time::{Interval, MissedTickBehavior};

type CompleteCallback = Box<dyn Fn(&[UploadedFile]) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Message from a batch task back to the controller.
#[derive(Debug)]
struct BatchFinished {
    batch_id: u64,
    outcome: TransferOutcome,
}

enum Step {
    Finished(BatchFinished),
    Tick,
}

pub struct UploadController<T: UploadTransport> {
    session: UploadSession,
    transport: T,
    events_tx: flume::Sender<BatchFinished>,
    events_rx: flume::Receiver<BatchFinished>,
    ticker: Option<Interval>,
    on_complete: Option<CompleteCallback>,
    on_error: Option<ErrorCallback>,
}

impl<T: UploadTransport> UploadController<T> {
    pub fn new(options: UploaderOptions, transport: T) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        Self {
            session: UploadSession::new(options),
            transport,
            events_tx,
            events_rx,
            ticker: None,
            on_complete: None,
            on_error: None,
        }
    }

    /// Called with the uploaded files after every successful batch.
    pub fn on_complete(mut self, callback: impl Fn(&[UploadedFile]) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Called with the error message after every failed batch. Cancellation
    /// is not a failure and never reaches this callback.
    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn phase(&self) -> UploadPhase {
        self.session.phase()
    }

    pub fn select_files(&mut self, files: Vec<PendingFile>) -> Result<(), SessionError> {
        self.session.select_files(files)
    }

    pub fn remove_file(&mut self, index: usize) -> Result<PendingFile, SessionError> {
        self.session.remove_file(index)
    }

    /// Starts a batch. Returns `false` when there was nothing to start.
    pub fn start_upload(&mut self) -> bool {
        let effects = self.session.start_upload();
        let started = !effects.is_empty();
        self.apply(effects);
        started
    }

    pub fn tick_progress(&mut self, increment: f32) {
        self.session.tick_progress(increment);
    }

    pub fn cancel_upload(&mut self) {
        let effects = self.session.cancel_upload();
        self.apply(effects);
    }

    pub fn reset(&mut self) {
        let effects = self.session.reset();
        self.apply(effects);
    }

    /// Waits for the next progress tick or batch outcome and applies it.
    ///
    /// Returns whether a batch is still in flight. Cancel-safe: dropping the
    /// future loses no outcome.
    pub async fn step(&mut self) -> bool {
        if !self.session.is_uploading() {
            return false;
        }
        let Some(ticker) = self.ticker.as_mut() else {
            return false;
        };

        let step = tokio::select! {
            event = self.events_rx.recv_async() => match event {
                Ok(finished) => Step::Finished(finished),
                Err(_) => return false,
            },
            _ = ticker.tick() => Step::Tick,
        };

        match step {
            Step::Finished(BatchFinished { batch_id, outcome }) => {
                let effects = self.session.finish(batch_id, outcome);
                self.apply(effects);
            }
            Step::Tick => {
                let increment = progress::random_increment(&mut rand::thread_rng());
                self.session.tick_progress(increment);
            }
        }

        self.session.is_uploading()
    }

    /// Drives the in-flight batch to its end and returns the final phase.
    pub async fn run_until_settled(&mut self) -> UploadPhase {
        while self.step().await {}
        self.session.phase()
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendBatch {
                    batch_id,
                    files,
                    cancel,
                } => {
                    let transport = self.transport.clone();
                    let tx = self.events_tx.clone();
                    tokio::spawn(async move {
                        let outcome = TransferOutcome::from(transport.send(files, cancel).await);
                        if tx.send(BatchFinished { batch_id, outcome }).is_err() {
                            log::debug!("Controller dropped before batch {} finished", batch_id);
                        }
                    });

                    let mut ticker = tokio::time::interval(TICK_INTERVAL);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    ticker.reset();
                    self.ticker = Some(ticker);
                }
                Effect::AbortTransfer(cancel) => {
                    log::info!("Cancelling upload");
                    cancel.cancel();
                    self.ticker = None;
                }
                Effect::NotifyComplete(files) => {
                    self.ticker = None;
                    if let Some(callback) = &self.on_complete {
                        callback(&files);
                    }
                }
                Effect::NotifyError(message) => {
                    self.ticker = None;
                    if let Some(callback) = &self.on_error {
                        callback(&message);
                    }
                }
            }
        }
    }
}
