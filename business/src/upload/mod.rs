//! Client side of batch uploads.
//!
//! [`UploadSession`] is the pure state machine, [`UploadController`] runs it
//! against an [`UploadTransport`] such as [`ReqwestTransport`].

mod controller;
mod pending;
pub mod progress;
mod session;
mod transport;

pub use controller::UploadController;
pub use pending::{PendingFile, PendingFileError};
pub use session::{
    CANCELLED_MESSAGE, Effect, SessionError, UploadPhase, UploadSession, UploaderOptions,
};
pub use transport::{
    GENERIC_FAILURE, ReqwestTransport, TransferOutcome, TransportError, UploadTransport,
    build_form, interpret_response,
};
