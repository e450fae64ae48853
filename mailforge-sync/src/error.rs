//! Error types for mailforge-sync.
//!
//! Two layers: [`BackendError`] is what adapters return — transport-close,
//! free of sync context. [`SyncError`] is what the engine surfaces —
//! classified into the remote-rejected / unreachable / unexpected taxonomy
//! with backend and email attached, so callers can decide what aborts a run.

use std::path::PathBuf;

use thiserror::Error;

use mailforge_core::{BackendName, EmailName};

use crate::state::StateError;

// ---------------------------------------------------------------------------
// BackendError — adapter level
// ---------------------------------------------------------------------------

/// Failure of a single backend operation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The remote service understood the request and declined it.
    #[error("remote rejected the request (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// A 2xx response that did not contain a usable identifier.
    #[error("remote response missing {what}")]
    MissingId { what: &'static str },

    /// The HTTP round-trip itself failed.
    #[error("transport failure: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    /// Local mirror I/O failure.
    #[error("mirror write failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Anything else — adapter bugs, undecodable success responses.
    #[error("{detail}")]
    Other { detail: String },
}

impl BackendError {
    pub(crate) fn other(detail: impl Into<String>) -> Self {
        Self::Other { detail: detail.into() }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(source: reqwest::Error) -> Self {
        BackendError::Transport { source }
    }
}

/// Convenience constructor for [`BackendError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> BackendError {
    BackendError::Io {
        path: path.into(),
        source,
    }
}

/// Run-policy bucket a [`BackendError`] falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureClass {
    Rejected,
    Unreachable,
    Unexpected,
}

impl BackendError {
    fn class(&self) -> FailureClass {
        match self {
            // A missing identifier counts as the remote declining to
            // produce a usable template, not a transport fault.
            BackendError::Rejected { .. } | BackendError::MissingId { .. } => {
                FailureClass::Rejected
            }
            BackendError::Transport { source } => {
                if source.is_connect() || source.is_timeout() || source.is_request() {
                    FailureClass::Unreachable
                } else {
                    // Received a response we could not make sense of.
                    FailureClass::Unexpected
                }
            }
            BackendError::Io { .. } => FailureClass::Unreachable,
            BackendError::Other { .. } => FailureClass::Unexpected,
        }
    }
}

// ---------------------------------------------------------------------------
// SyncError — engine level
// ---------------------------------------------------------------------------

/// Failure of one (backend, email) sync, classified for run policy.
///
/// `RemoteRejected` and `Unreachable` are reported and skipped past;
/// `Unexpected` and `State` are fatal to the run's exit status.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote service returned a well-formed error response.
    #[error("{backend}: remote rejected '{email}': {source}")]
    RemoteRejected {
        backend: BackendName,
        email: EmailName,
        #[source]
        source: BackendError,
    },

    /// The request never reached the service, or no response arrived.
    #[error("{backend}: could not reach remote for '{email}': {source}")]
    Unreachable {
        backend: BackendName,
        email: EmailName,
        #[source]
        source: BackendError,
    },

    /// Anything else. May indicate a programming error; never swallowed.
    #[error("{backend}: unexpected failure for '{email}': {source}")]
    Unexpected {
        backend: BackendName,
        email: EmailName,
        #[source]
        source: BackendError,
    },

    /// The state store itself failed. Fatal.
    #[error("state store error: {0}")]
    State(#[from] StateError),
}

impl SyncError {
    /// Classify an adapter failure, attaching sync context.
    pub(crate) fn classify(
        backend: &BackendName,
        email: &EmailName,
        source: BackendError,
    ) -> Self {
        let backend = backend.clone();
        let email = email.clone();
        match source.class() {
            FailureClass::Rejected => SyncError::RemoteRejected { backend, email, source },
            FailureClass::Unreachable => SyncError::Unreachable { backend, email, source },
            FailureClass::Unexpected => SyncError::Unexpected { backend, email, source },
        }
    }

    /// Whether this failure must produce a non-zero process exit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Unexpected { .. } | SyncError::State(_))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
