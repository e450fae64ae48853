//! # mailforge-sync
//!
//! The template synchronization core.
//!
//! [`SyncEngine`] decides, per (backend, email) pair, whether a remote
//! template must be created, a new version pushed, or nothing done, and
//! persists the decision in the [`state::StateStore`] so repeated runs are
//! idempotent. [`Dispatcher`] fans one email out to every configured
//! backend concurrently; [`pipeline::run`] is the canonical entrypoint the
//! CLI calls.

pub mod backend;
pub mod backends;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod state;

pub use backend::{CreatedTemplate, TemplateBackend};
pub use dispatch::{Dispatcher, PairReport};
pub use engine::{SyncEngine, SyncOutcome};
pub use error::{BackendError, SyncError};
pub use pipeline::{run, RunReport};
pub use state::{StateKey, StateStore, SyncRecord};
