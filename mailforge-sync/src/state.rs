//! Sync state store — durable per-(backend, email) publish records.
//!
//! Persists one JSON document per backend at
//! `<state_dir>/<backend_name>.json`:
//!
//! ```json
//! {
//!   "synced_at": "2026-08-07T12:00:00Z",
//!   "records": {
//!     "welcome_en": { "remote_id": "t1", "version_id": "v1", "digest": "..." }
//!   }
//! }
//! ```
//!
//! Writes use the atomic `.tmp` + rename pattern and every mutation is
//! flushed, so a crash mid-run loses at most the in-flight record. The
//! store is exclusively owned by the process for the duration of a run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mailforge_core::{BackendName, EmailName};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// All errors that can arise from state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StateError {
    StateError::Io {
        path: path.into(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Key and record
// ---------------------------------------------------------------------------

/// Identity of one (backend, email) pair.
///
/// Displays as the dotted path `<backend>.<email>` (`sendgrid.welcome_en`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub backend: BackendName,
    pub email: EmailName,
}

impl StateKey {
    pub fn new(backend: impl Into<BackendName>, email: impl Into<EmailName>) -> Self {
        Self {
            backend: backend.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.backend, self.email)
    }
}

/// What was last pushed for one email to one backend.
///
/// Invariant: `version_id` present ⇒ `remote_id` present. `digest` is only
/// written together with a successful create/version call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    /// Remote template identifier; absent ⇒ never created on this backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    /// Identifier of the last pushed version; absent ⇒ none pushed yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,

    /// Content digest as of the last successful push.
    pub digest: String,
}

/// On-disk per-backend state payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateFile {
    pub synced_at: DateTime<Utc>,
    pub records: BTreeMap<String, SyncRecord>,
}

impl StateFile {
    fn empty() -> Self {
        Self {
            synced_at: Utc::now(),
            records: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Durable mapping `(backend, email) → SyncRecord`.
///
/// `get` and `set` are individually atomic; `set` flushes to disk before
/// returning. The internal mutex serializes file access across in-flight
/// sync tasks — per-key ordering is the engine's job, not the store's.
#[derive(Debug)]
pub struct StateStore {
    dir: PathBuf,
    file_lock: Mutex<()>,
}

impl StateStore {
    /// Open a store rooted at `dir`. The directory is created lazily on the
    /// first write.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_lock: Mutex::new(()),
        }
    }

    /// Path of the state document for `backend`.
    pub fn backend_path(&self, backend: &BackendName) -> PathBuf {
        self.dir.join(format!("{backend}.json"))
    }

    /// Load the full state document for `backend`.
    ///
    /// Returns an empty document if the file does not yet exist.
    pub fn load_backend(&self, backend: &BackendName) -> Result<StateFile, StateError> {
        let _guard = self.file_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_file(backend)
    }

    /// Look up the record for `key`.
    pub fn get(&self, key: &StateKey) -> Result<Option<SyncRecord>, StateError> {
        let _guard = self.file_lock.lock().unwrap_or_else(|e| e.into_inner());
        let file = self.read_file(&key.backend)?;
        Ok(file.records.get(&key.email.0).cloned())
    }

    /// Persist `record` under `key`, flushing durably before returning.
    pub fn set(&self, key: &StateKey, record: SyncRecord) -> Result<(), StateError> {
        let _guard = self.file_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = self.read_file(&key.backend)?;
        file.records.insert(key.email.0.clone(), record);
        file.synced_at = Utc::now();
        self.write_file(&key.backend, &file)
    }

    fn read_file(&self, backend: &BackendName) -> Result<StateFile, StateError> {
        let path = self.backend_path(backend);
        if !path.exists() {
            return Ok(StateFile::empty());
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write to `<path>.tmp` then rename to `<path>`.
    fn write_file(&self, backend: &BackendName, file: &StateFile) -> Result<(), StateError> {
        let path = self.backend_path(backend);
        let Some(dir) = path.parent() else {
            return Err(io_err(path, std::io::Error::other("invalid state path")));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(file)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
