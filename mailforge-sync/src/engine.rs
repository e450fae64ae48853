//! Sync engine — the create/update/skip decision.
//!
//! ## Per-sync protocol
//!
//! 1. Acquire the per-key lock for `(backend, email)`.
//! 2. Load the stored [`SyncRecord`].
//! 3. No record or no remote id → CREATE (container + first version).
//! 4. No version yet, or digest changed → UPDATE (+ explicit activation
//!    where the backend requires it).
//! 5. Otherwise → SKIP, zero remote calls.
//! 6. Persist the record in the same critical section.
//!
//! The lock is held across the remote call: two concurrent syncs for the
//! same fresh key must issue exactly one `create_template`, never two.
//! Digest equality is the sole change signal — display-name or title
//! changes alone never reach the remote.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use mailforge_core::Email;

use crate::backend::TemplateBackend;
use crate::error::SyncError;
use crate::state::{StateKey, StateStore, SyncRecord};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one (backend, email) sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Template container and first version created remotely.
    Created { remote_id: String, version_id: String },
    /// New version pushed for an existing template.
    Updated { remote_id: String, version_id: String },
    /// Stored digest matches — nothing touched the remote.
    Unchanged { remote_id: String, version_id: String },
    /// Dry-run: a CREATE would have happened.
    WouldCreate,
    /// Dry-run: an UPDATE would have happened.
    WouldUpdate { remote_id: String },
}

// ---------------------------------------------------------------------------
// Per-key locks
// ---------------------------------------------------------------------------

/// Lazily grown map of per-key mutexes serializing read-decide-call-write.
#[derive(Debug, Default)]
struct KeyLocks {
    inner: Mutex<HashMap<StateKey, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    async fn acquire(&self, key: &StateKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

// ---------------------------------------------------------------------------
// SyncEngine
// ---------------------------------------------------------------------------

/// Decides and applies the create/update/skip transition for one pair.
#[derive(Debug)]
pub struct SyncEngine {
    store: Arc<StateStore>,
    locks: KeyLocks,
}

impl SyncEngine {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self {
            store,
            locks: KeyLocks::default(),
        }
    }

    /// Sync one email to one backend.
    ///
    /// Failures leave the previously persisted record untouched; the
    /// record is only rewritten after the remote call has succeeded.
    pub async fn sync(
        &self,
        backend: &dyn TemplateBackend,
        email: &Email,
        dry_run: bool,
    ) -> Result<SyncOutcome, SyncError> {
        let key = StateKey::new(backend.name().clone(), email.name.clone());
        let _guard = self.locks.acquire(&key).await;

        let record = match self.store.get(&key)? {
            Some(record) => record,
            None => return self.create(backend, email, &key, dry_run).await,
        };
        // A record with no remote id means the template was never created.
        let Some(remote_id) = record.remote_id.clone() else {
            return self.create(backend, email, &key, dry_run).await;
        };

        if let Some(version_id) = record.version_id.clone() {
            if record.digest == email.digest {
                tracing::debug!("{key}: unchanged ({remote_id}/{version_id})");
                return Ok(SyncOutcome::Unchanged { remote_id, version_id });
            }
        }

        self.update(backend, email, &key, remote_id, dry_run).await
    }

    async fn create(
        &self,
        backend: &dyn TemplateBackend,
        email: &Email,
        key: &StateKey,
        dry_run: bool,
    ) -> Result<SyncOutcome, SyncError> {
        if dry_run {
            tracing::info!("[dry-run] {key}: would create template");
            return Ok(SyncOutcome::WouldCreate);
        }

        let created = backend
            .create_template(email)
            .await
            .map_err(|e| SyncError::classify(&key.backend, &key.email, e))?;

        self.store.set(
            key,
            SyncRecord {
                remote_id: Some(created.remote_id.clone()),
                version_id: Some(created.version_id.clone()),
                digest: email.digest.clone(),
            },
        )?;

        tracing::info!(
            "{key}: created template '{}' ({}/{})",
            email.display_name,
            created.remote_id,
            created.version_id,
        );
        Ok(SyncOutcome::Created {
            remote_id: created.remote_id,
            version_id: created.version_id,
        })
    }

    async fn update(
        &self,
        backend: &dyn TemplateBackend,
        email: &Email,
        key: &StateKey,
        remote_id: String,
        dry_run: bool,
    ) -> Result<SyncOutcome, SyncError> {
        if dry_run {
            tracing::info!("[dry-run] {key}: would push new version to {remote_id}");
            return Ok(SyncOutcome::WouldUpdate { remote_id });
        }

        let version_id = backend
            .create_template_version(&remote_id, email)
            .await
            .map_err(|e| SyncError::classify(&key.backend, &key.email, e))?;

        if backend.requires_activation() {
            backend
                .activate_version(&remote_id, &version_id)
                .await
                .map_err(|e| SyncError::classify(&key.backend, &key.email, e))?;
            tracing::debug!("{key}: activated version {version_id}");
        }

        self.store.set(
            key,
            SyncRecord {
                remote_id: Some(remote_id.clone()),
                version_id: Some(version_id.clone()),
                digest: email.digest.clone(),
            },
        )?;

        tracing::info!("{key}: new version ({version_id}) for template {remote_id}");
        Ok(SyncOutcome::Updated { remote_id, version_id })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
