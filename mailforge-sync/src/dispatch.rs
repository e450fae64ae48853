//! Dispatcher — fans one email out to every configured backend.
//!
//! Each backend sync runs as its own tracked tokio task; one backend's
//! failure never prevents the others from attempting theirs. Every task is
//! awaited, so a run's reports (and exit status) are deterministic.

use std::sync::Arc;

use mailforge_core::{BackendName, Email, EmailName};

use crate::backend::TemplateBackend;
use crate::engine::{SyncEngine, SyncOutcome};
use crate::error::{BackendError, SyncError};

/// Result of one (backend, email) pair.
#[derive(Debug)]
pub struct PairReport {
    pub backend: BackendName,
    pub email: EmailName,
    pub result: Result<SyncOutcome, SyncError>,
}

/// Runs per-backend syncs for one email concurrently.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    engine: Arc<SyncEngine>,
}

impl Dispatcher {
    pub fn new(engine: Arc<SyncEngine>) -> Self {
        Self { engine }
    }

    /// Sync `email` against every backend, returning one report per pair.
    ///
    /// Non-fatal failures are logged here with backend + email context and
    /// reported; fatal ones are reported for the caller's exit policy.
    pub async fn dispatch(
        &self,
        email: &Email,
        backends: &[Arc<dyn TemplateBackend>],
        dry_run: bool,
    ) -> Vec<PairReport> {
        let mut handles = Vec::with_capacity(backends.len());
        for backend in backends {
            let engine = self.engine.clone();
            let backend = backend.clone();
            let email = email.clone();
            handles.push((
                backend.name().clone(),
                tokio::spawn(async move { engine.sync(backend.as_ref(), &email, dry_run).await }),
            ));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (backend, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(join) => Err(SyncError::classify(
                    &backend,
                    &email.name,
                    BackendError::other(format!("sync task failed: {join}")),
                )),
            };

            match &result {
                Ok(outcome) => {
                    tracing::debug!("{backend}.{}: {outcome:?}", email.name);
                }
                Err(err) if err.is_fatal() => {
                    tracing::error!("{err}");
                }
                Err(err) => {
                    tracing::warn!("{err}");
                }
            }

            reports.push(PairReport {
                backend,
                email: email.name.clone(),
                result,
            });
        }
        reports
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::backend::CreatedTemplate;
    use crate::state::{StateKey, StateStore};

    struct OkBackend(BackendName);

    #[async_trait]
    impl TemplateBackend for OkBackend {
        fn name(&self) -> &BackendName {
            &self.0
        }

        async fn create_template(&self, _email: &Email) -> Result<CreatedTemplate, BackendError> {
            Ok(CreatedTemplate { remote_id: "t1".into(), version_id: "v1".into() })
        }

        async fn create_template_version(
            &self,
            _remote_id: &str,
            _email: &Email,
        ) -> Result<String, BackendError> {
            Ok("v2".into())
        }
    }

    struct RejectingBackend(BackendName);

    #[async_trait]
    impl TemplateBackend for RejectingBackend {
        fn name(&self) -> &BackendName {
            &self.0
        }

        async fn create_template(&self, _email: &Email) -> Result<CreatedTemplate, BackendError> {
            Err(BackendError::Rejected { status: 422, body: "no".into() })
        }

        async fn create_template_version(
            &self,
            _remote_id: &str,
            _email: &Email,
        ) -> Result<String, BackendError> {
            Err(BackendError::Rejected { status: 422, body: "no".into() })
        }
    }

    fn email() -> Email {
        Email::new("welcome_en", "welcome (en)", "welcome", "Hi", "<p>x</p>")
    }

    #[tokio::test]
    async fn one_failing_backend_does_not_stop_the_other() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(StateStore::open(tmp.path()));
        let dispatcher = Dispatcher::new(Arc::new(SyncEngine::new(store.clone())));

        let backends: Vec<Arc<dyn TemplateBackend>> = vec![
            Arc::new(RejectingBackend(BackendName::from("broken"))),
            Arc::new(OkBackend(BackendName::from("good"))),
        ];

        let reports = dispatcher.dispatch(&email(), &backends, false).await;
        assert_eq!(reports.len(), 2);

        let broken = reports.iter().find(|r| r.backend.0 == "broken").unwrap();
        assert!(matches!(broken.result, Err(SyncError::RemoteRejected { .. })));

        let good = reports.iter().find(|r| r.backend.0 == "good").unwrap();
        assert!(matches!(good.result, Ok(SyncOutcome::Created { .. })));

        // The healthy backend's record was persisted; the broken one's was not.
        assert!(store.get(&StateKey::new("good", "welcome_en")).unwrap().is_some());
        assert!(store.get(&StateKey::new("broken", "welcome_en")).unwrap().is_none());
    }

    #[tokio::test]
    async fn reports_cover_every_backend_in_order() {
        let tmp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(Arc::new(SyncEngine::new(Arc::new(StateStore::open(
            tmp.path(),
        )))));

        let backends: Vec<Arc<dyn TemplateBackend>> = vec![
            Arc::new(OkBackend(BackendName::from("a"))),
            Arc::new(OkBackend(BackendName::from("b"))),
            Arc::new(OkBackend(BackendName::from("c"))),
        ];

        let reports = dispatcher.dispatch(&email(), &backends, false).await;
        let order: Vec<&str> = reports.iter().map(|r| r.backend.0.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert!(reports.iter().all(|r| r.result.is_ok()));
    }
}
