//! Shared push pipeline entrypoint used by the CLI.
//!
//! Renders every (template × locale) combination into an [`Email`], then
//! dispatches all of them to the configured backends concurrently.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use mailforge_core::{Config, Email};
use mailforge_render::{LocaleCatalog, RenderError, Renderer};

use crate::backends::{build_adapters, AdapterError};
use crate::dispatch::{Dispatcher, PairReport};
use crate::engine::{SyncEngine, SyncOutcome};
use crate::state::StateStore;

/// All errors that can abort a pipeline run outright.
///
/// Per-pair sync failures do not appear here — they are carried inside the
/// [`RunReport`] so sibling pairs keep going.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rendering failed; nothing was dispatched for the failing template.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An adapter could not be constructed from config/environment.
    #[error("backend setup error: {0}")]
    Adapter(#[from] AdapterError),

    /// A dispatch task died. Programming error; aborts the run.
    #[error("dispatch task failed: {0}")]
    Task(String),
}

/// Outcome of one full push run.
#[derive(Debug)]
pub struct RunReport {
    /// One entry per (backend, email) pair, grouped by email.
    pub pairs: Vec<PairReport>,
    /// Number of rendered emails dispatched.
    pub emails: usize,
}

impl RunReport {
    fn count(&self, pred: impl Fn(&SyncOutcome) -> bool) -> usize {
        self.pairs
            .iter()
            .filter(|p| matches!(&p.result, Ok(outcome) if pred(outcome)))
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Created { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Updated { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::Unchanged { .. }))
    }

    /// Dry-run pairs that would have created or updated.
    pub fn would_change(&self) -> usize {
        self.count(|o| matches!(o, SyncOutcome::WouldCreate | SyncOutcome::WouldUpdate { .. }))
    }

    pub fn failed(&self) -> usize {
        self.pairs.iter().filter(|p| p.result.is_err()).count()
    }

    /// Failures that must produce a non-zero process exit.
    pub fn fatal_failures(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| matches!(&p.result, Err(e) if e.is_fatal()))
            .count()
    }
}

/// Render everything and push it to every configured backend.
///
/// This is the canonical entrypoint for `mailforge push`.
pub async fn run(root: &Path, config: &Config, dry_run: bool) -> Result<RunReport, PipelineError> {
    let renderer = Renderer::from_dir(&root.join(&config.emails_dir))?;
    let catalog = LocaleCatalog::load(&root.join(&config.i18n_path))?;
    let adapters = build_adapters(config, root)?;

    let store = Arc::new(StateStore::open(root.join(&config.state_dir)));
    let dispatcher = Dispatcher::new(Arc::new(SyncEngine::new(store)));

    let mut emails = Vec::new();
    for locale in &config.locales {
        for base in renderer.template_names() {
            let rendered = renderer.render(base, locale, &catalog)?;
            emails.push(Email::new(
                format!("{base}_{locale}"),
                format!("{base} ({locale})"),
                base.clone(),
                rendered.title,
                rendered.html,
            ));
        }
    }

    let email_count = emails.len();
    tracing::info!(
        "pushing {email_count} rendered emails to {} backend(s)",
        adapters.len()
    );

    let mut handles = Vec::with_capacity(email_count);
    for email in emails {
        let dispatcher = dispatcher.clone();
        let adapters = adapters.clone();
        handles.push(tokio::spawn(async move {
            dispatcher.dispatch(&email, &adapters, dry_run).await
        }));
    }

    let mut pairs = Vec::new();
    for handle in handles {
        let reports = handle.await.map_err(|e| PipelineError::Task(e.to_string()))?;
        pairs.extend(reports);
    }

    Ok(RunReport { pairs, emails: email_count })
}
