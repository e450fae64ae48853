//! The [`TemplateBackend`] trait — the capability set every publishing
//! destination implements.
//!
//! The sync engine is written against exactly three operations; everything
//! transport-specific (request shaping, authentication, response parsing)
//! lives behind them in the concrete adapters. Implementations must be
//! `Send + Sync` so one adapter instance can serve concurrent sync tasks.

use async_trait::async_trait;

use mailforge_core::{BackendName, Email};

use crate::error::BackendError;

/// Identifiers returned by a successful template creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTemplate {
    pub remote_id: String,
    pub version_id: String,
}

/// A publishing destination that stores versioned copies of emails.
#[async_trait]
pub trait TemplateBackend: Send + Sync {
    fn name(&self) -> &BackendName;

    /// Create the template container *and* its first version.
    ///
    /// Fails with a rejected-class error if the remote API does not return
    /// a usable identifier.
    async fn create_template(&self, email: &Email) -> Result<CreatedTemplate, BackendError>;

    /// Push a new version of an existing template.
    ///
    /// Must not assume the new version is automatically active.
    async fn create_template_version(
        &self,
        remote_id: &str,
        email: &Email,
    ) -> Result<String, BackendError>;

    /// Whether freshly pushed versions go live only via
    /// [`activate_version`](TemplateBackend::activate_version).
    ///
    /// Backends that activate implicitly at creation time keep the default.
    fn requires_activation(&self) -> bool {
        false
    }

    /// Mark a version as the live one.
    ///
    /// Only called when [`requires_activation`](TemplateBackend::requires_activation)
    /// returns true.
    async fn activate_version(
        &self,
        _remote_id: &str,
        _version_id: &str,
    ) -> Result<(), BackendError> {
        Ok(())
    }
}
