//! Error types for mailforge-render.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON error while loading the locale catalog.
    #[error("locale catalog error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error while loading templates or the catalog.
    #[error("render io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// A locale was requested that the catalog does not define.
    #[error("locale '{locale}' not present in the string catalog")]
    UnknownLocale { locale: String },

    /// A template name was requested that was never loaded.
    #[error("unknown email template '{name}'")]
    UnknownTemplate { name: String },
}

/// Convenience constructor for [`RenderError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.into(),
        source,
    }
}
