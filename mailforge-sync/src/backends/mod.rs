//! Concrete backend adapters and the config-driven factory.

pub mod filesystem;
pub mod mailgun;
pub mod sendgrid;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use mailforge_core::Config;

use crate::backend::TemplateBackend;

pub use filesystem::FilesystemBackend;
pub use mailgun::MailgunBackend;
pub use sendgrid::SendgridBackend;

/// All errors that can arise while constructing adapters.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A backend name in the config matches no known adapter.
    #[error("unknown backend '{name}' in configuration")]
    Unknown { name: String },

    /// A required environment variable is unset.
    #[error("environment variable {var} needs to be set")]
    MissingEnv { var: &'static str },

    /// A credential is present but malformed.
    #[error("{0}")]
    InvalidCredentials(String),

    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build one adapter per enabled backend, in config order.
///
/// Credentials are read from the environment and validated here, before
/// any rendering or remote work starts.
pub fn build_adapters(
    config: &Config,
    root: &Path,
) -> Result<Vec<Arc<dyn TemplateBackend>>, AdapterError> {
    config
        .backends
        .iter()
        .map(|name| match name.as_str() {
            "filesystem" | "fs" => {
                let dir = root.join(&config.filesystem.output_dir);
                Ok(Arc::new(FilesystemBackend::new(dir)) as Arc<dyn TemplateBackend>)
            }
            "sendgrid" => {
                Ok(Arc::new(SendgridBackend::from_env(&config.sendgrid)?) as Arc<dyn TemplateBackend>)
            }
            "mailgun" => {
                Ok(Arc::new(MailgunBackend::from_env(&config.mailgun)?) as Arc<dyn TemplateBackend>)
            }
            other => Err(AdapterError::Unknown { name: other.to_string() }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_is_rejected() {
        let config = Config {
            backends: vec!["pigeon-post".to_string()],
            ..Config::default()
        };
        let err = build_adapters(&config, Path::new(".")).err().unwrap();
        assert!(matches!(err, AdapterError::Unknown { .. }), "got: {err}");
        assert!(err.to_string().contains("pigeon-post"));
    }

    #[test]
    fn filesystem_alias_fs_is_accepted() {
        let config = Config {
            backends: vec!["fs".to_string()],
            ..Config::default()
        };
        let adapters = build_adapters(&config, Path::new("/tmp/project")).expect("build");
        assert_eq!(adapters.len(), 1);
        assert_eq!(adapters[0].name().0, "filesystem");
    }
}
