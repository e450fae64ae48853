//! Local filesystem mirror — the degenerate backend.
//!
//! There is no remote identity and no real version concept: create and
//! update both collapse to an atomic overwrite of
//! `<output_dir>/<email_name>.html`. The remote id is the file name and
//! the version id a short digest prefix, which keeps the engine's skip
//! logic meaningful (an unchanged email never rewrites the mirror).

use std::path::PathBuf;

use async_trait::async_trait;

use mailforge_core::{BackendName, Email};

use crate::backend::{CreatedTemplate, TemplateBackend};
use crate::error::{io_err, BackendError};

/// Digest prefix length used as the mirror's version id.
const VERSION_DIGEST_LEN: usize = 12;

pub struct FilesystemBackend {
    name: BackendName,
    output_dir: PathBuf,
}

impl FilesystemBackend {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: BackendName::from("filesystem"),
            output_dir: output_dir.into(),
        }
    }

    /// File the email body mirrors to.
    pub fn target_path(&self, email: &Email) -> PathBuf {
        self.output_dir.join(format!("{}.html", email.name))
    }

    /// Write to `<path>.tmp`, then rename to the final path.
    fn write_mirror(&self, email: &Email) -> Result<CreatedTemplate, BackendError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| io_err(&self.output_dir, e))?;

        let path = self.target_path(email);
        let tmp = path.with_extension("html.tmp");
        std::fs::write(&tmp, &email.html).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&path, e));
        }

        tracing::debug!("filesystem: wrote {}", path.display());
        Ok(CreatedTemplate {
            remote_id: format!("{}.html", email.name),
            version_id: version_id(&email.digest),
        })
    }
}

fn version_id(digest: &str) -> String {
    digest.chars().take(VERSION_DIGEST_LEN).collect()
}

#[async_trait]
impl TemplateBackend for FilesystemBackend {
    fn name(&self) -> &BackendName {
        &self.name
    }

    async fn create_template(&self, email: &Email) -> Result<CreatedTemplate, BackendError> {
        self.write_mirror(email)
    }

    async fn create_template_version(
        &self,
        _remote_id: &str,
        email: &Email,
    ) -> Result<String, BackendError> {
        Ok(self.write_mirror(email)?.version_id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn email(html: &str) -> Email {
        Email::new("welcome_en", "welcome (en)", "welcome", "Hi", html)
    }

    #[tokio::test]
    async fn create_writes_the_mirror_file() {
        let tmp = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(tmp.path().join("out"));
        let email = email("<html>A</html>");

        let created = backend.create_template(&email).await.expect("create");
        assert_eq!(created.remote_id, "welcome_en.html");
        assert_eq!(created.version_id.len(), VERSION_DIGEST_LEN);

        let on_disk = std::fs::read_to_string(backend.target_path(&email)).unwrap();
        assert_eq!(on_disk, "<html>A</html>");
    }

    #[tokio::test]
    async fn version_push_overwrites_and_changes_version_id() {
        let tmp = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(tmp.path().join("out"));

        let first = email("<html>A</html>");
        let created = backend.create_template(&first).await.expect("create");

        let second = email("<html>B</html>");
        let v2 = backend
            .create_template_version(&created.remote_id, &second)
            .await
            .expect("version");
        assert_ne!(v2, created.version_id);

        let on_disk = std::fs::read_to_string(backend.target_path(&second)).unwrap();
        assert_eq!(on_disk, "<html>B</html>");
    }

    #[tokio::test]
    async fn tmp_file_cleaned_up_after_write() {
        let tmp = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(tmp.path().join("out"));
        let email = email("<p>x</p>");
        backend.create_template(&email).await.expect("create");

        let tmp_path = backend.target_path(&email).with_extension("html.tmp");
        assert!(!tmp_path.exists(), "tmp file must be cleaned up");
    }

    #[tokio::test]
    async fn no_activation_capability() {
        let tmp = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(tmp.path());
        assert!(!backend.requires_activation());
    }
}
