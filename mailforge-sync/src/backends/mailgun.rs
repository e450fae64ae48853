//! Mailgun template backend.
//!
//! API shape (all multipart forms under `/v3/<domain>`):
//! - `POST /templates` creates the template *and* its initial version in
//!   one call; versions are live at creation, so there is no activation
//!   capability here.
//! - `POST /templates/{name}/versions` pushes a new version, tagged with
//!   the content digest truncated to Mailgun's 50-character tag limit.
//!
//! Mailgun addresses templates by name, so the name — not the numeric id
//! in the response — is the stable remote identifier we persist.

use async_trait::async_trait;
use serde::Deserialize;

use mailforge_core::config::MailgunConfig;
use mailforge_core::{BackendName, Email};

use crate::backend::{CreatedTemplate, TemplateBackend};
use crate::backends::AdapterError;
use crate::error::BackendError;

const API_KEY_VAR: &str = "MAILGUN_API_KEY";
const DOMAIN_VAR: &str = "MAILGUN_DOMAIN";

/// Mailgun rejects version tags longer than 50 characters.
const MAX_TAG_LEN: usize = 50;

pub struct MailgunBackend {
    name: BackendName,
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct MailgunResponse {
    template: Option<MailgunTemplate>,
}

#[derive(Debug, Deserialize)]
struct MailgunTemplate {
    name: Option<String>,
    version: Option<MailgunVersion>,
}

#[derive(Debug, Deserialize)]
struct MailgunVersion {
    id: Option<String>,
}

impl MailgunBackend {
    /// Build the adapter. The API key comes from `MAILGUN_API_KEY`; the
    /// domain from the config or `MAILGUN_DOMAIN`.
    pub fn from_env(config: &MailgunConfig) -> Result<Self, AdapterError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| AdapterError::MissingEnv { var: API_KEY_VAR })?;
        let domain = match config.domain.clone() {
            Some(domain) => domain,
            None => std::env::var(DOMAIN_VAR)
                .map_err(|_| AdapterError::MissingEnv { var: DOMAIN_VAR })?,
        };

        Ok(Self {
            name: BackendName::from("mailgun"),
            client: reqwest::Client::builder().build()?,
            base_url: format!("{}/{domain}", config.api_base.trim_end_matches('/')),
            api_key,
        })
    }

    /// POST a multipart form, turning non-2xx responses into rejections.
    async fn post_form(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<MailgunResponse, BackendError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .basic_auth("api", Some(&self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected { status: status.as_u16(), body });
        }
        Ok(response.json().await?)
    }
}

fn version_tag(digest: &str) -> String {
    digest.chars().take(MAX_TAG_LEN).collect()
}

#[async_trait]
impl TemplateBackend for MailgunBackend {
    fn name(&self) -> &BackendName {
        &self.name
    }

    async fn create_template(&self, email: &Email) -> Result<CreatedTemplate, BackendError> {
        let form = reqwest::multipart::Form::new()
            .text("name", email.name.0.clone())
            .text("description", email.display_name.clone())
            .text("template", email.html.clone())
            .text("engine", "handlebars")
            .text("comment", version_tag(&email.digest));

        let parsed = self.post_form("/templates", form).await?;
        let template = parsed
            .template
            .ok_or(BackendError::MissingId { what: "template" })?;
        let remote_id = template
            .name
            .ok_or(BackendError::MissingId { what: "template name" })?;
        let version_id = template
            .version
            .and_then(|v| v.id)
            .ok_or(BackendError::MissingId { what: "initial version id" })?;

        Ok(CreatedTemplate { remote_id, version_id })
    }

    async fn create_template_version(
        &self,
        remote_id: &str,
        email: &Email,
    ) -> Result<String, BackendError> {
        let form = reqwest::multipart::Form::new()
            .text("tag", version_tag(&email.digest))
            .text("template", email.html.clone())
            .text("engine", "handlebars");

        let parsed = self
            .post_form(&format!("/templates/{remote_id}/versions"), form)
            .await?;
        parsed
            .template
            .and_then(|t| t.version)
            .and_then(|v| v.id)
            .ok_or(BackendError::MissingId { what: "version id" })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
