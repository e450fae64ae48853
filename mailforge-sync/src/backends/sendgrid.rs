//! SendGrid dynamic-template backend.
//!
//! API shape:
//! - `POST /v3/templates` creates the container (`generation: "dynamic"`).
//! - `POST /v3/templates/{id}/versions` pushes a version; the version name
//!   is the content digest, the subject comes from the email title.
//! - `POST /v3/templates/{id}/versions/{vid}/activate` makes it live —
//!   SendGrid versions are *not* live at creation, so this adapter declares
//!   the activation capability and activates its own first version.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use mailforge_core::config::SendgridConfig;
use mailforge_core::{BackendName, Email};

use crate::backend::{CreatedTemplate, TemplateBackend};
use crate::backends::AdapterError;
use crate::error::BackendError;

const API_KEY_VAR: &str = "SENDGRID_API_KEY";

pub struct SendgridBackend {
    name: BackendName,
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TemplateResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    id: Option<String>,
}

impl SendgridBackend {
    /// Build the adapter, reading the API key from `SENDGRID_API_KEY`.
    pub fn from_env(config: &SendgridConfig) -> Result<Self, AdapterError> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| AdapterError::MissingEnv { var: API_KEY_VAR })?;
        validate_api_key(&api_key)?;

        Ok(Self {
            name: BackendName::from("sendgrid"),
            client: reqwest::Client::builder().build()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    /// POST a JSON payload, turning non-2xx responses into rejections.
    async fn post_json(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<reqwest::Response, BackendError> {
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Rejected { status: status.as_u16(), body });
        }
        Ok(response)
    }
}

/// SendGrid keys are prefixed `SG.`; anything else is a misconfiguration.
fn validate_api_key(api_key: &str) -> Result<(), AdapterError> {
    if !api_key.starts_with("SG.") {
        return Err(AdapterError::InvalidCredentials(format!(
            "{API_KEY_VAR} must start with the prefix 'SG.'"
        )));
    }
    Ok(())
}

/// Body for `POST /v3/templates/{id}/versions`.
fn version_payload(template_id: &str, email: &Email) -> serde_json::Value {
    json!({
        "editor": "code",
        "generate_plain_content": true,
        "html_content": email.html,
        "name": email.digest,
        "plain_content": "",
        "template_id": template_id,
        "subject": email.title,
    })
}

#[async_trait]
impl TemplateBackend for SendgridBackend {
    fn name(&self) -> &BackendName {
        &self.name
    }

    async fn create_template(&self, email: &Email) -> Result<CreatedTemplate, BackendError> {
        let payload = json!({ "generation": "dynamic", "name": email.display_name });
        let response = self.post_json("/v3/templates", &payload).await?;
        let parsed: TemplateResponse = response.json().await?;
        let remote_id = parsed
            .id
            .ok_or(BackendError::MissingId { what: "template id" })?;

        // The container has no content yet; push and activate the first
        // version in the same operation.
        let version_id = self.create_template_version(&remote_id, email).await?;
        self.activate_version(&remote_id, &version_id).await?;

        Ok(CreatedTemplate { remote_id, version_id })
    }

    async fn create_template_version(
        &self,
        remote_id: &str,
        email: &Email,
    ) -> Result<String, BackendError> {
        let response = self
            .post_json(
                &format!("/v3/templates/{remote_id}/versions"),
                &version_payload(remote_id, email),
            )
            .await?;
        let parsed: VersionResponse = response.json().await?;
        parsed
            .id
            .ok_or(BackendError::MissingId { what: "template version id" })
    }

    fn requires_activation(&self) -> bool {
        true
    }

    async fn activate_version(
        &self,
        remote_id: &str,
        version_id: &str,
    ) -> Result<(), BackendError> {
        self.post_json(
            &format!("/v3/templates/{remote_id}/versions/{version_id}/activate"),
            &json!({}),
        )
        .await?;
        tracing::debug!("sendgrid: activated version {version_id} for template {remote_id}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
