//! Project configuration — `mailforge.yaml` at the project root.
//!
//! # Layout
//!
//! ```yaml
//! locales: [en, de]
//! emails_dir: emails
//! i18n_path: i18n.json
//! backends: [filesystem, sendgrid]
//! filesystem:
//!   output_dir: out
//! mailgun:
//!   domain: mg.example.com
//! ```
//!
//! Configuration is read-only input. Sync state lives in its own store
//! under `.mailforge/state/`, never in this file.
//!
//! # API pattern
//!
//! Loading takes an explicit project root (`load_at(root)`); tests always
//! pass a `TempDir` root. Backend credentials are *not* part of this file —
//! they come from the environment and are validated when the adapters are
//! constructed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Name of the config file, relative to the project root.
pub const CONFIG_FILE: &str = "mailforge.yaml";

/// Default directory for per-backend sync state, relative to the root.
pub const DEFAULT_STATE_DIR: &str = ".mailforge/state";

/// Parsed `mailforge.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Locales every template is rendered for.
    #[serde(default = "default_locales")]
    pub locales: Vec<String>,

    /// Directory holding one template file per email.
    #[serde(default = "default_emails_dir")]
    pub emails_dir: PathBuf,

    /// Path to the locale string catalog.
    #[serde(default = "default_i18n_path")]
    pub i18n_path: PathBuf,

    /// Directory for per-backend sync state files.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Enabled backends, in dispatch order.
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,

    #[serde(default)]
    pub filesystem: FilesystemConfig,

    #[serde(default)]
    pub sendgrid: SendgridConfig,

    #[serde(default)]
    pub mailgun: MailgunConfig,
}

/// Settings for the local filesystem mirror backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesystemConfig {
    /// Mirror output directory, relative to the project root.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Settings for the SendGrid backend. The API key comes from
/// `SENDGRID_API_KEY`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendgridConfig {
    /// API base URL. Overridable for self-hosted proxies.
    #[serde(default = "default_sendgrid_base")]
    pub api_base: String,
}

/// Settings for the Mailgun backend. The API key comes from
/// `MAILGUN_API_KEY`; `domain` may be set here or via `MAILGUN_DOMAIN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailgunConfig {
    #[serde(default = "default_mailgun_base")]
    pub api_base: String,

    /// Sending domain the templates belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_emails_dir() -> PathBuf {
    PathBuf::from("emails")
}

fn default_i18n_path() -> PathBuf {
    PathBuf::from("i18n.json")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_DIR)
}

fn default_backends() -> Vec<String> {
    vec!["filesystem".to_string()]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_sendgrid_base() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_mailgun_base() -> String {
    "https://api.mailgun.net/v3".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locales: default_locales(),
            emails_dir: default_emails_dir(),
            i18n_path: default_i18n_path(),
            state_dir: default_state_dir(),
            backends: default_backends(),
            filesystem: FilesystemConfig::default(),
            sendgrid: SendgridConfig::default(),
            mailgun: MailgunConfig::default(),
        }
    }
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl Default for SendgridConfig {
    fn default() -> Self {
        Self {
            api_base: default_sendgrid_base(),
        }
    }
}

impl Default for MailgunConfig {
    fn default() -> Self {
        Self {
            api_base: default_mailgun_base(),
            domain: None,
        }
    }
}

/// `<root>/mailforge.yaml` — pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load the config from `<root>/mailforge.yaml`.
///
/// Returns [`ConfigError::NotFound`] if absent,
/// [`ConfigError::Parse`] (with path + line context) if malformed.
pub fn load_at(root: &Path) -> Result<Config, ConfigError> {
    let path = config_path_at(root);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

impl Config {
    /// Serialize back to YAML (used by `mailforge init` scaffolding).
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
