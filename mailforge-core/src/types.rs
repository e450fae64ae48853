//! Domain types for mailforge.
//!
//! All types are serializable/deserializable via serde. The content digest
//! is computed exactly once, in [`Email::new`]; nothing downstream ever
//! re-hashes a body.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed logical email name, unique per template/locale pair
/// (`welcome_en`, `receipt_de`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmailName(pub String);

impl fmt::Display for EmailName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EmailName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmailName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed name for a configured publishing backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackendName(pub String);

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BackendName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BackendName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Email
// ---------------------------------------------------------------------------

/// A rendered email ready for publishing.
///
/// `name` is the stable identity backends are keyed on. `display_name`,
/// `base_name`, and `title` are presentation metadata passed through to
/// backends untouched; changing them alone never triggers a new remote
/// version — `digest` is the sole change signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub name: EmailName,
    pub display_name: String,
    /// Template file stem the email was rendered from.
    pub base_name: String,
    /// Subject line, extracted from the rendered `<title>`.
    pub title: String,
    /// Rendered body. Opaque to the sync core.
    pub html: String,
    /// SHA-256 hex digest of `html`, set by [`Email::new`].
    pub digest: String,
}

impl Email {
    /// Build an email and compute its content digest.
    pub fn new(
        name: impl Into<EmailName>,
        display_name: impl Into<String>,
        base_name: impl Into<String>,
        title: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        let html = html.into();
        let digest = sha256_hex(&html);
        Self {
            name: name.into(),
            display_name: display_name.into(),
            base_name: base_name.into(),
            title: title.into(),
            html,
            digest,
        }
    }
}

/// SHA-256 hex digest of a string body.
pub fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
