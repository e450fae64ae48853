//! # mailforge-core
//!
//! Domain types and configuration for mailforge.
//!
//! [`Email`] is the unit of published content: a rendered, locale-expanded
//! email body plus its identity and SHA-256 digest. [`Config`] is the
//! read-only `mailforge.yaml` project configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::{BackendName, Email, EmailName};
