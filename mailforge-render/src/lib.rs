//! # mailforge-render
//!
//! Tera rendering of email templates with per-locale string catalogs.
//!
//! [`Renderer`] loads one template per file from the emails directory;
//! [`LocaleCatalog`] supplies the `t` string table for each locale. Each
//! `(template, locale)` render yields HTML plus the subject line extracted
//! from its `<title>` element.

pub mod engine;
pub mod error;
pub mod i18n;

pub use engine::{extract_title, RenderedEmail, Renderer};
pub use error::RenderError;
pub use i18n::LocaleCatalog;
