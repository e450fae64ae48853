//! CLI subcommand implementations.

pub mod init;
pub mod push;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolve the project root from an optional `--dir` argument.
pub(crate) fn resolve_root(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => dir
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", dir.display())),
        None => std::env::current_dir().context("could not determine current directory"),
    }
}
