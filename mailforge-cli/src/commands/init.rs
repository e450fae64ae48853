//! `mailforge init` — scaffold a new project.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use mailforge_core::{config, Config};

use super::resolve_root;

const SAMPLE_EMAIL: &str = "\
<html>
  <head>
    <title>{{ t.welcome_title }}</title>
  </head>
  <body>
    <h1>{{ t.welcome_heading }}</h1>
    <p>{{ t.welcome_body }}</p>
  </body>
</html>
";

const SAMPLE_I18N: &str = r#"{
  "en": {
    "welcome_title": "Welcome!",
    "welcome_heading": "Welcome aboard",
    "welcome_body": "We're glad you're here."
  }
}
"#;

/// Arguments for `mailforge init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project root to scaffold (defaults to the current directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.dir)?;
        let config_path = config::config_path_at(&root);
        if config_path.exists() {
            bail!("'{}' already exists — not overwriting", config_path.display());
        }

        let config = Config::default();
        std::fs::write(&config_path, config.to_yaml().context("serialize config")?)
            .with_context(|| format!("failed to write {}", config_path.display()))?;

        let emails_dir = root.join(&config.emails_dir);
        std::fs::create_dir_all(&emails_dir)
            .with_context(|| format!("failed to create {}", emails_dir.display()))?;

        let sample = emails_dir.join("welcome.html");
        if !sample.exists() {
            std::fs::write(&sample, SAMPLE_EMAIL)
                .with_context(|| format!("failed to write {}", sample.display()))?;
        }

        let i18n = root.join(&config.i18n_path);
        if !i18n.exists() {
            std::fs::write(&i18n, SAMPLE_I18N)
                .with_context(|| format!("failed to write {}", i18n.display()))?;
        }

        println!("✓ Scaffolded mailforge project at '{}'", root.display());
        println!("  config:  {}", config_path.display());
        println!("  emails:  {}", emails_dir.display());
        println!("  locales: {}", i18n.display());
        println!("Run 'mailforge push --dry-run' to see what would be published.");
        Ok(())
    }
}
