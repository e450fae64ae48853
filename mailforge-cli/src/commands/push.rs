//! `mailforge push` — render and publish every email to every backend.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use mailforge_core::config;
use mailforge_sync::{pipeline, PairReport, RunReport, SyncOutcome};

use super::resolve_root;

/// Arguments for `mailforge push`.
#[derive(Args, Debug)]
pub struct PushArgs {
    /// Project root (defaults to the current directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Show what would be pushed without touching any backend or state.
    #[arg(long)]
    pub dry_run: bool,
}

impl PushArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.dir)?;
        let config = config::load_at(&root)
            .with_context(|| format!("failed to load config from '{}'", root.display()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("failed to build tokio runtime")?;
        let report = runtime
            .block_on(pipeline::run(&root, &config, self.dry_run))
            .context("push failed")?;

        print_report(&report, self.dry_run);

        let fatal = report.fatal_failures();
        if fatal > 0 {
            bail!("{fatal} unexpected failure(s) — see log output above");
        }
        Ok(())
    }
}

fn outcome_line(pair: &PairReport) -> String {
    match &pair.result {
        Ok(SyncOutcome::Created { remote_id, version_id }) => format!(
            "  {}  {}  created ({remote_id}/{version_id})",
            "✚".green().bold(),
            pair.backend,
        ),
        Ok(SyncOutcome::Updated { remote_id, version_id }) => format!(
            "  {}  {}  new version ({version_id}) for {remote_id}",
            "✎".yellow().bold(),
            pair.backend,
        ),
        Ok(SyncOutcome::Unchanged { .. }) => {
            format!("  {}  {}  unchanged", "·".bright_black(), pair.backend)
        }
        Ok(SyncOutcome::WouldCreate) => {
            format!("  {}  {}  would create", "~".cyan(), pair.backend)
        }
        Ok(SyncOutcome::WouldUpdate { remote_id }) => {
            format!("  {}  {}  would update {remote_id}", "~".cyan(), pair.backend)
        }
        Err(err) => format!("  {}  {}  {err}", "✗".red().bold(), pair.backend),
    }
}

fn print_report(report: &RunReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    let mut grouped = BTreeMap::<String, Vec<&PairReport>>::new();
    for pair in &report.pairs {
        grouped.entry(pair.email.to_string()).or_default().push(pair);
    }

    for (email, pairs) in grouped {
        println!("{prefix}{}", email.bold());
        for pair in pairs {
            println!("{}", outcome_line(pair));
        }
    }

    if dry_run {
        println!(
            "{prefix}✓ {} emails checked ({} would change, {} unchanged, {} failed)",
            report.emails,
            report.would_change(),
            report.unchanged(),
            report.failed(),
        );
    } else {
        println!(
            "✓ {} emails pushed ({} created, {} updated, {} unchanged, {} failed)",
            report.emails,
            report.created(),
            report.updated(),
            report.unchanged(),
            report.failed(),
        );
    }
}
