//! `mailforge status` — per-backend sync state visibility.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use mailforge_core::{config, BackendName};
use mailforge_sync::StateStore;

use super::resolve_root;

/// Arguments for `mailforge status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project root (defaults to the current directory).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone)]
struct BackendStatus {
    backend: String,
    synced_at: Option<DateTime<Utc>>,
    records: Vec<RecordRow>,
}

#[derive(Debug, Clone, Serialize)]
struct RecordRow {
    email: String,
    remote_id: String,
    version_id: String,
    digest: String,
}

#[derive(Serialize)]
struct StatusJson {
    backends: Vec<BackendJson>,
}

#[derive(Serialize)]
struct BackendJson {
    backend: String,
    synced_at: Option<String>,
    records: Vec<RecordRow>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "remote id")]
    remote_id: String,
    #[tabled(rename = "version")]
    version_id: String,
    #[tabled(rename = "digest")]
    digest: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let root = resolve_root(self.dir)?;
        let config = config::load_at(&root)
            .with_context(|| format!("failed to load config from '{}'", root.display()))?;

        let store = StateStore::open(root.join(&config.state_dir));
        let mut statuses = Vec::new();
        for name in &config.backends {
            let backend = BackendName::from(name.as_str());
            let path = store.backend_path(&backend);
            if !path.exists() {
                statuses.push(BackendStatus {
                    backend: name.clone(),
                    synced_at: None,
                    records: Vec::new(),
                });
                continue;
            }

            let file = store
                .load_backend(&backend)
                .with_context(|| format!("failed to load state for backend '{name}'"))?;
            let records = file
                .records
                .into_iter()
                .map(|(email, record)| RecordRow {
                    email,
                    remote_id: record.remote_id.unwrap_or_else(|| "—".to_string()),
                    version_id: record.version_id.unwrap_or_else(|| "—".to_string()),
                    digest: short_digest(&record.digest),
                })
                .collect();
            statuses.push(BackendStatus {
                backend: name.clone(),
                synced_at: Some(file.synced_at),
                records,
            });
        }

        if self.json {
            print_json(statuses)?;
        } else {
            print_tables(statuses);
        }
        Ok(())
    }
}

fn short_digest(digest: &str) -> String {
    digest.chars().take(12).collect()
}

/// Coarse "3m ago"-style age for table output.
fn format_age(synced_at: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(synced_at);
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

fn print_json(statuses: Vec<BackendStatus>) -> Result<()> {
    let payload = StatusJson {
        backends: statuses
            .into_iter()
            .map(|s| BackendJson {
                backend: s.backend,
                synced_at: s.synced_at.map(|t| t.to_rfc3339()),
                records: s.records,
            })
            .collect(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_tables(statuses: Vec<BackendStatus>) {
    for status in statuses {
        let age = status
            .synced_at
            .map(format_age)
            .unwrap_or_else(|| "never".to_string());
        println!(
            "{} — {} record(s), last sync {}",
            status.backend.to_uppercase().bold(),
            status.records.len(),
            age,
        );

        if status.records.is_empty() {
            println!("  (nothing pushed yet)");
            continue;
        }

        let rows: Vec<StatusTableRow> = status
            .records
            .into_iter()
            .map(|r| StatusTableRow {
                email: r.email,
                remote_id: r.remote_id,
                version_id: r.version_id,
                digest: r.digest,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}
