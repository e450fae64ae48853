//! mailforge — versioned email template publishing CLI.
//!
//! # Usage
//!
//! ```text
//! mailforge init [--dir <path>]
//! mailforge push [--dir <path>] [--dry-run]
//! mailforge status [--dir <path>] [--json]
//! ```
//!
//! Templates under the configured emails directory are rendered once per
//! locale and pushed to every enabled backend; sync state under
//! `.mailforge/state/` keeps repeated pushes idempotent.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, push::PushArgs, status::StatusArgs};

#[derive(Parser, Debug)]
#[command(
    name = "mailforge",
    version,
    about = "Render localized email templates and publish them to versioned template hosts",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffold mailforge.yaml, a sample email, and a locale catalog.
    Init(InitArgs),

    /// Render all emails and push them to every enabled backend.
    Push(PushArgs),

    /// Show per-backend sync state.
    Status(StatusArgs),
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Push(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
