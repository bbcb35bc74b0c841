//! Rolodex: one-way address book to Notion database sync.
//!
//! # Usage
//!
//! ```text
//! rolodex init [--notion-token ..] [--database-id ..] [--client-id ..] [--client-secret ..] [--redirect-url ..]
//! rolodex auth url
//! rolodex auth exchange <code>
//! rolodex sync [--dry-run] [--only create|update]
//! rolodex diff [--only create|update] [--json]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{auth::AuthCommand, diff::DiffArgs, init::InitArgs, sync::SyncArgs};
use rolodex_core::ChangeKind;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "rolodex",
    version,
    about = "Sync address book contacts into a Notion database",
    long_about = None,
)]
struct Cli {
    /// Log progress to stderr (`RUST_LOG` takes precedence).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.rolodex/config.yaml.
    Init(InitArgs),

    /// Authorize access to the address book.
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Create and update destination pages from source contacts.
    Sync(SyncArgs),

    /// Show the changes a sync would make, without writing.
    Diff(DiffArgs),
}

// ---------------------------------------------------------------------------
// Shared ChangeKind argument
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `ChangeKind` from CLI args.
#[derive(Debug, Clone, Copy)]
pub struct ChangeKindArg(pub ChangeKind);

impl FromStr for ChangeKindArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ChangeKind::from_str(s).map(Self).map_err(|e| e.to_string())
    }
}

impl fmt::Display for ChangeKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ChangeKindArg> for ChangeKind {
    fn from(k: ChangeKindArg) -> Self {
        k.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Auth { command } => commands::auth::run(command),
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
