//! reddit-sync: copy subscriptions and multireddits between Reddit accounts.
//!
//! # Usage
//!
//! ```text
//! reddit-sync export --cookie <C> --user <U> [--output <PATH>]
//! reddit-sync show [FILE]
//! reddit-sync diff (--from-file <F> | --source-cookie <C> --source-user <U>)
//!                  --target-cookie <C> --target-user <U> [--subs-only | --multis-only] [--json]
//! reddit-sync sync (--from-file <F> | --source-cookie <C> --source-user <U>)
//!                  --target-cookie <C> --target-user <U>
//!                  [--no-subs] [--no-multis] [--clean] [--delete-multis] [--dry-run] [--json]
//! ```
//!
//! Cookies can also come from `REDDIT_SYNC_SOURCE_COOKIE` and
//! `REDDIT_SYNC_TARGET_COOKIE`.

mod commands;
mod render;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{diff::DiffArgs, export::ExportArgs, show::ShowArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reddit-sync",
    version,
    about = "Copy subscriptions and multireddits from one Reddit account to another",
    long_about = None,
)]
struct Cli {
    /// Log more (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save an account's subscriptions and multireddits to a JSON file.
    Export(ExportArgs),

    /// List saved exports, or summarize one export file.
    Show(ShowArgs),

    /// Show what a sync would change on the target account.
    Diff(DiffArgs),

    /// Make the target account match the source.
    Sync(SyncArgs),
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Export(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Sync(args) => args.run(),
    }
}
