pub mod diff;
pub mod export;
pub mod show;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reddit_sync_core::{export as core_export, settings, Settings, Snapshot};
use reddit_sync_engine::pipeline;
use reddit_sync_remote::{connect, RedditClient};

pub const SOURCE_COOKIE_ENV: &str = "REDDIT_SYNC_SOURCE_COOKIE";
pub const TARGET_COOKIE_ENV: &str = "REDDIT_SYNC_TARGET_COOKIE";

/// Where the desired account state comes from: an export file or a live account.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Read the source state from an export file instead of a live account.
    /// Takes precedence over a source cookie set in the environment.
    #[arg(long, value_name = "FILE", conflicts_with = "source_user")]
    pub from_file: Option<PathBuf>,

    /// `reddit_session` cookie of the source account.
    #[arg(long, env = SOURCE_COOKIE_ENV, hide_env_values = true)]
    pub source_cookie: Option<String>,

    /// Username of the source account.
    #[arg(long)]
    pub source_user: Option<String>,

    /// Skip the backup export written after reading a live source account.
    #[arg(long, conflicts_with = "from_file")]
    pub no_backup: bool,
}

impl SourceArgs {
    pub fn snapshot(&self, settings: &Settings) -> Result<Snapshot> {
        if let Some(path) = &self.from_file {
            return core_export::load(path)
                .with_context(|| format!("failed to load source export {}", path.display()));
        }
        let cookie = self
            .source_cookie
            .as_deref()
            .context("provide --from-file or --source-cookie")?;
        let user = self
            .source_user
            .as_deref()
            .context("--source-user is required with --source-cookie")?;
        let client = connect(cookie, user, settings);
        let snapshot =
            pipeline::fetch_snapshot(user, &client).context("could not read the source account")?;

        if !self.no_backup {
            let path = core_export::save(&snapshot).context("failed to save source backup")?;
            // stderr keeps --json output parseable
            eprintln!("✓ saved backup of '{}' to {}", snapshot.owner(), path.display());
        }
        Ok(snapshot)
    }
}

/// The account that gets changed.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// `reddit_session` cookie of the target account.
    #[arg(long, env = TARGET_COOKIE_ENV, hide_env_values = true)]
    pub target_cookie: String,

    /// Username of the target account.
    #[arg(long)]
    pub target_user: String,
}

impl TargetArgs {
    pub fn client(&self, settings: &Settings) -> RedditClient {
        connect(&self.target_cookie, &self.target_user, settings)
    }
}

pub fn load_settings() -> Result<Settings> {
    settings::load().context("failed to load settings")
}
