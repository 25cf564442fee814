//! `reddit-sync export`: snapshot an account to a JSON file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reddit_sync_core::export;
use reddit_sync_engine::pipeline;
use reddit_sync_remote::connect;

use super::{load_settings, SOURCE_COOKIE_ENV};

/// Arguments for `reddit-sync export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// `reddit_session` cookie of the account to export.
    #[arg(long, env = SOURCE_COOKIE_ENV, hide_env_values = true)]
    pub cookie: String,

    /// Username of the account to export.
    #[arg(long)]
    pub user: String,

    /// Write here instead of `~/.reddit-sync/exports/export_<timestamp>.json`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn run(self) -> Result<()> {
        let settings = load_settings()?;
        let client = connect(&self.cookie, &self.user, &settings);
        let snapshot = pipeline::fetch_snapshot(&self.user, &client)
            .with_context(|| format!("could not read account '{}'", self.user))?;

        let path = match self.output {
            Some(path) => {
                export::save_to(&path, &snapshot)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                path
            }
            None => export::save(&snapshot).context("failed to write export")?,
        };

        println!(
            "✓ exported {} subreddits and {} multireddits from '{}' to {}",
            snapshot.feeds().len(),
            snapshot.collections().len(),
            snapshot.owner(),
            path.display()
        );
        Ok(())
    }
}
