//! `reddit-sync diff`: show what a sync would change, without changing it.

use anyhow::{Context, Result};
use clap::Args;

use reddit_sync_engine::{compute_snapshot_diff, pipeline};

use super::{load_settings, SourceArgs, TargetArgs};
use crate::render;

/// Arguments for `reddit-sync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Only compare subscriptions.
    #[arg(long, conflicts_with = "multis_only")]
    pub subs_only: bool,

    /// Only compare multireddits.
    #[arg(long)]
    pub multis_only: bool,

    /// Emit the change set as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let settings = load_settings()?;
        let source = self.source.snapshot(&settings)?;
        let client = self.target.client(&settings);
        let target = pipeline::fetch_snapshot(&self.target.target_user, &client)
            .context("could not read the target account")?;

        let change_set =
            compute_snapshot_diff(&source, &target).restrict(!self.multis_only, !self.subs_only);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&change_set.sorted())
                    .context("failed to serialize diff JSON")?
            );
            return Ok(());
        }

        println!("Diff {} -> {}", source.owner(), target.owner());
        render::print_change_set(&change_set);
        Ok(())
    }
}
