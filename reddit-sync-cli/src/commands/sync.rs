//! `reddit-sync sync`: converge the target account toward the source.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use reddit_sync_core::ChangeSet;
use reddit_sync_engine::{
    pipeline, RetryPolicy, RetryingWriter, SyncExecutor, SyncOptions, SyncReport,
};

use super::{load_settings, SourceArgs, TargetArgs};
use crate::render;

/// Arguments for `reddit-sync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Leave subscriptions alone.
    #[arg(long)]
    pub no_subs: bool,

    /// Leave multireddits alone.
    #[arg(long)]
    pub no_multis: bool,

    /// Unsubscribe the target from subreddits the source is not subscribed to.
    #[arg(long)]
    pub clean: bool,

    /// Delete target multireddits the source does not have.
    #[arg(long)]
    pub delete_multis: bool,

    /// Show what would be done without changing the target account.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the change set and per-item report as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SyncJson<'a> {
    source: &'a str,
    target: &'a str,
    change_set: ChangeSet,
    succeeded: usize,
    failed: usize,
    report: &'a SyncReport,
}

impl SyncArgs {
    fn options(&self) -> SyncOptions {
        SyncOptions {
            sync_feeds: !self.no_subs,
            sync_collections: !self.no_multis,
            cleanup_removals: self.clean,
            delete_collections: self.delete_multis,
            dry_run: self.dry_run,
        }
    }

    pub fn run(self) -> Result<()> {
        let options = self.options();
        if !options.sync_feeds && !options.sync_collections {
            bail!("--no-subs and --no-multis together leave nothing to sync");
        }

        let settings = load_settings()?;
        let source = self.source.snapshot(&settings)?;
        let client = self.target.client(&settings);
        let target = pipeline::fetch_snapshot(&self.target.target_user, &client)
            .context("could not read the target account")?;

        let change_set = pipeline::plan_changes(&source, &target, &options);
        let prefix = if options.dry_run { "[dry-run] " } else { "" };

        if !self.json {
            println!("{prefix}Sync {} -> {}", source.owner(), target.owner());
            render::print_change_set(&change_set);
            print_skipped(&change_set, &options);
        }

        let writer = RetryingWriter::new(&client, RetryPolicy::from(&settings.retry));
        let json = self.json;
        let report = SyncExecutor::new(&writer).execute_with_progress(
            &change_set,
            &options,
            |index, total, entry| {
                if !json {
                    println!("{}", render::entry_line(index, total, entry));
                }
            },
        );

        if self.json {
            let payload = SyncJson {
                source: source.owner(),
                target: target.owner(),
                change_set: change_set.sorted(),
                succeeded: report.succeeded(),
                failed: report.failed(),
                report: &report,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
            );
        } else {
            render::print_summary(&report);
        }

        if !report.dry_run && !report.is_clean() {
            bail!(
                "{} of {} operations did not succeed",
                report.failed(),
                report.entries.len()
            );
        }
        Ok(())
    }
}

/// Mention removals the options leave untouched, so they are not a surprise.
fn print_skipped(change_set: &ChangeSet, options: &SyncOptions) {
    let extra_feeds = change_set.feeds_to_remove.len();
    if extra_feeds > 0 && !options.cleanup_removals {
        println!(
            "{}",
            format!("{extra_feeds} subreddit(s) only on target kept; pass --clean to unsubscribe")
                .bright_black()
        );
    }
    let extra_multis = change_set.collections_to_remove.len();
    if extra_multis > 0 && !options.delete_collections {
        println!(
            "{}",
            format!(
                "{extra_multis} multireddit(s) only on target kept; pass --delete-multis to delete"
            )
            .bright_black()
        );
    }
}
