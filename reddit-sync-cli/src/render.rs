//! Terminal rendering for change sets and sync progress.

use colored::Colorize;

use reddit_sync_core::types::{ChangeSet, Collection};
use reddit_sync_engine::{Outcome, ReportEntry, SyncReport};

fn members(collection: &Collection) -> String {
    let count = collection.members.len();
    format!("{count} sub{}", if count == 1 { "" } else { "s" })
}

/// Print `change_set` grouped into subreddits and multireddits.
pub fn print_change_set(change_set: &ChangeSet) {
    if !change_set.has_changes() {
        println!("(no differences)");
        return;
    }
    let cs = change_set.sorted();

    if cs.has_feed_changes() {
        println!("{}", "Subreddits".bold());
        for feed in &cs.feeds_to_add {
            println!("  {} r/{feed}", "+".green());
        }
        for feed in &cs.feeds_to_remove {
            println!("  {} r/{feed}", "-".red());
        }
    }

    if cs.has_collection_changes() {
        println!("{}", "Multireddits".bold());
        for c in &cs.collections_to_add {
            println!("  {} {} ({})", "+".green(), c.name, members(c));
        }
        for c in &cs.collections_to_remove {
            println!("  {} {} ({})", "-".red(), c.name, members(c));
        }
        for u in &cs.collections_to_update {
            println!(
                "  {} {} (+{}, -{} subs)",
                "~".yellow(),
                u.name,
                u.add.len(),
                u.remove.len()
            );
            for feed in &u.add {
                println!("      {} r/{feed}", "+".green());
            }
            for feed in &u.remove {
                println!("      {} r/{feed}", "-".red());
            }
        }
    }
}

/// One progress line, e.g. `[3/12] ✓ subscribe r/rust`.
pub fn entry_line(index: usize, total: usize, entry: &ReportEntry) -> String {
    let marker = match &entry.outcome {
        Outcome::Applied => "✓".green().to_string(),
        Outcome::Rejected => "✗".red().to_string(),
        Outcome::Failed { .. } => "!".red().bold().to_string(),
        Outcome::WouldApply => "~".yellow().to_string(),
    };
    let mut line = format!("[{index}/{total}] {marker} {}", entry.operation);
    match &entry.outcome {
        Outcome::Rejected => line.push_str(" (rejected)"),
        Outcome::Failed { reason } => line.push_str(&format!(" ({reason})")),
        Outcome::Applied | Outcome::WouldApply => {}
    }
    line
}

pub fn print_summary(report: &SyncReport) {
    if report.entries.is_empty() {
        println!("Nothing to do; target already matches source.");
        return;
    }
    if report.dry_run {
        println!(
            "[dry-run] {} operations planned, nothing was changed.",
            report.planned()
        );
        return;
    }
    let summary = format!(
        "{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    if report.is_clean() {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
}
