//! `reddit-sync show`: inspect saved exports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use reddit_sync_core::export::{self, ExportSummary};

/// Arguments for `reddit-sync show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Export file to summarize. Lists all saved exports when omitted.
    pub file: Option<PathBuf>,
}

#[derive(Tabled)]
struct ExportRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "account")]
    account: String,
    #[tabled(rename = "exported")]
    exported: String,
    #[tabled(rename = "subs")]
    subs: usize,
    #[tabled(rename = "multis")]
    multis: usize,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        match self.file {
            Some(path) => show_file(&path),
            None => list_exports(),
        }
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn list_exports() -> Result<()> {
    let summaries = export::list().context("failed to list exports")?;
    if summaries.is_empty() {
        println!("No exports found. Run `reddit-sync export` first.");
        return Ok(());
    }

    let rows: Vec<ExportRow> = summaries.into_iter().map(row).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn row(summary: ExportSummary) -> ExportRow {
    ExportRow {
        file: summary
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        account: summary.source_account,
        exported: format_time(summary.exported_at),
        subs: summary.feed_count,
        multis: summary.collection_count,
    }
}

fn show_file(path: &Path) -> Result<()> {
    let doc = export::load_document(path)
        .with_context(|| format!("failed to read export {}", path.display()))?;
    let exported = format_time(doc.exported_at_utc());
    let snapshot = doc.into_snapshot();

    println!("{} {}", "Account:".bold(), snapshot.owner());
    println!("{} {}", "Exported:".bold(), exported);
    println!("{} {}", "Subreddits:".bold(), snapshot.feeds().len());
    for feed in snapshot.feeds() {
        println!("  r/{feed}");
    }
    println!("{} {}", "Multireddits:".bold(), snapshot.collections().len());
    for c in snapshot.collections() {
        let names: Vec<&str> = c.members.iter().map(|m| m.as_str()).collect();
        println!("  {} [{}]", c.name, names.join(", "));
    }
    Ok(())
}
