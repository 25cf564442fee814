//! Snapshot export / import.
//!
//! # File format
//!
//! ```json
//! {
//!   "source_account": "alice",
//!   "exported_at": "2024-05-01T10:00:00+00:00",
//!   "subreddits": ["rust", "golang"],
//!   "multireddits": [{"name": "news", "subreddits": ["worldnews"]}]
//! }
//! ```
//!
//! Older files may carry a naive timestamp (no offset) or omit
//! `exported_at` entirely; both load fine.
//!
//! # API pattern
//!
//! As with the settings file, `fn_at(home, …)` takes an explicit home and the
//! no-arg form derives it from `dirs::home_dir()`. Tests use `_at`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{export_io, ExportError};
use crate::paths;
use crate::types::{Collection, FeedName, Snapshot};

const UNKNOWN_ACCOUNT: &str = "unknown";

fn unknown_account() -> String {
    UNKNOWN_ACCOUNT.to_string()
}

/// On-disk export payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    #[serde(default = "unknown_account")]
    pub source_account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub subreddits: Vec<FeedName>,
    #[serde(default)]
    pub multireddits: Vec<Collection>,
}

impl ExportDocument {
    pub fn from_snapshot(snapshot: &Snapshot, exported_at: DateTime<Utc>) -> Self {
        Self {
            source_account: snapshot.owner().to_string(),
            exported_at: Some(exported_at.to_rfc3339()),
            subreddits: snapshot.feeds().to_vec(),
            multireddits: snapshot.collections().to_vec(),
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        Snapshot::new(self.source_account, self.subreddits, self.multireddits)
    }

    /// Parsed `exported_at`. Naive timestamps are read as UTC.
    pub fn exported_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.exported_at.as_deref()?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// One row of the export listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub source_account: String,
    pub exported_at: Option<DateTime<Utc>>,
    pub feed_count: usize,
    pub collection_count: usize,
}

/// `export_<YYYYmmdd_HHMMSS>.json` for the given instant.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("{}{}.json", paths::EXPORT_PREFIX, at.format("%Y%m%d_%H%M%S"))
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Save `snapshot` under `<home>/.reddit-sync/exports/` with a timestamped name.
///
/// Returns the path written.
pub fn save_at(home: &Path, snapshot: &Snapshot) -> Result<PathBuf, ExportError> {
    let now = Utc::now();
    let path = paths::exports_dir(home).join(export_file_name(now));
    write_document(&path, &ExportDocument::from_snapshot(snapshot, now))?;
    Ok(path)
}

/// `save_at` convenience wrapper.
pub fn save(snapshot: &Snapshot) -> Result<PathBuf, ExportError> {
    save_at(&home()?, snapshot)
}

/// Save `snapshot` to an explicit path.
pub fn save_to(path: &Path, snapshot: &Snapshot) -> Result<(), ExportError> {
    write_document(path, &ExportDocument::from_snapshot(snapshot, Utc::now()))
}

/// Write flow: serialize → `.json.tmp` sibling → `rename`.
fn write_document(path: &Path, doc: &ExportDocument) -> Result<(), ExportError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| export_io(dir, e))?;
    }
    let json = serde_json::to_string_pretty(doc)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| export_io(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(export_io(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read and parse an export file without converting it.
pub fn load_document(path: &Path) -> Result<ExportDocument, ExportError> {
    if !path.exists() {
        return Err(ExportError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| export_io(path, e))?;
    serde_json::from_str(&contents).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load an export file as a [`Snapshot`].
pub fn load(path: &Path) -> Result<Snapshot, ExportError> {
    Ok(load_document(path)?.into_snapshot())
}

/// All exports under `<home>/.reddit-sync/exports/`, newest first.
///
/// Files that fail to parse are skipped.
pub fn list_at(home: &Path) -> Result<Vec<ExportSummary>, ExportError> {
    let dir = paths::exports_dir(home);
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut entries: Vec<_> = std::fs::read_dir(&dir)
        .map_err(|e| export_io(&dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| paths::is_export_file_name(&e.file_name().to_string_lossy()))
        .collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.file_name()));

    let mut summaries = Vec::new();
    for entry in entries {
        let path = entry.path();
        let Ok(doc) = load_document(&path) else {
            continue;
        };
        summaries.push(ExportSummary {
            exported_at: doc.exported_at_utc(),
            source_account: doc.source_account,
            feed_count: doc.subreddits.len(),
            collection_count: doc.multireddits.len(),
            path,
        });
    }
    Ok(summaries)
}

/// `list_at` convenience wrapper.
pub fn list() -> Result<Vec<ExportSummary>, ExportError> {
    list_at(&home()?)
}

/// Path of the newest export, if any.
pub fn latest_at(home: &Path) -> Result<Option<PathBuf>, ExportError> {
    Ok(list_at(home)?.into_iter().next().map(|s| s.path))
}

fn home() -> Result<PathBuf, ExportError> {
    dirs::home_dir().ok_or(ExportError::HomeNotFound)
}
