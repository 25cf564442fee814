//! On-disk layout.
//!
//! ```text
//! ~/.reddit-sync/
//!   settings.yaml
//!   exports/
//!     export_<YYYYmmdd_HHMMSS>.json
//! ```

use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.yaml";
pub const EXPORT_PREFIX: &str = "export_";

pub fn app_root(home: &Path) -> PathBuf {
    home.join(".reddit-sync")
}

pub fn settings_path(home: &Path) -> PathBuf {
    app_root(home).join(SETTINGS_FILE)
}

pub fn exports_dir(home: &Path) -> PathBuf {
    app_root(home).join("exports")
}

/// `true` for file names the export listing should pick up.
pub fn is_export_file_name(name: &str) -> bool {
    name.starts_with(EXPORT_PREFIX) && name.ends_with(".json")
}
