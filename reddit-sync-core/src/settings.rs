//! User settings at `~/.reddit-sync/settings.yaml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! ```yaml
//! base_url: https://old.reddit.com
//! request_delay_ms: 2000
//! retry:
//!   max_attempts: 3
//!   initial_backoff_ms: 4000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{settings_io, SettingsError};
use crate::paths;

pub const DEFAULT_BASE_URL: &str = "https://old.reddit.com";
pub const DEFAULT_USER_AGENT: &str = concat!("reddit-sync/", env!("CARGO_PKG_VERSION"));

/// Transport and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub user_agent: String,
    /// Pause before every remote request.
    pub request_delay_ms: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_delay_ms: 2000,
            timeout_secs: 30,
            retry: RetrySettings::default(),
        }
    }
}

impl Settings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry schedule for throttled or transiently failing writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts per call, including the first. `1` disables retries.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 4000,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
        }
    }
}

/// Load settings from `<home>/.reddit-sync/settings.yaml`.
///
/// Returns defaults if the file does not exist.
pub fn load_at(home: &Path) -> Result<Settings, SettingsError> {
    let path = paths::settings_path(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| settings_io(&path, e))?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| SettingsError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Settings, SettingsError> {
    load_at(&home()?)
}

/// Atomically save settings (`.yaml.tmp` + rename).
pub fn save_at(home: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let path = paths::settings_path(home);
    let dir = paths::app_root(home);
    std::fs::create_dir_all(&dir).map_err(|e| settings_io(&dir, e))?;

    let yaml = serde_yaml::to_string(settings)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml).map_err(|e| settings_io(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| settings_io(&path, e))?;
    Ok(())
}

fn home() -> Result<PathBuf, SettingsError> {
    dirs::home_dir().ok_or(SettingsError::HomeNotFound)
}
