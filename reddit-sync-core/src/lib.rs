//! reddit-sync core library: account snapshot and change-set types,
//! snapshot export/import, settings, errors.
//!
//! - [`types`]: feed names, collections, snapshots, change sets
//! - [`export`]: JSON snapshot files under `~/.reddit-sync/exports/`
//! - [`settings`]: `~/.reddit-sync/settings.yaml`
//! - [`error`]: [`ExportError`], [`SettingsError`]

pub mod error;
pub mod export;
pub mod paths;
pub mod settings;
pub mod types;

pub use error::{ExportError, SettingsError};
pub use settings::{RetrySettings, Settings};
pub use types::{ChangeSet, Collection, CollectionUpdate, FeedName, Snapshot};
