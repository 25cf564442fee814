//! Shared reconciliation entrypoint used by the CLI commands.
//!
//! Fetch target snapshot → diff → execute. A snapshot fetch failure aborts
//! the run; per-item write failures end up in the report.

use reddit_sync_core::types::{ChangeSet, Snapshot};

use crate::diff::compute_snapshot_diff;
use crate::error::{fetch_err, EngineError};
use crate::executor::{SyncExecutor, SyncOptions, SyncReport};
use crate::remote::{RemoteReader, RemoteWriter};

/// Result of a full reconciliation run.
#[derive(Debug, Clone)]
pub struct SyncRun {
    pub target: Snapshot,
    pub change_set: ChangeSet,
    pub report: SyncReport,
}

/// Build a [`Snapshot`] from a live account.
pub fn fetch_snapshot<R: RemoteReader + ?Sized>(
    owner: &str,
    reader: &R,
) -> Result<Snapshot, EngineError> {
    tracing::info!("fetching subscriptions for '{owner}'");
    let feeds = reader
        .list_subscribed_feeds()
        .map_err(|e| fetch_err(owner, "subscriptions", e))?;
    tracing::info!("fetching multireddits for '{owner}'");
    let collections = reader
        .list_collections()
        .map_err(|e| fetch_err(owner, "multireddits", e))?;
    tracing::debug!(
        "'{owner}': {} subscriptions, {} multireddits",
        feeds.len(),
        collections.len()
    );
    Ok(Snapshot::new(owner, feeds, collections))
}

/// Diff `source` against `target`, keeping only the halves `options` syncs.
pub fn plan_changes(source: &Snapshot, target: &Snapshot, options: &SyncOptions) -> ChangeSet {
    compute_snapshot_diff(source, target).restrict(options.sync_feeds, options.sync_collections)
}

/// Converge the target account toward `source`.
pub fn reconcile<T>(
    source: &Snapshot,
    target_owner: &str,
    target: &T,
    options: &SyncOptions,
) -> Result<SyncRun, EngineError>
where
    T: RemoteReader + RemoteWriter + ?Sized,
{
    let target_snapshot = fetch_snapshot(target_owner, target)?;
    let change_set = plan_changes(source, &target_snapshot, options);
    let report = SyncExecutor::new(target).execute(&change_set, options);
    Ok(SyncRun {
        target: target_snapshot,
        change_set,
        report,
    })
}

#[cfg(test)]
mod tests {
    use reddit_sync_core::types::{feeds, Collection, FeedName};

    use super::*;
    use crate::error::RemoteError;

    struct Unreachable;

    impl RemoteReader for Unreachable {
        fn list_subscribed_feeds(&self) -> Result<Vec<FeedName>, RemoteError> {
            Err(RemoteError::Transport("dns failure".into()))
        }
        fn list_collections(&self) -> Result<Vec<Collection>, RemoteError> {
            Ok(vec![])
        }
    }

    #[test]
    fn fetch_failure_aborts() {
        let err = fetch_snapshot("bob", &Unreachable).unwrap_err();
        assert!(err.to_string().contains("subscriptions"));
        assert!(err.to_string().contains("bob"));
    }

    #[test]
    fn plan_changes_drops_unselected_half() {
        let source = Snapshot::new("a", feeds(["x"]), vec![Collection::new("m", vec![])]);
        let target = Snapshot::new("b", vec![], vec![]);
        let only_collections = plan_changes(
            &source,
            &target,
            &SyncOptions {
                sync_feeds: false,
                ..SyncOptions::default()
            },
        );
        assert!(only_collections.feeds_to_add.is_empty());
        assert_eq!(only_collections.collections_to_add.len(), 1);
    }
}
