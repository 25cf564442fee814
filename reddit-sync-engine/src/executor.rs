//! Sync executor: applies a [`ChangeSet`] to a target account.
//!
//! ## Phase order
//!
//! 1. Unsubscribe removed feeds (`sync_feeds` + `cleanup_removals`).
//! 2. Subscribe added feeds (`sync_feeds`).
//! 3. Create new collections with their full membership (`sync_collections`).
//! 4. Update shared collections: every add, then every remove (`sync_collections`).
//! 5. Delete target-only collections (`sync_collections` + `delete_collections`).
//!
//! [`plan`] is the only place that order is encoded. Live and dry-run
//! execution walk the same planned list, so a dry run previews exactly the
//! calls a live run would attempt.
//!
//! Every call is independent. A rejected or failed item is recorded and the
//! executor moves on; there is no rollback.

use std::fmt;

use serde::Serialize;

use reddit_sync_core::types::{ChangeSet, FeedName};

use crate::error::RemoteError;
use crate::remote::RemoteWriter;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What the executor is allowed to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub sync_feeds: bool,
    pub sync_collections: bool,
    /// Unsubscribe feeds the source does not have.
    pub cleanup_removals: bool,
    /// Delete collections the source does not have.
    pub delete_collections: bool,
    pub dry_run: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            sync_feeds: true,
            sync_collections: true,
            cleanup_removals: false,
            delete_collections: false,
            dry_run: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Unsubscribe,
    Subscribe,
    CreateCollections,
    UpdateCollections,
    DeleteCollections,
}

/// One remote mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Unsubscribe { feed: FeedName },
    Subscribe { feed: FeedName },
    CreateCollection { name: String, members: Vec<FeedName> },
    AddMember { collection: String, feed: FeedName },
    RemoveMember { collection: String, feed: FeedName },
    DeleteCollection { name: String },
}

impl Operation {
    pub fn phase(&self) -> Phase {
        match self {
            Operation::Unsubscribe { .. } => Phase::Unsubscribe,
            Operation::Subscribe { .. } => Phase::Subscribe,
            Operation::CreateCollection { .. } => Phase::CreateCollections,
            Operation::AddMember { .. } | Operation::RemoveMember { .. } => {
                Phase::UpdateCollections
            }
            Operation::DeleteCollection { .. } => Phase::DeleteCollections,
        }
    }

    fn apply<W: RemoteWriter + ?Sized>(&self, writer: &W) -> Result<bool, RemoteError> {
        match self {
            Operation::Unsubscribe { feed } => writer.unsubscribe(feed),
            Operation::Subscribe { feed } => writer.subscribe(feed),
            Operation::CreateCollection { name, members } => {
                writer.create_collection(name, members)
            }
            Operation::AddMember { collection, feed } => writer.add_member(collection, feed),
            Operation::RemoveMember { collection, feed } => {
                writer.remove_member(collection, feed)
            }
            Operation::DeleteCollection { name } => writer.delete_collection(name),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Unsubscribe { feed } => write!(f, "unsubscribe r/{feed}"),
            Operation::Subscribe { feed } => write!(f, "subscribe r/{feed}"),
            Operation::CreateCollection { name, members } => {
                write!(f, "create multi {name} ({} subs)", members.len())
            }
            Operation::AddMember { collection, feed } => {
                write!(f, "add r/{feed} to multi {collection}")
            }
            Operation::RemoveMember { collection, feed } => {
                write!(f, "remove r/{feed} from multi {collection}")
            }
            Operation::DeleteCollection { name } => write!(f, "delete multi {name}"),
        }
    }
}

/// Ordered list of operations `options` allows for `change_set`.
pub fn plan(change_set: &ChangeSet, options: &SyncOptions) -> Vec<Operation> {
    let mut ops = Vec::new();

    if options.sync_feeds && options.cleanup_removals {
        ops.extend(
            change_set
                .feeds_to_remove
                .iter()
                .map(|feed| Operation::Unsubscribe { feed: feed.clone() }),
        );
    }

    if options.sync_feeds {
        ops.extend(
            change_set
                .feeds_to_add
                .iter()
                .map(|feed| Operation::Subscribe { feed: feed.clone() }),
        );
    }

    if options.sync_collections {
        ops.extend(
            change_set
                .collections_to_add
                .iter()
                .map(|c| Operation::CreateCollection {
                    name: c.name.clone(),
                    members: c.members.clone(),
                }),
        );

        for update in &change_set.collections_to_update {
            ops.extend(update.add.iter().map(|feed| Operation::AddMember {
                collection: update.name.clone(),
                feed: feed.clone(),
            }));
            ops.extend(update.remove.iter().map(|feed| Operation::RemoveMember {
                collection: update.name.clone(),
                feed: feed.clone(),
            }));
        }

        if options.delete_collections {
            ops.extend(
                change_set
                    .collections_to_remove
                    .iter()
                    .map(|c| Operation::DeleteCollection {
                        name: c.name.clone(),
                    }),
            );
        }
    }

    ops
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Outcome of a single planned operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The remote accepted the call.
    Applied,
    /// The remote declined the call (`false`).
    Rejected,
    /// The call failed in transport.
    Failed { reason: String },
    /// Dry run: the call would have been made.
    WouldApply,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Rejected | Outcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    #[serde(flatten)]
    pub operation: Operation,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Every attempted (or, in dry run, planned) item with its outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    pub entries: Vec<ReportEntry>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Applied))
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, Outcome::WouldApply))
    }

    /// `true` when no item was rejected or failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.entries.iter().map(|e| &e.operation)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Applies change sets through a borrowed [`RemoteWriter`], one call at a time.
pub struct SyncExecutor<'a, W: RemoteWriter + ?Sized> {
    writer: &'a W,
}

impl<'a, W: RemoteWriter + ?Sized> SyncExecutor<'a, W> {
    pub fn new(writer: &'a W) -> Self {
        Self { writer }
    }

    /// Execute `change_set` and return the per-item report.
    pub fn execute(&self, change_set: &ChangeSet, options: &SyncOptions) -> SyncReport {
        self.execute_with_progress(change_set, options, |_, _, _| {})
    }

    /// Like [`execute`](Self::execute), calling `on_entry(index, total, entry)`
    /// after each item (1-based index).
    pub fn execute_with_progress(
        &self,
        change_set: &ChangeSet,
        options: &SyncOptions,
        mut on_entry: impl FnMut(usize, usize, &ReportEntry),
    ) -> SyncReport {
        let ops = plan(change_set, options);
        let total = ops.len();
        let mut report = SyncReport {
            dry_run: options.dry_run,
            entries: Vec::with_capacity(total),
        };

        for (i, operation) in ops.into_iter().enumerate() {
            let outcome = if options.dry_run {
                tracing::info!("[dry-run] would {operation}");
                Outcome::WouldApply
            } else {
                self.apply(&operation)
            };
            let entry = ReportEntry { operation, outcome };
            on_entry(i + 1, total, &entry);
            report.entries.push(entry);
        }

        tracing::debug!(
            "sync finished: {} applied, {} failed, {} planned",
            report.succeeded(),
            report.failed(),
            report.planned()
        );
        report
    }

    fn apply(&self, operation: &Operation) -> Outcome {
        match operation.apply(self.writer) {
            Ok(true) => {
                tracing::info!("{operation}: ok");
                Outcome::Applied
            }
            Ok(false) => {
                tracing::warn!("{operation}: rejected by remote");
                Outcome::Rejected
            }
            Err(err) => {
                tracing::error!("{operation}: {err}");
                Outcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
