//! # reddit-sync-engine
//!
//! Diff and sync orchestration between two accounts.
//!
//! Call [`compute_diff`] to get the [`ChangeSet`](reddit_sync_core::ChangeSet)
//! between two account states, then [`SyncExecutor::execute`] to apply it
//! through a [`RemoteWriter`]. [`pipeline::reconcile`] does both against a
//! live target.

pub mod diff;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod remote;
pub mod retry;

pub use diff::{compute_diff, compute_snapshot_diff};
pub use error::{EngineError, RemoteError};
pub use executor::{
    plan, Operation, Outcome, Phase, ReportEntry, SyncExecutor, SyncOptions, SyncReport,
};
pub use remote::{RemoteReader, RemoteWriter};
pub use retry::{RetryPolicy, RetryingWriter};
