//! Error types for reddit-sync-engine.

use thiserror::Error;

/// Unexpected failure talking to the remote service.
///
/// Ordinary rejections (feed does not exist, permission denied, already in
/// the desired state) are not errors: writers report them as `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Connection refused, timeout, TLS failure, ...
    #[error("transport error: {0}")]
    Transport(String),

    /// HTTP 429.
    #[error("rate limited by remote")]
    Throttled,

    /// Any status the transport could not classify as success or rejection.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The session cookie is missing or expired.
    #[error("not logged in (redirected to {url})")]
    NotLoggedIn { url: String },

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RemoteError::Transport(_) | RemoteError::Throttled => true,
            RemoteError::Status { status } => *status >= 500,
            RemoteError::NotLoggedIn { .. } | RemoteError::Malformed(_) => false,
        }
    }
}

/// All errors that abort a reconciliation run.
///
/// Per-item write failures never surface here; they are recorded in the
/// [`SyncReport`](crate::executor::SyncReport).
#[derive(Debug, Error)]
pub enum EngineError {
    /// A snapshot could not be fetched, so no diff can be computed.
    #[error("failed to fetch {what} for '{owner}': {source}")]
    Fetch {
        owner: String,
        what: &'static str,
        #[source]
        source: RemoteError,
    },
}

pub(crate) fn fetch_err(owner: &str, what: &'static str, source: RemoteError) -> EngineError {
    EngineError::Fetch {
        owner: owner.to_string(),
        what,
        source,
    }
}
