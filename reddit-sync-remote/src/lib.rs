//! HTTP transport for reddit-sync.
//!
//! [`RedditClient`] implements [`RemoteReader`](reddit_sync_engine::RemoteReader)
//! and [`RemoteWriter`](reddit_sync_engine::RemoteWriter) against old.reddit.com
//! using cookie auth. Wrap it in a
//! [`RetryingWriter`](reddit_sync_engine::RetryingWriter) for throttling
//! backoff.

pub mod client;
pub mod parse;
pub mod session;

pub use client::RedditClient;
pub use session::{HttpReply, Session};

use reddit_sync_core::Settings;

/// Build a client for one account from its session cookie.
pub fn connect(cookie: &str, username: &str, settings: &Settings) -> RedditClient {
    RedditClient::new(Session::new(cookie, settings), username)
}
