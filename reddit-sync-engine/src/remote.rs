//! Remote read / write surfaces.
//!
//! Any concrete transport implements both traits; the engine never knows
//! which one it is talking to. Methods take `&self`: session state such as an
//! auth token is interior to the implementation.
//!
//! Writers must be idempotent: subscribing to an already-subscribed feed or
//! removing an absent member must not corrupt state. `Ok(false)` is an
//! ordinary rejection, `Err` an unexpected transport failure.

use reddit_sync_core::types::{Collection, FeedName};

use crate::error::RemoteError;

/// Read access used to build a [`Snapshot`](reddit_sync_core::Snapshot).
pub trait RemoteReader {
    fn list_subscribed_feeds(&self) -> Result<Vec<FeedName>, RemoteError>;
    fn list_collections(&self) -> Result<Vec<Collection>, RemoteError>;
}

/// Mutation primitives used by the sync executor.
pub trait RemoteWriter {
    fn subscribe(&self, feed: &FeedName) -> Result<bool, RemoteError>;
    fn unsubscribe(&self, feed: &FeedName) -> Result<bool, RemoteError>;
    fn create_collection(&self, name: &str, members: &[FeedName]) -> Result<bool, RemoteError>;
    fn delete_collection(&self, name: &str) -> Result<bool, RemoteError>;
    fn add_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError>;
    fn remove_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError>;
}

impl<R: RemoteReader + ?Sized> RemoteReader for &R {
    fn list_subscribed_feeds(&self) -> Result<Vec<FeedName>, RemoteError> {
        (**self).list_subscribed_feeds()
    }

    fn list_collections(&self) -> Result<Vec<Collection>, RemoteError> {
        (**self).list_collections()
    }
}

impl<W: RemoteWriter + ?Sized> RemoteWriter for &W {
    fn subscribe(&self, feed: &FeedName) -> Result<bool, RemoteError> {
        (**self).subscribe(feed)
    }

    fn unsubscribe(&self, feed: &FeedName) -> Result<bool, RemoteError> {
        (**self).unsubscribe(feed)
    }

    fn create_collection(&self, name: &str, members: &[FeedName]) -> Result<bool, RemoteError> {
        (**self).create_collection(name, members)
    }

    fn delete_collection(&self, name: &str) -> Result<bool, RemoteError> {
        (**self).delete_collection(name)
    }

    fn add_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        (**self).add_member(collection, feed)
    }

    fn remove_member(&self, collection: &str, feed: &FeedName) -> Result<bool, RemoteError> {
        (**self).remove_member(collection, feed)
    }
}
