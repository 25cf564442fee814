//! Domain types for account reconciliation.
//!
//! Feed and collection identity is case-insensitive: two names denote the same
//! thing iff their lower-cased forms are equal. The original spelling is kept
//! for display and for the remote calls.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A subscribable feed (subreddit) name, as spelled by the account it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeedName(pub String);

impl FeedName {
    /// Case-folded identity key.
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Case-insensitive equality.
    pub fn same_feed(&self, other: &FeedName) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Display for FeedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FeedName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FeedName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Build a feed list from string slices. Mostly a test and CLI convenience.
pub fn feeds<I, S>(names: I) -> Vec<FeedName>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(|s| FeedName(s.into())).collect()
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// A named, user-curated grouping of feeds (multireddit).
///
/// Serialized as `{"name": ..., "subreddits": [...]}`, the layout shared by
/// exports and the machine-readable diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "subreddits", default)]
    pub members: Vec<FeedName>,
}

impl Collection {
    pub fn new(name: impl Into<String>, members: Vec<FeedName>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    /// Case-folded identity key.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }

    /// A collection without a usable name cannot be reconciled.
    pub fn is_malformed(&self) -> bool {
        self.name.trim().is_empty()
    }
}

/// Membership changes for a collection present on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionUpdate {
    pub name: String,
    #[serde(default)]
    pub add: Vec<FeedName>,
    #[serde(default)]
    pub remove: Vec<FeedName>,
}

impl CollectionUpdate {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time capture of one account's feeds and collections.
///
/// Fields are private: a snapshot is built once and read afterwards. Build a
/// new one to reflect a later fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    owner: String,
    feeds: Vec<FeedName>,
    collections: Vec<Collection>,
}

impl Snapshot {
    /// Build a snapshot, dropping blank names and case-fold duplicates
    /// (first spelling wins) from the feed list and every collection.
    pub fn new(owner: impl Into<String>, feeds: Vec<FeedName>, collections: Vec<Collection>) -> Self {
        let collections = collections
            .into_iter()
            .map(|c| Collection {
                members: dedup_case_folded(c.members),
                name: c.name,
            })
            .collect();
        Self {
            owner: owner.into(),
            feeds: dedup_case_folded(feeds),
            collections,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn feeds(&self) -> &[FeedName] {
        &self.feeds
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Case-insensitive feed membership check.
    pub fn has_feed(&self, name: &str) -> bool {
        let key = name.to_lowercase();
        self.feeds.iter().any(|f| f.key() == key)
    }
}

fn dedup_case_folded(names: Vec<FeedName>) -> Vec<FeedName> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|n| !n.is_blank() && seen.insert(n.key()))
        .collect()
}

// ---------------------------------------------------------------------------
// Change set
// ---------------------------------------------------------------------------

/// Minimal set of changes that converges a target account toward a source.
///
/// JSON keys follow the `subs_*` / `multis_*` naming used by the diff output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    #[serde(rename = "subs_to_add", default)]
    pub feeds_to_add: Vec<FeedName>,
    #[serde(rename = "subs_to_remove", default)]
    pub feeds_to_remove: Vec<FeedName>,
    #[serde(rename = "multis_to_add", default)]
    pub collections_to_add: Vec<Collection>,
    #[serde(rename = "multis_to_remove", default)]
    pub collections_to_remove: Vec<Collection>,
    #[serde(rename = "multis_to_update", default)]
    pub collections_to_update: Vec<CollectionUpdate>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        self.has_feed_changes() || self.has_collection_changes()
    }

    pub fn has_feed_changes(&self) -> bool {
        !self.feeds_to_add.is_empty() || !self.feeds_to_remove.is_empty()
    }

    pub fn has_collection_changes(&self) -> bool {
        !self.collections_to_add.is_empty()
            || !self.collections_to_remove.is_empty()
            || !self.collections_to_update.is_empty()
    }

    /// Copy with every list sorted by case-folded name, for presentation.
    pub fn sorted(&self) -> ChangeSet {
        let mut out = self.clone();
        sort_feeds(&mut out.feeds_to_add);
        sort_feeds(&mut out.feeds_to_remove);
        for c in out
            .collections_to_add
            .iter_mut()
            .chain(out.collections_to_remove.iter_mut())
        {
            sort_feeds(&mut c.members);
        }
        out.collections_to_add.sort_by_key(Collection::key);
        out.collections_to_remove.sort_by_key(Collection::key);
        for u in out.collections_to_update.iter_mut() {
            sort_feeds(&mut u.add);
            sort_feeds(&mut u.remove);
        }
        out.collections_to_update
            .sort_by_key(|u| u.name.to_lowercase());
        out
    }

    /// Copy keeping only the feed half, the collection half, or both.
    pub fn restrict(self, feeds: bool, collections: bool) -> ChangeSet {
        let mut out = self;
        if !feeds {
            out.feeds_to_add.clear();
            out.feeds_to_remove.clear();
        }
        if !collections {
            out.collections_to_add.clear();
            out.collections_to_remove.clear();
            out.collections_to_update.clear();
        }
        out
    }
}

fn sort_feeds(names: &mut [FeedName]) {
    names.sort_by(|a, b| a.key().cmp(&b.key()).then_with(|| a.0.cmp(&b.0)));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
