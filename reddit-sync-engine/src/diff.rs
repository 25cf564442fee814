//! Diff engine: two account states → [`ChangeSet`].
//!
//! Identity is the lower-cased name for feeds, collections, and collection
//! members. Added items keep the source spelling, removed items the target
//! spelling. Blank names and unnamed collections are skipped.
//!
//! Output lists follow first appearance in the input. Nothing downstream
//! depends on that order for correctness; renderers sort via
//! [`ChangeSet::sorted`].

use std::collections::HashMap;

use reddit_sync_core::types::{ChangeSet, Collection, CollectionUpdate, FeedName, Snapshot};

/// Insertion-ordered map keyed by case-folded name. On a duplicate key the
/// later value replaces the earlier one but keeps its position.
struct Folded<T> {
    index: HashMap<String, usize>,
    items: Vec<(String, T)>,
}

impl<T> Folded<T> {
    fn build(entries: impl IntoIterator<Item = (String, T)>) -> Self {
        let mut out = Folded {
            index: HashMap::new(),
            items: Vec::new(),
        };
        for (key, value) in entries {
            match out.index.get(&key) {
                Some(&i) => out.items[i].1 = value,
                None => {
                    out.index.insert(key.clone(), out.items.len());
                    out.items.push((key, value));
                }
            }
        }
        out
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&i| &self.items[i].1)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn fold_feeds(names: &[FeedName]) -> Folded<&FeedName> {
    Folded::build(
        names
            .iter()
            .filter(|n| !n.is_blank())
            .map(|n| (n.key(), n)),
    )
}

fn fold_collections(collections: &[Collection]) -> Folded<&Collection> {
    Folded::build(
        collections
            .iter()
            .filter(|c| !c.is_malformed())
            .map(|c| (c.key(), c)),
    )
}

/// Copy of a collection with blank members dropped and case variants folded.
fn cleaned(collection: &Collection) -> Collection {
    Collection {
        name: collection.name.clone(),
        members: fold_feeds(&collection.members)
            .iter()
            .map(|(_, name)| (*name).clone())
            .collect(),
    }
}

/// Items of `left` whose key is absent from `right`, in `left` order.
fn missing_from(left: &Folded<&FeedName>, right: &Folded<&FeedName>) -> Vec<FeedName> {
    left.iter()
        .filter(|(key, _)| !right.contains(key))
        .map(|(_, name)| (*name).clone())
        .collect()
}

/// Compute the changes that converge the target toward the source.
///
/// Pure: no I/O, never fails. Empty inputs mean "nothing there".
pub fn compute_diff(
    source_feeds: &[FeedName],
    target_feeds: &[FeedName],
    source_collections: &[Collection],
    target_collections: &[Collection],
) -> ChangeSet {
    let source = fold_feeds(source_feeds);
    let target = fold_feeds(target_feeds);

    let mut change_set = ChangeSet {
        feeds_to_add: missing_from(&source, &target),
        feeds_to_remove: missing_from(&target, &source),
        ..ChangeSet::default()
    };

    let source_collections = fold_collections(source_collections);
    let target_collections = fold_collections(target_collections);

    for (key, source_collection) in source_collections.iter() {
        let Some(target_collection) = target_collections.get(key) else {
            change_set.collections_to_add.push(cleaned(source_collection));
            continue;
        };

        let source_members = fold_feeds(&source_collection.members);
        let target_members = fold_feeds(&target_collection.members);
        let update = CollectionUpdate {
            name: source_collection.name.clone(),
            add: missing_from(&source_members, &target_members),
            remove: missing_from(&target_members, &source_members),
        };
        if !update.is_empty() {
            change_set.collections_to_update.push(update);
        }
    }

    change_set.collections_to_remove = target_collections
        .iter()
        .filter(|(key, _)| !source_collections.contains(key))
        .map(|(_, c)| cleaned(c))
        .collect();

    change_set
}

/// [`compute_diff`] over two snapshots.
pub fn compute_snapshot_diff(source: &Snapshot, target: &Snapshot) -> ChangeSet {
    compute_diff(
        source.feeds(),
        target.feeds(),
        source.collections(),
        target.collections(),
    )
}

#[cfg(test)]
mod tests {
    use reddit_sync_core::types::feeds;

    use super::*;

    fn multi(name: &str, members: &[&str]) -> Collection {
        Collection::new(name, feeds(members.iter().copied()))
    }

    #[test]
    fn case_variants_are_the_same_feed() {
        let cs = compute_diff(&feeds(["AskReddit"]), &feeds(["askreddit"]), &[], &[]);
        assert!(cs.feeds_to_add.is_empty());
        assert!(cs.feeds_to_remove.is_empty());
    }

    #[test]
    fn adds_use_source_spelling_and_removes_target_spelling() {
        let cs = compute_diff(&feeds(["RustLang"]), &feeds(["GoLang"]), &[], &[]);
        assert_eq!(cs.feeds_to_add, feeds(["RustLang"]));
        assert_eq!(cs.feeds_to_remove, feeds(["GoLang"]));
    }

    #[test]
    fn end_to_end_feed_scenario() {
        let cs = compute_diff(&feeds(["a", "b", "c"]), &feeds(["b", "d"]), &[], &[]);
        assert_eq!(cs.feeds_to_add, feeds(["a", "c"]));
        assert_eq!(cs.feeds_to_remove, feeds(["d"]));
        assert!(!cs.has_collection_changes());
    }

    #[test]
    fn identical_sides_converge() {
        let subs = feeds(["rust", "golang"]);
        let multis = vec![multi("news", &["worldnews"]), multi("empty", &[])];
        let cs = compute_diff(&subs, &subs, &multis, &multis);
        assert!(!cs.has_changes());
    }

    #[test]
    fn collection_update_is_minimal() {
        let cs = compute_diff(
            &[],
            &[],
            &[multi("news", &["worldnews", "politics"])],
            &[multi("news", &["worldnews"])],
        );
        assert_eq!(
            cs.collections_to_update,
            vec![CollectionUpdate {
                name: "news".into(),
                add: feeds(["politics"]),
                remove: vec![],
            }]
        );
        assert!(cs.collections_to_add.is_empty());
        assert!(cs.collections_to_remove.is_empty());
    }

    #[test]
    fn collections_match_case_insensitively_and_update_uses_source_name() {
        let cs = compute_diff(
            &[],
            &[],
            &[multi("Tech", &["Rust"])],
            &[multi("tech", &["rust", "php"])],
        );
        assert_eq!(cs.collections_to_update.len(), 1);
        let update = &cs.collections_to_update[0];
        assert_eq!(update.name, "Tech");
        assert!(update.add.is_empty());
        assert_eq!(update.remove, feeds(["php"]));
    }

    #[test]
    fn one_sided_collections_are_added_or_removed_whole() {
        let cs = compute_diff(
            &[],
            &[],
            &[multi("Gaming", &["pcgaming", "nintendo"]), multi("quiet", &[])],
            &[multi("Cooking", &["recipes"])],
        );
        assert_eq!(
            cs.collections_to_add,
            vec![multi("Gaming", &["pcgaming", "nintendo"]), multi("quiet", &[])]
        );
        assert_eq!(cs.collections_to_remove, vec![multi("Cooking", &["recipes"])]);
        assert!(cs.collections_to_update.is_empty());
    }

    #[test]
    fn empty_collections_on_both_sides_need_no_update() {
        let cs = compute_diff(&[], &[], &[multi("empty", &[])], &[multi("EMPTY", &[])]);
        assert!(!cs.has_changes());
    }

    #[test]
    fn duplicates_do_not_panic_and_last_spelling_wins() {
        let cs = compute_diff(&feeds(["rust", "Rust", "RUST"]), &[], &[], &[]);
        assert_eq!(cs.feeds_to_add, feeds(["RUST"]));
    }

    #[test]
    fn one_sided_collections_fold_member_case_variants() {
        let cs = compute_diff(
            &[],
            &[],
            &[multi("m", &["Rust", "rust", "golang"])],
            &[multi("old", &["News", "", "news"])],
        );
        assert_eq!(cs.collections_to_add, vec![multi("m", &["rust", "golang"])]);
        assert_eq!(cs.collections_to_remove, vec![multi("old", &["news"])]);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let cs = compute_diff(
            &feeds(["", "  ", "rust"]),
            &[],
            &[multi("", &["orphan"]), multi("ok", &["", "news"])],
            &[multi("   ", &[])],
        );
        assert_eq!(cs.feeds_to_add, feeds(["rust"]));
        assert_eq!(cs.collections_to_add, vec![multi("ok", &["news"])]);
        assert!(cs.collections_to_remove.is_empty());
    }

    #[test]
    fn snapshot_diff_matches_list_diff() {
        let source = Snapshot::new("a", feeds(["x", "y"]), vec![multi("m", &["x"])]);
        let target = Snapshot::new("b", feeds(["y"]), vec![]);
        let cs = compute_snapshot_diff(&source, &target);
        assert_eq!(cs.feeds_to_add, feeds(["x"]));
        assert_eq!(cs.collections_to_add, vec![multi("m", &["x"])]);
    }
}
