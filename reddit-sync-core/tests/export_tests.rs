//! Export file compatibility, listing, and error-message tests.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use reddit_sync_core::{
    export::{self, ExportDocument},
    paths,
    types::{feeds, Collection, Snapshot},
    ExportError,
};
use rstest::rstest;
use std::fs;

fn sample(owner: &str) -> Snapshot {
    Snapshot::new(
        owner,
        feeds(["rust", "AskReddit"]),
        vec![
            Collection::new("news", feeds(["worldnews", "politics"])),
            Collection::new("empty", vec![]),
        ],
    )
}

// ---------------------------------------------------------------------------
// 1. Format compatibility
// ---------------------------------------------------------------------------

#[rstest]
#[case(
    "full",
    r#"{"source_account":"alice","exported_at":"2024-05-01T10:00:00+00:00","subreddits":["rust"],"multireddits":[{"name":"news","subreddits":["worldnews"]}]}"#,
    "alice",
    1,
    1
)]
#[case("no_timestamp", r#"{"source_account":"bob","subreddits":["a","b"]}"#, "bob", 2, 0)]
#[case("no_account", r#"{"subreddits":[],"multireddits":[]}"#, "unknown", 0, 0)]
#[case(
    "multi_without_members",
    r#"{"source_account":"c","multireddits":[{"name":"solo"}]}"#,
    "c",
    0,
    1
)]
#[case(
    "unicode",
    r#"{"source_account":"пользователь","subreddits":["日本語"]}"#,
    "пользователь",
    1,
    0
)]
fn loads_export_variants(
    #[case] label: &str,
    #[case] json: &str,
    #[case] owner: &str,
    #[case] feed_count: usize,
    #[case] collection_count: usize,
) {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(format!("{label}.json"));
    file.write_str(json).expect("write");

    let snap = export::load(file.path()).unwrap_or_else(|e| panic!("[{label}] load failed: {e}"));
    assert_eq!(snap.owner(), owner, "[{label}] owner");
    assert_eq!(snap.feeds().len(), feed_count, "[{label}] feeds");
    assert_eq!(snap.collections().len(), collection_count, "[{label}] collections");
}

#[test]
fn saved_file_uses_documented_keys() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let path = export::save_at(home.path(), &sample("alice")).expect("save");

    let raw = fs::read_to_string(&path).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["source_account"], "alice");
    assert!(value["exported_at"].is_string());
    assert_eq!(value["subreddits"], serde_json::json!(["rust", "AskReddit"]));
    assert_eq!(
        value["multireddits"][0],
        serde_json::json!({"name": "news", "subreddits": ["worldnews", "politics"]})
    );

    let doc: ExportDocument = serde_json::from_str(&raw).expect("document");
    assert!(doc.exported_at_utc().is_some());
}

#[test]
fn save_to_creates_parent_directories() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let target = dir.child("nested").child("backup.json");
    export::save_to(target.path(), &sample("alice")).expect("save");
    target.assert(predicate::path::exists());
    dir.child("nested")
        .child("backup.json.tmp")
        .assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 2. Listing
// ---------------------------------------------------------------------------

#[test]
fn list_is_newest_first_and_skips_garbage() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let exports = home.child(".reddit-sync").child("exports");
    exports
        .child("export_20240101_000000.json")
        .write_str(r#"{"source_account":"old","subreddits":["a"]}"#)
        .expect("write");
    exports
        .child("export_20240301_000000.json")
        .write_str(r#"{"source_account":"new","subreddits":["a","b"],"multireddits":[{"name":"m"}]}"#)
        .expect("write");
    exports
        .child("export_20240201_000000.json")
        .write_str("not json")
        .expect("write");
    exports.child("notes.txt").write_str("ignored").expect("write");

    let listed = export::list_at(home.path()).expect("list");
    let owners: Vec<_> = listed.iter().map(|s| s.source_account.as_str()).collect();
    assert_eq!(owners, ["new", "old"]);
    assert_eq!(listed[0].feed_count, 2);
    assert_eq!(listed[0].collection_count, 1);

    let latest = export::latest_at(home.path()).expect("latest").expect("some");
    assert!(latest.ends_with("export_20240301_000000.json"));
    assert!(latest.starts_with(paths::exports_dir(home.path())));
}

// ---------------------------------------------------------------------------
// 3. Errors
// ---------------------------------------------------------------------------

#[test]
fn corrupt_export_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("broken.json");
    file.write_str("{\"subreddits\": [unclosed").expect("write");

    let err = export::load(file.path()).unwrap_err();
    assert!(matches!(err, ExportError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn wrong_shape_returns_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("list.json");
    file.write_str("[1, 2, 3]").expect("write");

    let err = export::load(file.path()).unwrap_err();
    assert!(matches!(err, ExportError::Parse { .. }), "got: {err}");
}

#[test]
fn missing_export_message_names_the_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = export::load(&dir.path().join("gone.json")).unwrap_err();
    assert!(err.to_string().contains("export not found"));
    assert!(err.to_string().contains("gone.json"));
}
