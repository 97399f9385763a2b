use ash_fs::{RobustnessConfig, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".ash").join("group.json");

    io::write_atomic(&path, b"{}", RobustnessConfig::default()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("snapshot.json");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated", RobustnessConfig::default()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("snapshot.json");

    io::write_atomic(&path, b"one", RobustnessConfig::default()).unwrap();
    io::write_atomic(&path, b"two", RobustnessConfig::default()).unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}

#[test]
fn test_read_text_if_exists_missing_is_none() {
    let temp = TempDir::new().unwrap();
    let result = io::read_text_if_exists(&temp.path().join("absent.json")).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_read_text_if_exists_returns_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("present.json");
    fs::write(&path, "{}").unwrap();

    assert_eq!(io::read_text_if_exists(&path).unwrap().as_deref(), Some("{}"));
}

#[test]
fn test_lock_path_is_sibling() {
    let path = std::path::Path::new("/work/.ash/group.json");
    assert_eq!(
        io::lock_path(path),
        std::path::Path::new("/work/.ash/group.json.lock")
    );
}

#[test]
fn test_write_atomic_content_visible_through_assert_fs() {
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    let snapshot = temp.child(".ash/subgroup.json");

    io::write_atomic(
        snapshot.path(),
        b"{\"projects\": []}",
        RobustnessConfig::default(),
    )
    .unwrap();

    snapshot.assert(predicate::path::is_file());
    snapshot.assert(predicate::str::contains("projects"));
    temp.close().unwrap();
}
