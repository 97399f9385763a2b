//! Orphan Scanner: local directories the remote no longer lists
//!
//! Always compares the current directory listing against the freshly fetched
//! names, never against the previous snapshot.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use ash_fs::AshPath;

use crate::{Error, Result};

/// Immediate subdirectories of `dir` whose names are not in `expected`.
///
/// The `.ash` and `.git` directories and plain files are never orphans. A
/// missing `dir` has no orphans. The result is sorted.
pub fn scan(dir: &Path, expected: &HashSet<String>) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut orphans = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if AshPath::is_reserved_dir(&name) || expected.contains(&name) {
            continue;
        }
        orphans.push(name);
    }
    orphans.sort();
    Ok(orphans)
}

/// Delete one orphan directory and everything below it.
pub fn remove(dir: &Path, name: &str) -> Result<()> {
    let path = dir.join(name);
    tracing::info!(path = %path.display(), "removing orphan");
    fs::remove_dir_all(&path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn expected(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn reports_unlisted_directories_only() {
        let temp = TempDir::new().unwrap();
        for name in ["A", "B", "stale", ".ash", ".git"] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }
        fs::write(temp.path().join("notes.txt"), "keep").unwrap();

        let orphans = scan(temp.path(), &expected(&["A", "B"])).unwrap();
        assert_eq!(orphans, vec!["stale".to_string()]);
    }

    #[test]
    fn bookkeeping_dir_is_never_an_orphan() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(".ash")).unwrap();
        assert!(scan(temp.path(), &HashSet::new()).unwrap().is_empty());
    }

    #[test]
    fn missing_dir_has_no_orphans() {
        let temp = TempDir::new().unwrap();
        let orphans = scan(&temp.path().join("nope"), &HashSet::new()).unwrap();
        assert!(orphans.is_empty());
    }

    #[test]
    fn orphans_are_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            fs::create_dir(temp.path().join(name)).unwrap();
        }
        assert_eq!(
            scan(temp.path(), &HashSet::new()).unwrap(),
            vec!["alpha", "mid", "zeta"]
        );
    }

    #[test]
    fn remove_deletes_tree() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("old/deep")).unwrap();
        remove(temp.path(), "old").unwrap();
        assert!(!temp.path().join("old").exists());
    }
}
