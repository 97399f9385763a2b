//! Filesystem side of a sync pass: directory ownership, renames, orphans

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use ash_fs::AshPath;
use ash_remote::Identified;

use crate::diff::Diff;
use crate::orphan;
use crate::report::ItemOutcome;

/// Children that own a directory, plus outcomes for those that cannot.
pub(crate) struct Claims<T> {
    pub owners: Vec<T>,
    pub rejected: Vec<ItemOutcome>,
}

impl<T> Claims<T> {
    pub fn owned_names(&self) -> HashSet<String>
    where
        T: Identified,
    {
        self.owners.iter().map(|c| c.name().to_string()).collect()
    }
}

fn usable_dir_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !AshPath::is_reserved_dir(name)
}

/// Directories are keyed by display name: the first child with a name owns
/// it, later children with the same name are skipped.
pub(crate) fn claim_directories<T: Identified + Clone>(children: &[T]) -> Claims<T> {
    let mut owner_of: HashMap<&str, i64> = HashMap::new();
    let mut owners = Vec::with_capacity(children.len());
    let mut rejected = Vec::new();

    for child in children {
        let name = child.name();
        if !usable_dir_name(name) {
            tracing::warn!(id = child.id(), name, "name cannot be used as a directory");
            let label = if name.is_empty() {
                format!("#{}", child.id())
            } else {
                name.to_string()
            };
            rejected.push(ItemOutcome::skipped(
                label,
                "name cannot be used as a directory name",
            ));
            continue;
        }
        match owner_of.get(name) {
            Some(owner) => {
                tracing::warn!(id = child.id(), name, owner, "duplicate name");
                rejected.push(ItemOutcome::skipped(
                    name,
                    format!("name collides with id {owner}"),
                ));
            }
            None => {
                owner_of.insert(name, child.id());
                owners.push(child.clone());
            }
        }
    }

    Claims { owners, rejected }
}

/// Outcome of trying to follow one rename on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenameNote {
    pub applied: bool,
    pub message: String,
    /// Old directory that still holds the content during a dry run
    pub pending_from: Option<PathBuf>,
}

impl RenameNote {
    fn settled(applied: bool, message: String) -> Self {
        Self {
            applied,
            message,
            pending_from: None,
        }
    }
}

/// Names a scan must still treat as expected: old directories of renames
/// that a dry run only announced.
pub(crate) fn expected_names(
    owners: &HashSet<String>,
    notes: &HashMap<i64, RenameNote>,
) -> HashSet<String> {
    let pending = notes
        .values()
        .filter_map(|n| n.pending_from.as_deref()?.file_name())
        .map(|name| name.to_string_lossy().into_owned());
    owners.iter().cloned().chain(pending).collect()
}

/// Move `old` directories to their new names where possible.
///
/// Nothing happens when the old directory is gone. A failure leaves the
/// directories as they are; the snapshot still records the new name.
pub(crate) fn apply_renames(
    dir: &Path,
    changes: &Diff,
    owners: &HashSet<String>,
    dry_run: bool,
) -> HashMap<i64, RenameNote> {
    let mut notes = HashMap::new();

    for rename in &changes.renamed {
        let (from, to) = (&rename.old.name, &rename.new.name);
        if !usable_dir_name(from) || !owners.contains(to) {
            continue;
        }
        let old_path = dir.join(from);
        let new_path = dir.join(to);
        if !old_path.is_dir() {
            continue;
        }

        let note = if new_path.exists() {
            tracing::warn!(from = %from, to = %to, "rename target already exists");
            RenameNote::settled(false, format!("cannot rename from '{from}': target exists"))
        } else if dry_run {
            RenameNote {
                applied: false,
                message: format!("would rename from '{from}'"),
                pending_from: Some(old_path),
            }
        } else {
            match fs::rename(&old_path, &new_path) {
                Ok(()) => {
                    tracing::info!(from = %from, to = %to, "renamed directory");
                    RenameNote::settled(true, format!("renamed from '{from}'"))
                }
                Err(e) => {
                    tracing::warn!(from = %from, to = %to, error = %e, "rename failed");
                    RenameNote::settled(false, format!("rename from '{from}' failed: {e}"))
                }
            }
        };
        notes.insert(rename.new.id, note);
    }

    notes
}

/// Report or remove orphan directories.
pub(crate) fn resolve_orphans(
    dir: &Path,
    orphans: &[String],
    clean: bool,
    dry_run: bool,
) -> Vec<ItemOutcome> {
    orphans
        .iter()
        .map(|name| {
            if !clean {
                ItemOutcome::skipped(name, "missing on remote, use --clean to remove")
            } else if dry_run {
                ItemOutcome::skipped(name, "missing on remote, would remove")
            } else {
                match orphan::remove(dir, name) {
                    Ok(()) => ItemOutcome::removed(name, "missing on remote, removed"),
                    Err(e) => {
                        tracing::warn!(name = %name, error = %e, "failed to remove orphan");
                        ItemOutcome::error(name, format!("failed to remove: {e}"))
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use crate::report::ItemStatus;
    use ash_remote::NodeIdentity;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn id(id: i64, name: &str) -> NodeIdentity {
        NodeIdentity::new(id, name, name.to_lowercase())
    }

    #[test]
    fn first_name_owner_wins() {
        let claims = claim_directories(&[id(1, "A"), id(2, "A"), id(3, "B")]);
        assert_eq!(claims.owners, vec![id(1, "A"), id(3, "B")]);
        assert_eq!(
            claims.rejected,
            vec![ItemOutcome::skipped("A", "name collides with id 1")]
        );
    }

    #[test]
    fn unusable_names_are_rejected() {
        let claims = claim_directories(&[id(1, ""), id(2, ".ash"), id(3, "a/b")]);
        assert!(claims.owners.is_empty());
        assert_eq!(claims.rejected.len(), 3);
        assert_eq!(claims.rejected[0].name, "#1");
    }

    #[test]
    fn rename_moves_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("Lab1")).unwrap();
        let changes = diff(&[id(7, "Lab1")], &[id(7, "Lab1-renamed")]).unwrap();
        let owners = HashSet::from(["Lab1-renamed".to_string()]);

        let notes = apply_renames(temp.path(), &changes, &owners, false);

        assert!(notes[&7].applied);
        assert!(temp.path().join("Lab1-renamed").is_dir());
        assert!(!temp.path().join("Lab1").exists());
    }

    #[test]
    fn rename_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("old")).unwrap();
        fs::create_dir(temp.path().join("new")).unwrap();
        let changes = diff(&[id(1, "old")], &[id(1, "new")]).unwrap();
        let owners = HashSet::from(["new".to_string()]);

        let notes = apply_renames(temp.path(), &changes, &owners, false);

        assert!(!notes[&1].applied);
        assert!(temp.path().join("old").is_dir());
    }

    #[test]
    fn dry_run_rename_touches_nothing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("old")).unwrap();
        let changes = diff(&[id(1, "old")], &[id(1, "new")]).unwrap();
        let owners = HashSet::from(["new".to_string()]);

        let notes = apply_renames(temp.path(), &changes, &owners, true);

        assert_eq!(notes[&1].message, "would rename from 'old'");
        assert_eq!(notes[&1].pending_from, Some(temp.path().join("old")));
        assert!(temp.path().join("old").is_dir());
        assert_eq!(
            expected_names(&owners, &notes),
            HashSet::from(["new".to_string(), "old".to_string()])
        );
    }

    #[test]
    fn orphans_without_clean_are_kept() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("B")).unwrap();
        let outcomes = resolve_orphans(temp.path(), &["B".to_string()], false, false);
        assert_eq!(outcomes[0].status, ItemStatus::Skipped);
        assert!(outcomes[0].message.contains("use --clean"));
        assert!(temp.path().join("B").exists());
    }

    #[test]
    fn orphans_with_clean_are_removed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("B")).unwrap();
        let outcomes = resolve_orphans(temp.path(), &["B".to_string()], true, false);
        assert_eq!(outcomes[0].status, ItemStatus::Removed);
        assert!(!temp.path().join("B").exists());
    }
}
