//! Diff Engine: classify fetched children against the last snapshot
//!
//! Matching is by id only. A name that reappears under a different id is an
//! unrelated add and remove, never a rename.

use std::collections::{HashMap, HashSet};

use ash_remote::NodeIdentity;
use serde::Serialize;

use crate::{Error, Result};

/// An id whose display name changed between snapshot and fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub old: NodeIdentity,
    pub new: NodeIdentity,
}

/// Classification of one level of children.
///
/// `added`, `unchanged` and `renamed` follow the fetched order; `removed`
/// follows the snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    pub added: Vec<NodeIdentity>,
    pub removed: Vec<NodeIdentity>,
    pub renamed: Vec<Renamed>,
    pub unchanged: Vec<NodeIdentity>,
}

/// Counts of a [`Diff`], kept in reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub renamed: usize,
    pub unchanged: usize,
}

impl Diff {
    /// True when nothing was added, removed or renamed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.renamed.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            added: self.added.len(),
            removed: self.removed.len(),
            renamed: self.renamed.len(),
            unchanged: self.unchanged.len(),
        }
    }

    /// Previous name of `id` if it was renamed.
    pub fn renamed_from(&self, id: i64) -> Option<&str> {
        self.renamed
            .iter()
            .find(|r| r.new.id == id)
            .map(|r| r.old.name.as_str())
    }
}

/// Compare the snapshot's children with a fresh fetch.
///
/// # Errors
///
/// [`Error::InconsistentRemoteState`] when `new` lists an id twice. A snapshot
/// with duplicate ids is tolerated; its first entry wins.
pub fn diff(old: &[NodeIdentity], new: &[NodeIdentity]) -> Result<Diff> {
    let mut seen = HashSet::with_capacity(new.len());
    for item in new {
        if !seen.insert(item.id) {
            return Err(Error::InconsistentRemoteState { id: item.id });
        }
    }

    let mut old_by_id: HashMap<i64, &NodeIdentity> = HashMap::with_capacity(old.len());
    for item in old {
        old_by_id.entry(item.id).or_insert(item);
    }

    let mut result = Diff::default();
    for item in new {
        match old_by_id.get(&item.id) {
            None => result.added.push(item.clone()),
            Some(previous) if previous.name != item.name => result.renamed.push(Renamed {
                old: (*previous).clone(),
                new: item.clone(),
            }),
            Some(_) => result.unchanged.push(item.clone()),
        }
    }

    let mut reported = HashSet::new();
    for item in old {
        if !seen.contains(&item.id) && reported.insert(item.id) {
            result.removed.push(item.clone());
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(id: i64, name: &str) -> NodeIdentity {
        NodeIdentity::new(id, name, name.to_lowercase())
    }

    #[test]
    fn first_sync_adds_everything() {
        let new = vec![id(1, "A"), id(2, "B")];
        let d = diff(&[], &new).unwrap();
        assert_eq!(d.added, new);
        assert!(d.removed.is_empty());
        assert_eq!(d.summary().added, 2);
    }

    #[test]
    fn added_and_unchanged() {
        let d = diff(&[id(1, "A")], &[id(1, "A"), id(2, "B")]).unwrap();
        assert_eq!(d.added, vec![id(2, "B")]);
        assert_eq!(d.unchanged, vec![id(1, "A")]);
        assert!(d.removed.is_empty());
        assert!(d.renamed.is_empty());
    }

    #[test]
    fn removed_keeps_snapshot_entry() {
        let d = diff(&[id(1, "A"), id(2, "B")], &[id(1, "A")]).unwrap();
        assert_eq!(d.removed, vec![id(2, "B")]);
    }

    #[test]
    fn same_id_new_name_is_rename() {
        let d = diff(&[id(7, "Lab1")], &[id(7, "Lab1-renamed")]).unwrap();
        assert_eq!(
            d.renamed,
            vec![Renamed {
                old: id(7, "Lab1"),
                new: id(7, "Lab1-renamed"),
            }]
        );
        assert_eq!(d.renamed_from(7), Some("Lab1"));
    }

    #[test]
    fn same_name_new_id_is_add_and_remove() {
        let d = diff(&[id(1, "A")], &[id(9, "A")]).unwrap();
        assert_eq!(d.added, vec![id(9, "A")]);
        assert_eq!(d.removed, vec![id(1, "A")]);
        assert!(d.renamed.is_empty());
    }

    #[test]
    fn duplicate_fetched_ids_fail() {
        let err = diff(&[], &[id(3, "X"), id(3, "Y")]).unwrap_err();
        assert!(matches!(err, Error::InconsistentRemoteState { id: 3 }));
    }

    #[test]
    fn duplicate_snapshot_ids_first_wins() {
        let d = diff(&[id(1, "A"), id(1, "Old")], &[]).unwrap();
        assert_eq!(d.removed, vec![id(1, "A")]);
    }

    #[test]
    fn identical_lists_are_empty_diff() {
        let items = vec![id(1, "A"), id(2, "B")];
        assert!(diff(&items, &items).unwrap().is_empty());
    }
}
