//! Metadata Store: the `.ash` snapshot files of managed directories
//!
//! A root directory carries `.ash/group.json` listing its sub-groups, an
//! intermediate directory carries `.ash/subgroup.json` listing its projects.
//! Both are replaced wholesale on every sync and written through
//! [`DocumentStore`], so a crash mid-write leaves the previous file intact.

use std::path::{Path, PathBuf};

use ash_fs::{AshPath, DocumentStore};
use ash_remote::NodeIdentity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<NodeIdentity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<NodeIdentity>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Common shape of the two snapshot files.
pub trait Snapshot: Serialize + DeserializeOwned {
    /// File name inside `.ash/`
    const FILE: AshPath;

    /// A snapshot for a freshly scaffolded directory.
    fn empty(node: NodeIdentity) -> Self;

    fn node(&self) -> &NodeIdentity;

    fn node_mut(&mut self) -> &mut NodeIdentity;

    fn children(&self) -> &[NodeIdentity];

    fn path_in(dir: &Path) -> PathBuf {
        Self::FILE.snapshot_in(dir)
    }
}

/// `.ash/group.json`: a root node and its sub-groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootSnapshot {
    #[serde(rename = "group")]
    pub node: NodeIdentity,
    #[serde(rename = "subgroup", default, deserialize_with = "null_as_empty")]
    pub children: Vec<NodeIdentity>,
}

impl Snapshot for RootSnapshot {
    const FILE: AshPath = AshPath::RootSnapshot;

    fn empty(node: NodeIdentity) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    fn node(&self) -> &NodeIdentity {
        &self.node
    }

    fn node_mut(&mut self) -> &mut NodeIdentity {
        &mut self.node
    }

    fn children(&self) -> &[NodeIdentity] {
        &self.children
    }
}

/// `.ash/subgroup.json`: an intermediate node and its projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateSnapshot {
    #[serde(rename = "group")]
    pub node: NodeIdentity,
    #[serde(rename = "projects", default, deserialize_with = "null_as_empty")]
    pub children: Vec<NodeIdentity>,
}

impl Snapshot for IntermediateSnapshot {
    const FILE: AshPath = AshPath::IntermediateSnapshot;

    fn empty(node: NodeIdentity) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    fn node(&self) -> &NodeIdentity {
        &self.node
    }

    fn node_mut(&mut self) -> &mut NodeIdentity {
        &mut self.node
    }

    fn children(&self) -> &[NodeIdentity] {
        &self.children
    }
}

/// Which snapshot a managed directory carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Root,
    Intermediate,
}

/// Reads and writes snapshot files.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataStore {
    store: DocumentStore,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Which snapshot `dir` holds, if any.
    ///
    /// # Errors
    ///
    /// [`Error::AmbiguousMetadata`] when both files are present; the caller
    /// must not pick one.
    pub fn kind(&self, dir: &Path) -> Result<Option<SnapshotKind>> {
        let root = RootSnapshot::path_in(dir).is_file();
        let intermediate = IntermediateSnapshot::path_in(dir).is_file();
        match (root, intermediate) {
            (true, true) => Err(Error::AmbiguousMetadata {
                dir: dir.to_path_buf(),
            }),
            (true, false) => Ok(Some(SnapshotKind::Root)),
            (false, true) => Ok(Some(SnapshotKind::Intermediate)),
            (false, false) => Ok(None),
        }
    }

    /// Load the snapshot of `dir`; `None` means the directory was never synced.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptMetadata`] when the file exists but does not parse or
    /// names no node.
    pub fn load<S: Snapshot>(&self, dir: &Path) -> Result<Option<S>> {
        let path = S::path_in(dir);
        let snapshot: Option<S> = self.store.load_optional(&path).map_err(|e| match e {
            ash_fs::Error::Parse { path, message, .. } => Error::CorruptMetadata { path, message },
            other => Error::Fs(other),
        })?;

        if let Some(snapshot) = &snapshot
            && snapshot.node().id == 0
        {
            return Err(Error::CorruptMetadata {
                path,
                message: "group id is missing or 0".to_string(),
            });
        }
        Ok(snapshot)
    }

    /// Replace the snapshot of `dir`, creating `.ash/` when needed.
    pub fn save<S: Snapshot>(&self, dir: &Path, snapshot: &S) -> Result<()> {
        let path = S::path_in(dir);
        tracing::debug!(path = %path.display(), children = snapshot.children().len(), "saving snapshot");
        self.store.save(&path, snapshot)?;
        Ok(())
    }
}
