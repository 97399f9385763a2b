//! Per-item outcomes of sync and submit runs

use std::fmt;
use std::path::PathBuf;

use ash_remote::NodeIdentity;
use serde::Serialize;

use crate::diff::DiffSummary;

/// What happened to one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Ok,
    New,
    Skipped,
    Removed,
    Error,
}

impl ItemStatus {
    /// Short tag used in tabular output.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::New => "NEW",
            Self::Skipped => "SKIP",
            Self::Removed => "DEL",
            Self::Error => "ERR",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub name: String,
    pub status: ItemStatus,
    pub message: String,
}

impl ItemOutcome {
    pub fn new(name: impl Into<String>, status: ItemStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }

    pub fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ItemStatus::Ok, message)
    }

    pub fn created(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ItemStatus::New, message)
    }

    pub fn skipped(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ItemStatus::Skipped, message)
    }

    pub fn removed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ItemStatus::Removed, message)
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, ItemStatus::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.status == ItemStatus::Error
    }
}

/// Result of synchronizing one managed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeReport {
    pub dir: PathBuf,
    pub node: NodeIdentity,
    pub diff: DiffSummary,
    /// Orphan directory names found in this pass
    pub orphans: Vec<String>,
    /// Sorted by name
    pub outcomes: Vec<ItemOutcome>,
}

impl NodeReport {
    pub fn new(dir: PathBuf, node: NodeIdentity) -> Self {
        Self {
            dir,
            node,
            diff: DiffSummary::default(),
            orphans: Vec::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: ItemOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend(&mut self, outcomes: impl IntoIterator<Item = ItemOutcome>) {
        self.outcomes.extend(outcomes);
    }

    pub(crate) fn finish(mut self) -> Self {
        self.outcomes
            .sort_by(|a, b| a.name.cmp(&b.name).then(a.status.cmp(&b.status)));
        self
    }

    pub fn has_errors(&self) -> bool {
        self.outcomes.iter().any(ItemOutcome::is_error)
    }

    /// Outcome recorded for `name`, if any.
    pub fn outcome(&self, name: &str) -> Option<&ItemOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Number of outcomes per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub ok: usize,
    pub new: usize,
    pub skipped: usize,
    pub removed: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.ok + self.new + self.skipped + self.removed + self.error
    }
}

/// Report of a whole sync run: the entry directory first, then every
/// sub-node that was synchronized, sorted by directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub nodes: Vec<NodeReport>,
}

impl SyncReport {
    pub fn single(node: NodeReport) -> Self {
        Self { nodes: vec![node] }
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.nodes.iter().flat_map(|n| n.outcomes.iter())
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for outcome in self.outcomes() {
            match outcome.status {
                ItemStatus::Ok => counts.ok += 1,
                ItemStatus::New => counts.new += 1,
                ItemStatus::Skipped => counts.skipped += 1,
                ItemStatus::Removed => counts.removed += 1,
                ItemStatus::Error => counts.error += 1,
            }
        }
        counts
    }

    pub fn has_errors(&self) -> bool {
        self.nodes.iter().any(NodeReport::has_errors)
    }

    /// Report of the node synchronized in `dir`.
    pub fn node(&self, dir: &std::path::Path) -> Option<&NodeReport> {
        self.nodes.iter().find(|n| n.dir == dir)
    }
}
