//! Options threaded through a synchronization run

use ash_remote::Protocol;

use crate::{Error, Result};

/// Leaf actions in flight per intermediate node.
pub const DEFAULT_CONCURRENCY: usize = 5;
/// Sub-node synchronizations in flight per root node.
pub const DEFAULT_NODE_CONCURRENCY: usize = 3;

/// Options for sync operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Remove orphan directories instead of only reporting them
    pub clean: bool,
    /// Report what would happen without touching disk or running git
    pub dry_run: bool,
    /// Which clone URL to use for new checkouts and origin updates
    pub protocol: Protocol,
    /// Ceiling for concurrent clone/pull/push actions within one node
    pub concurrency: usize,
    /// Ceiling for concurrent sub-node synchronizations under a root
    pub node_concurrency: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            clean: false,
            dry_run: false,
            protocol: Protocol::default(),
            concurrency: DEFAULT_CONCURRENCY,
            node_concurrency: DEFAULT_NODE_CONCURRENCY,
        }
    }
}

impl SyncOptions {
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(Error::InvalidOptions {
                message: "concurrency must be at least 1".to_string(),
            });
        }
        if self.node_concurrency == 0 {
            return Err(Error::InvalidOptions {
                message: "node concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
