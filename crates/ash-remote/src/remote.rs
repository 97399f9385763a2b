//! The read-only view of the remote tree consumed by the sync engine

use std::sync::Arc;

use crate::{LeafResource, NodeIdentity, Result, SubNode};

/// Lists the children of a remote node.
///
/// Implementations are blocking and idempotent. A node without children is
/// `Ok(vec![])`; any failure to obtain the listing is an `Err` and must never
/// be collapsed into an empty result.
pub trait RemoteTree: Send + Sync {
    /// Direct sub-nodes of `node_id`, all pages concatenated.
    fn list_child_sub_nodes(&self, node_id: i64) -> Result<Vec<SubNode>>;

    /// Direct leaf resources of `node_id`, all pages concatenated.
    fn list_child_leaf_resources(&self, node_id: i64) -> Result<Vec<LeafResource>>;

    /// Identity of `node_id` itself.
    fn describe_node(&self, node_id: i64) -> Result<NodeIdentity>;
}

impl<T: RemoteTree + ?Sized> RemoteTree for Arc<T> {
    fn list_child_sub_nodes(&self, node_id: i64) -> Result<Vec<SubNode>> {
        (**self).list_child_sub_nodes(node_id)
    }

    fn list_child_leaf_resources(&self, node_id: i64) -> Result<Vec<LeafResource>> {
        (**self).list_child_leaf_resources(node_id)
    }

    fn describe_node(&self, node_id: i64) -> Result<NodeIdentity> {
        (**self).describe_node(node_id)
    }
}
