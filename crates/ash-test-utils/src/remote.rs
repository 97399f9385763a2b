//! In-memory [`RemoteTree`] for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ash_remote::{
    CloneUrls, Error, LeafResource, NodeIdentity, RemoteTree, Result, SubNode,
};

#[derive(Default)]
struct Tree {
    nodes: HashMap<i64, NodeIdentity>,
    sub_nodes: HashMap<i64, Vec<SubNode>>,
    leaves: HashMap<i64, Vec<LeafResource>>,
    failing: HashSet<i64>,
}

/// A remote tree whose contents and failures are set by the test.
///
/// Nodes without configured children answer with an empty listing, exactly
/// like a real group without sub-groups or projects.
#[derive(Default)]
pub struct FakeRemote {
    tree: Mutex<Tree>,
    fetches: AtomicUsize,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `identity` so [`RemoteTree::describe_node`] can answer for it.
    pub fn set_node(&self, identity: NodeIdentity) {
        self.tree.lock().unwrap().nodes.insert(identity.id, identity);
    }

    pub fn set_sub_nodes(&self, parent: i64, children: Vec<SubNode>) {
        let mut tree = self.tree.lock().unwrap();
        for child in &children {
            tree.nodes.insert(child.identity.id, child.identity.clone());
        }
        tree.sub_nodes.insert(parent, children);
    }

    pub fn set_leaves(&self, parent: i64, children: Vec<LeafResource>) {
        self.tree.lock().unwrap().leaves.insert(parent, children);
    }

    /// Every request about `node_id` fails with a transient transport error.
    pub fn fail_node(&self, node_id: i64) {
        self.tree.lock().unwrap().failing.insert(node_id);
    }

    pub fn heal_node(&self, node_id: i64) {
        self.tree.lock().unwrap().failing.remove(&node_id);
    }

    /// Number of listing requests served or refused so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self, tree: &Tree, node_id: i64, request: &str) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if tree.failing.contains(&node_id) {
            return Err(Error::Transport {
                request: format!("groups/{node_id}/{request}"),
                status: "exit status: 1".to_string(),
                message: "connection reset by peer".to_string(),
            });
        }
        Ok(())
    }
}

impl RemoteTree for FakeRemote {
    fn list_child_sub_nodes(&self, node_id: i64) -> Result<Vec<SubNode>> {
        let tree = self.tree.lock().unwrap();
        self.check(&tree, node_id, "subgroups")?;
        Ok(tree.sub_nodes.get(&node_id).cloned().unwrap_or_default())
    }

    fn list_child_leaf_resources(&self, node_id: i64) -> Result<Vec<LeafResource>> {
        let tree = self.tree.lock().unwrap();
        self.check(&tree, node_id, "projects")?;
        Ok(tree.leaves.get(&node_id).cloned().unwrap_or_default())
    }

    fn describe_node(&self, node_id: i64) -> Result<NodeIdentity> {
        let tree = self.tree.lock().unwrap();
        self.check(&tree, node_id, "")?;
        tree.nodes.get(&node_id).cloned().ok_or_else(|| Error::Transport {
            request: format!("groups/{node_id}"),
            status: "exit status: 1".to_string(),
            message: "404 Not Found".to_string(),
        })
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Sub-node with a slug derived from its name.
pub fn sub_node(id: i64, name: &str) -> SubNode {
    SubNode::new(NodeIdentity::new(id, name, slug(name)))
}

/// Leaf whose ssh and https URLs both point at `url`.
pub fn leaf(id: i64, name: &str, url: &str) -> LeafResource {
    LeafResource::new(
        NodeIdentity::new(id, name, slug(name)),
        CloneUrls {
            ssh: url.to_string(),
            https: url.to_string(),
        },
    )
}

/// Leaf with distinct, recognisable ssh and https URLs.
pub fn leaf_with_urls(id: i64, name: &str) -> LeafResource {
    LeafResource::new(
        NodeIdentity::new(id, name, slug(name)),
        CloneUrls {
            ssh: format!("git@forge.test:group/{}.git", slug(name)),
            https: format!("https://forge.test/group/{}.git", slug(name)),
        },
    )
}
