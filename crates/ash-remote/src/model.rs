//! Identities of the nodes in the remote tree

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable identity of a remote node.
///
/// `id` never changes and is never reused. `name` is the display label and
/// doubles as the local directory name. `slug` is the URL-safe path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub id: i64,
    #[serde(rename = "path", default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

impl NodeIdentity {
    pub fn new(id: i64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
        }
    }

    /// Whether the display fields still need to be filled in from the remote.
    pub fn is_incomplete(&self) -> bool {
        self.name.is_empty() || self.slug.is_empty()
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

/// Anything that carries a [`NodeIdentity`].
pub trait Identified {
    fn identity(&self) -> &NodeIdentity;

    fn id(&self) -> i64 {
        self.identity().id
    }

    fn name(&self) -> &str {
        &self.identity().name
    }
}

impl Identified for NodeIdentity {
    fn identity(&self) -> &NodeIdentity {
        self
    }
}

/// An intermediate grouping level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubNode {
    pub identity: NodeIdentity,
    /// Set when the forge has scheduled the node for deletion
    pub marked_for_deletion_on: Option<String>,
}

impl SubNode {
    pub fn new(identity: NodeIdentity) -> Self {
        Self {
            identity,
            marked_for_deletion_on: None,
        }
    }

    pub fn is_soft_deleted(&self) -> bool {
        self.marked_for_deletion_on
            .as_deref()
            .is_some_and(|date| !date.is_empty())
    }
}

impl Identified for SubNode {
    fn identity(&self) -> &NodeIdentity {
        &self.identity
    }
}

/// Transport used for clone URLs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    Ssh,
    #[default]
    Https,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(Self::Ssh),
            "https" | "http" => Ok(Self::Https),
            other => Err(format!("unknown protocol '{other}' (expected ssh or https)")),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => f.write_str("ssh"),
            Self::Https => f.write_str("https"),
        }
    }
}

/// The two transport variants a leaf can be cloned from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneUrls {
    pub ssh: String,
    pub https: String,
}

impl CloneUrls {
    pub fn select(&self, protocol: Protocol) -> &str {
        match protocol {
            Protocol::Ssh => &self.ssh,
            Protocol::Https => &self.https,
        }
    }
}

/// A node that maps to exactly one local working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafResource {
    pub identity: NodeIdentity,
    pub clone_urls: CloneUrls,
}

impl LeafResource {
    pub fn new(identity: NodeIdentity, clone_urls: CloneUrls) -> Self {
        Self {
            identity,
            clone_urls,
        }
    }

    pub fn clone_url(&self, protocol: Protocol) -> &str {
        self.clone_urls.select(protocol)
    }
}

impl Identified for LeafResource {
    fn identity(&self) -> &NodeIdentity {
        &self.identity
    }
}
