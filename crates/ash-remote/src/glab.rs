//! [`RemoteTree`] over the `glab` CLI
//!
//! `glab api --paginate` prints one JSON array per page back to back, so
//! responses are decoded as a stream of arrays and flattened.

use std::process::Command;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{CloneUrls, Error, LeafResource, NodeIdentity, RemoteTree, Result, SubNode};

#[derive(Debug, Deserialize)]
struct GroupWire {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    marked_for_deletion_on: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectWire {
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    path: String,
    #[serde(default)]
    ssh_url_to_repo: String,
    #[serde(default)]
    http_url_to_repo: String,
}

impl From<GroupWire> for SubNode {
    fn from(wire: GroupWire) -> Self {
        SubNode {
            identity: NodeIdentity::new(wire.id, wire.name, wire.path),
            marked_for_deletion_on: wire.marked_for_deletion_on,
        }
    }
}

impl From<ProjectWire> for LeafResource {
    fn from(wire: ProjectWire) -> Self {
        LeafResource::new(
            NodeIdentity::new(wire.id, wire.name, wire.path),
            CloneUrls {
                ssh: wire.ssh_url_to_repo,
                https: wire.http_url_to_repo,
            },
        )
    }
}

/// Talks to the forge through an already-authenticated `glab` binary.
#[derive(Debug, Clone)]
pub struct GlabRemote {
    program: String,
    hostname: Option<String>,
}

impl Default for GlabRemote {
    fn default() -> Self {
        Self {
            program: "glab".to_string(),
            hostname: None,
        }
    }
}

impl GlabRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable (a wrapper script, an absolute path).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Target a specific forge host instead of glab's default.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    fn api(&self, request: &str, paginate: bool) -> Result<Vec<u8>> {
        let mut command = Command::new(&self.program);
        command.arg("api").arg(request);
        if paginate {
            command.arg("--paginate");
        }
        if let Some(hostname) = &self.hostname {
            command.arg("--hostname").arg(hostname);
        }

        tracing::debug!(program = %self.program, request, "remote request");
        let output = command.output().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(Error::Transport {
                request: request.to_string(),
                status: output.status.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}

/// Decode a paginated body made of zero or more concatenated JSON arrays.
///
/// A body with no pages at all is rejected: a successful listing always
/// contains at least `[]`.
pub fn decode_pages<T: DeserializeOwned>(request: &str, body: &[u8]) -> Result<Vec<T>> {
    let decode_error = |message: String| Error::Decode {
        request: request.to_string(),
        message,
    };

    let mut items = Vec::new();
    let mut pages = 0usize;
    for page in serde_json::Deserializer::from_slice(body).into_iter::<Vec<T>>() {
        items.extend(page.map_err(|e| decode_error(e.to_string()))?);
        pages += 1;
    }

    if pages == 0 {
        return Err(decode_error("empty response body".to_string()));
    }
    Ok(items)
}

impl RemoteTree for GlabRemote {
    fn list_child_sub_nodes(&self, node_id: i64) -> Result<Vec<SubNode>> {
        let request = format!("groups/{node_id}/subgroups?per_page=100");
        let body = self.api(&request, true)?;
        let groups: Vec<GroupWire> = decode_pages(&request, &body)?;
        Ok(groups.into_iter().map(SubNode::from).collect())
    }

    fn list_child_leaf_resources(&self, node_id: i64) -> Result<Vec<LeafResource>> {
        let request = format!("groups/{node_id}/projects?per_page=100&simple=true");
        let body = self.api(&request, true)?;
        let projects: Vec<ProjectWire> = decode_pages(&request, &body)?;
        Ok(projects.into_iter().map(LeafResource::from).collect())
    }

    fn describe_node(&self, node_id: i64) -> Result<NodeIdentity> {
        let request = format!("groups/{node_id}");
        let body = self.api(&request, false)?;
        let group: GroupWire = serde_json::from_slice(&body).map_err(|e| Error::Decode {
            request: request.clone(),
            message: e.to_string(),
        })?;
        Ok(NodeIdentity::new(group.id, group.name, group.path))
    }
}
