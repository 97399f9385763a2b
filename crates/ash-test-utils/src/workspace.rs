//! [`TestWorkspace`] builder for managed-directory scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

/// A temporary directory laid out the way `ash` lays out a workspace.
///
/// Snapshots are written as raw JSON so tests exercise the on-disk format
/// rather than the types that read it.
///
/// # Example
///
/// ```rust,no_run
/// use ash_test_utils::workspace::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_root_snapshot(".", (10, "Course"), &[(1, "A"), (2, "B")]);
/// ws.mkdir("A");
/// ws.assert_dir_exists("A");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn entries(children: &[(i64, &str)]) -> Vec<Value> {
    children
        .iter()
        .map(|(id, name)| json!({ "id": id, "path": name.to_lowercase(), "name": name }))
        .collect()
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the workspace.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read_file(&self, rel: &str) -> String {
        let path = self.path(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read file {}: {e}", path.display()))
    }

    /// Write `.ash/group.json` in `dir` with the given self identity and
    /// sub-node children.
    pub fn write_root_snapshot(&self, dir: &str, node: (i64, &str), children: &[(i64, &str)]) {
        let doc = json!({
            "group": { "id": node.0, "path": node.1.to_lowercase(), "name": node.1 },
            "subgroup": entries(children),
        });
        self.write_file(
            &format!("{dir}/.ash/group.json"),
            &serde_json::to_string_pretty(&doc).unwrap(),
        );
    }

    /// Write `.ash/subgroup.json` in `dir` with the given self identity and
    /// leaf children.
    pub fn write_intermediate_snapshot(
        &self,
        dir: &str,
        node: (i64, &str),
        children: &[(i64, &str)],
    ) {
        let doc = json!({
            "group": { "id": node.0, "path": node.1.to_lowercase(), "name": node.1 },
            "projects": entries(children),
        });
        self.write_file(
            &format!("{dir}/.ash/subgroup.json"),
            &serde_json::to_string_pretty(&doc).unwrap(),
        );
    }

    /// Parse the JSON document at `rel`.
    pub fn read_json(&self, rel: &str) -> Value {
        serde_json::from_str(&self.read_file(rel)).unwrap()
    }

    /// `(id, name)` pairs listed under `key` in the JSON document at `rel`.
    pub fn snapshot_children(&self, rel: &str, key: &str) -> Vec<(i64, String)> {
        self.read_json(rel)[key]
            .as_array()
            .cloned()
            .unwrap_or_default()
            .iter()
            .map(|v| {
                (
                    v["id"].as_i64().unwrap(),
                    v["name"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    /// # Panics
    /// Panics with a descriptive message if the directory does not exist.
    pub fn assert_dir_exists(&self, rel: &str) {
        let path = self.path(rel);
        assert!(path.is_dir(), "Expected directory to exist: {}", path.display());
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, rel: &str) {
        let path = self.path(rel);
        assert!(!path.exists(), "Expected path NOT to exist: {}", path.display());
    }
}
