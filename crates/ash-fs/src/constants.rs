//! Names of the files and directories the mirror reserves for itself.

use std::path::Path;

/// Reserved entries inside a managed directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AshPath {
    /// The `.ash` bookkeeping directory
    AshDir,
    /// The `.git` directory of a checkout
    GitDir,
    /// Snapshot of a root node (`group.json`)
    RootSnapshot,
    /// Snapshot of an intermediate node (`subgroup.json`)
    IntermediateSnapshot,
}

impl AshPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AshDir => ".ash",
            Self::GitDir => ".git",
            Self::RootSnapshot => "group.json",
            Self::IntermediateSnapshot => "subgroup.json",
        }
    }

    /// Whether a directory entry with this name belongs to the engine or the
    /// VCS rather than to the mirrored tree.
    pub fn is_reserved_dir(name: &str) -> bool {
        name == Self::AshDir.as_str() || name == Self::GitDir.as_str()
    }

    /// Full path of a snapshot file inside `dir`.
    pub fn snapshot_in(self, dir: &Path) -> std::path::PathBuf {
        dir.join(Self::AshDir.as_str()).join(self.as_str())
    }
}

impl AsRef<Path> for AshPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for AshPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for AshPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
