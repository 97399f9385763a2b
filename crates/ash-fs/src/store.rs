//! JSON document loading and saving

use std::path::Path;

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result, io};

/// Store for the JSON bookkeeping documents.
///
/// Documents are written pretty-printed with a two-space indent and no
/// trailing newline, always through [`io::write_atomic`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentStore {
    robustness: io::RobustnessConfig,
}

impl DocumentStore {
    /// Create a new DocumentStore with default robustness settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new DocumentStore with custom robustness settings.
    pub fn with_robustness(robustness: io::RobustnessConfig) -> Self {
        Self { robustness }
    }

    /// Load a document, returning `None` when the file does not exist.
    pub fn load_optional<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let Some(content) = io::read_text_if_exists(path)? else {
            return Ok(None);
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Save a document atomically.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value).map_err(|e| Error::Serialize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        io::write_atomic(path, content.as_bytes(), self.robustness)
    }
}
