//! Atomic I/O operations with file locking

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, Result};

/// Tuning for [`write_atomic`].
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long to keep retrying the advisory lock before giving up
    pub lock_timeout: Duration,
    /// Whether to fsync the temp file before renaming it into place
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

/// Path of the advisory lock guarding `path`.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so a reader sees either the previous
/// content or the new content, never a truncated file. Writers to the same
/// path are serialized through a sibling `.lock` file.
pub fn write_atomic(path: &Path, content: &[u8], config: RobustnessConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let lock = acquire_lock(path, config.lock_timeout)?;

    // Same directory as the target so the rename never crosses filesystems
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        uuid::Uuid::new_v4().simple()
    );
    let temp_path = path.with_file_name(&temp_name);

    let written = write_temp(&temp_path, content, config.enable_fsync)
        .and_then(|()| fs::rename(&temp_path, path).map_err(|e| Error::io(path, e)));

    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    let _ = FileExt::unlock(&lock);
    written
}

fn write_temp(temp_path: &Path, content: &[u8], fsync: bool) -> Result<()> {
    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    if fsync {
        temp_file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    }
    Ok(())
}

fn acquire_lock(path: &Path, timeout: Duration) -> Result<File> {
    let lock_path = lock_path(path);
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;

    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(250),
        max_elapsed_time: Some(timeout),
        ..ExponentialBackoff::default()
    };

    backoff::retry(policy, || {
        lock_file
            .try_lock_exclusive()
            .map_err(backoff::Error::transient)
    })
    .map_err(|_| {
        tracing::warn!(path = %path.display(), "timed out waiting for write lock");
        Error::LockFailed {
            path: path.to_path_buf(),
        }
    })?;

    Ok(lock_file)
}

/// Read text content, treating a missing file as `None`.
pub fn read_text_if_exists(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}
