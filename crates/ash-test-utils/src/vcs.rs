//! Recording [`VcsExecutor`] for engine tests.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ash_git::{Error, PullOutcome, Result, VcsExecutor};

/// One call received by [`FakeVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Clone { url: String, dest: PathBuf },
    Pull { dest: PathBuf },
    SetRemoteUrl { dest: PathBuf, url: String },
    CommitAndPush { dest: PathBuf, message: String },
}

/// Pretends to run git: clones create a directory with a `.git` marker,
/// pulls and pushes succeed unless the checkout's name was marked failing.
///
/// Every call sleeps for the configured delay while counted as in flight,
/// so tests can observe the peak concurrency the caller allowed.
#[derive(Default)]
pub struct FakeVcs {
    calls: Mutex<Vec<VcsCall>>,
    failing: Mutex<HashSet<String>>,
    dirty: Mutex<HashSet<String>>,
    panicking: Mutex<HashSet<String>>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

fn key(dest: &Path) -> String {
    dest.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls against a checkout named `name` fail.
    pub fn fail_on(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    /// Calls against a checkout named `name` panic.
    pub fn panic_on(&self, name: &str) {
        self.panicking.lock().unwrap().insert(name.to_string());
    }

    /// The checkout named `name` reports uncommitted changes.
    pub fn mark_dirty(&self, name: &str) {
        self.dirty.lock().unwrap().insert(name.to_string());
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clone_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VcsCall::Clone { .. }))
            .count()
    }

    pub fn pull_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, VcsCall::Pull { .. }))
            .count()
    }

    /// Highest number of calls observed running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn enter(&self, call: VcsCall, dest: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let name = key(dest);
        if self.panicking.lock().unwrap().contains(&name) {
            panic!("FakeVcs: scripted panic for {name}");
        }
        if self.failing.lock().unwrap().contains(&name) {
            return Err(Error::PullFailed {
                message: format!("scripted failure for {name}"),
            });
        }
        Ok(())
    }
}

impl VcsExecutor for FakeVcs {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.enter(
            VcsCall::Clone {
                url: url.to_string(),
                dest: dest.to_path_buf(),
            },
            dest,
        )?;
        fs::create_dir_all(dest.join(".git")).map_err(|e| Error::CloneFailed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn pull(&self, dest: &Path) -> Result<PullOutcome> {
        self.enter(
            VcsCall::Pull {
                dest: dest.to_path_buf(),
            },
            dest,
        )?;
        Ok(PullOutcome::UpToDate)
    }

    fn set_remote_url(&self, dest: &Path, url: &str) -> Result<()> {
        self.calls.lock().unwrap().push(VcsCall::SetRemoteUrl {
            dest: dest.to_path_buf(),
            url: url.to_string(),
        });
        Ok(())
    }

    fn is_repository(&self, dest: &Path) -> bool {
        dest.join(".git").exists()
    }

    fn has_changes(&self, dest: &Path) -> Result<bool> {
        Ok(self.dirty.lock().unwrap().contains(&key(dest)))
    }

    fn commit_and_push(&self, dest: &Path, message: &str) -> Result<()> {
        self.enter(
            VcsCall::CommitAndPush {
                dest: dest.to_path_buf(),
                message: message.to_string(),
            },
            dest,
        )
    }
}
