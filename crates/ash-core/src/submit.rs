//! Submission flow: commit and push the working copies of one sub-group
//!
//! Runs from an intermediate directory over the projects its snapshot lists,
//! through the same bounded executor the sync uses.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use ash_git::VcsExecutor;
use ash_remote::NodeIdentity;
use regex::Regex;

use crate::executor::{BatchItem, BoundedExecutor};
use crate::metadata::{IntermediateSnapshot, MetadataStore, SnapshotKind};
use crate::report::{ItemOutcome, NodeReport};
use crate::sync::{blocking, claim_leaf_directories};
use crate::{ActionError, Error, Result};

static TRAILING_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)$").expect("Invalid trailing digits regex"));

/// Digits at the end of `name`, ignoring surrounding whitespace.
pub fn trailing_digits(name: &str) -> Option<&str> {
    TRAILING_DIGITS
        .captures(name.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Replace every `#` in `template` with the trailing digits of `name`.
pub fn render_message(template: &str, name: &str) -> String {
    template.replace('#', trailing_digits(name).unwrap_or_default())
}

/// Which projects to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    /// Projects whose trailing number is in the list
    Numbers(BTreeSet<u64>),
    /// Projects picked by name
    Names(Vec<String>),
}

impl Selection {
    /// Parse a comma separated number list such as `3,5,7`.
    ///
    /// Parts that are not numbers are ignored; a list with no number at all
    /// is rejected.
    pub fn parse_numbers(list: &str) -> Result<Self> {
        let numbers: BTreeSet<u64> = list
            .split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect();
        if numbers.is_empty() {
            return Err(Error::InvalidSubmission {
                message: format!("no valid numbers in '{list}' (example: 1,3,5)"),
            });
        }
        Ok(Self::Numbers(numbers))
    }

    fn matches(&self, project: &NodeIdentity) -> bool {
        match self {
            Self::All => true,
            Self::Numbers(numbers) => trailing_digits(&project.name)
                .and_then(|d| d.parse::<u64>().ok())
                .is_some_and(|n| numbers.contains(&n)),
            Self::Names(names) => names.iter().any(|n| *n == project.name),
        }
    }
}

struct SubmitJob {
    name: String,
    dest: PathBuf,
    message: String,
}

impl BatchItem for SubmitJob {
    fn label(&self) -> String {
        self.name.clone()
    }
}

async fn submit_one(vcs: Arc<dyn VcsExecutor>, job: SubmitJob) -> std::result::Result<ItemOutcome, ActionError> {
    if !job.dest.exists() {
        return Ok(ItemOutcome::skipped(&job.name, "not cloned"));
    }
    if !vcs.is_repository(&job.dest) {
        return Ok(ItemOutcome::skipped(&job.name, "not a git repository"));
    }

    let (check, dest) = (Arc::clone(&vcs), job.dest.clone());
    if !blocking(move || check.has_changes(&dest)).await? {
        return Ok(ItemOutcome::skipped(&job.name, "no changes"));
    }

    tracing::info!(name = %job.name, message = %job.message, "submitting");
    let (dest, message) = (job.dest.clone(), job.message.clone());
    blocking(move || vcs.commit_and_push(&dest, &message)).await?;
    Ok(ItemOutcome::ok(&job.name, format!("submitted: {}", job.message)))
}

/// Commits and pushes selected working copies of a sub-group.
#[derive(Clone)]
pub struct Submitter {
    vcs: Arc<dyn VcsExecutor>,
    metadata: MetadataStore,
    concurrency: usize,
}

impl Submitter {
    pub fn new(vcs: Arc<dyn VcsExecutor>, concurrency: usize) -> Result<Self> {
        BoundedExecutor::new(concurrency)?;
        Ok(Self {
            vcs,
            metadata: MetadataStore::new(),
            concurrency,
        })
    }

    fn snapshot(&self, dir: &Path) -> Result<IntermediateSnapshot> {
        match self.metadata.kind(dir)? {
            Some(SnapshotKind::Intermediate) => {
                self.metadata.load(dir)?.ok_or_else(|| Error::NotManaged {
                    dir: dir.to_path_buf(),
                })
            }
            Some(SnapshotKind::Root) => Err(Error::InvalidSubmission {
                message: format!(
                    "{} is a group directory, run submit inside a sub-group",
                    dir.display()
                ),
            }),
            None => Err(Error::NotManaged {
                dir: dir.to_path_buf(),
            }),
        }
    }

    /// Projects that can be offered for selection, in snapshot order.
    pub fn candidates(&self, dir: &Path) -> Result<Vec<NodeIdentity>> {
        let snapshot = self.snapshot(dir)?;
        Ok(claim_leaf_directories(&snapshot.children).owners)
    }

    /// Commit and push the selected projects of `dir`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSubmission`] for an empty message or a selection that
    /// matches nothing, and [`Error::SubmissionFailed`] with the per-item
    /// report when no project could be submitted.
    pub async fn submit(&self, dir: &Path, selection: &Selection, message: &str) -> Result<NodeReport> {
        if message.trim().is_empty() {
            return Err(Error::InvalidSubmission {
                message: "missing commit message".to_string(),
            });
        }

        let snapshot = self.snapshot(dir)?;
        let selected: Vec<NodeIdentity> = claim_leaf_directories(&snapshot.children)
            .owners
            .into_iter()
            .filter(|p| selection.matches(p))
            .collect();
        if selected.is_empty() {
            return Err(Error::InvalidSubmission {
                message: "no repositories matched the selection".to_string(),
            });
        }
        tracing::debug!(dir = %dir.display(), count = selected.len(), "submitting projects");

        let jobs = selected
            .into_iter()
            .map(|p| SubmitJob {
                dest: dir.join(&p.name),
                message: render_message(message, &p.name),
                name: p.name,
            })
            .collect();

        let vcs = Arc::clone(&self.vcs);
        let batch = BoundedExecutor::new(self.concurrency)?
            .run(jobs, move |job: SubmitJob| submit_one(Arc::clone(&vcs), job))
            .await?;
        let mut report = NodeReport::new(dir.to_path_buf(), snapshot.node);
        for item in &batch.results {
            report.push(match &item.result {
                Ok(outcome) => outcome.clone(),
                Err(e) => {
                    tracing::warn!(name = %item.label, error = %e, "submit failed");
                    ItemOutcome::error(&item.label, e.to_string())
                }
            });
        }
        let report = report.finish();

        match batch.into_result() {
            Ok(_) => Ok(report),
            Err(source) => Err(Error::SubmissionFailed {
                report: Box::new(report),
                source: Box::new(source),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Baitap03", Some("03"))]
    #[case("Session01 Lab 12 ", Some("12"))]
    #[case("final", None)]
    fn finds_trailing_digits(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(trailing_digits(name), expected);
    }

    #[test]
    fn message_template_uses_trailing_digits() {
        assert_eq!(
            render_message("Submit Session01 Baitap#", "Baitap07"),
            "Submit Session01 Baitap07"
        );
        assert_eq!(render_message("Fix #", "final"), "Fix ");
        assert_eq!(render_message("plain", "Lab2"), "plain");
    }

    #[test]
    fn number_list_ignores_garbage() {
        assert_eq!(
            Selection::parse_numbers("3, x,5,,7").unwrap(),
            Selection::Numbers(BTreeSet::from([3, 5, 7]))
        );
        assert!(Selection::parse_numbers("a,b").is_err());
    }

    #[test]
    fn numbers_match_numerically() {
        let selection = Selection::parse_numbers("3").unwrap();
        assert!(selection.matches(&NodeIdentity::new(1, "Lab03", "lab03")));
        assert!(!selection.matches(&NodeIdentity::new(2, "Lab13", "lab13")));
        assert!(!selection.matches(&NodeIdentity::new(3, "Intro", "intro")));
    }
}
