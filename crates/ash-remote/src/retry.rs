//! Exponential backoff around any [`RemoteTree`]

use std::time::Duration;

use backoff::ExponentialBackoff;

use crate::{Error, LeafResource, NodeIdentity, RemoteTree, Result, SubNode};

/// How long and how often transient remote failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Total time budget across all attempts; the last error is returned after it
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(5),
            max_elapsed: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A single attempt with no waiting.
    pub fn disabled() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_interval: Duration::ZERO,
            max_elapsed: Duration::ZERO,
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            current_interval: self.initial_interval,
            max_interval: self.max_interval,
            max_elapsed_time: Some(self.max_elapsed),
            ..ExponentialBackoff::default()
        }
    }
}

/// Retries transient errors of the wrapped tree; permanent errors pass through
/// on the first occurrence.
#[derive(Debug, Clone)]
pub struct RetryingRemote<R> {
    inner: R,
    policy: RetryPolicy,
}

impl<R: RemoteTree> RetryingRemote<R> {
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    fn retry<T>(&self, what: &str, node_id: i64, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        if self.policy.max_elapsed.is_zero() {
            return op();
        }

        let attempt = || {
            op().map_err(|e| {
                if e.is_transient() {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        };
        let notify = |e: Error, wait: Duration| {
            tracing::warn!(
                node_id,
                request = what,
                error = %e,
                retry_in_ms = wait.as_millis() as u64,
                "transient remote failure, retrying"
            );
        };

        backoff::retry_notify(self.policy.backoff(), attempt, notify).map_err(|e| match e {
            backoff::Error::Permanent(e) => e,
            backoff::Error::Transient { err, .. } => err,
        })
    }
}

impl<R: RemoteTree> RemoteTree for RetryingRemote<R> {
    fn list_child_sub_nodes(&self, node_id: i64) -> Result<Vec<SubNode>> {
        self.retry("sub-nodes", node_id, || {
            self.inner.list_child_sub_nodes(node_id)
        })
    }

    fn list_child_leaf_resources(&self, node_id: i64) -> Result<Vec<LeafResource>> {
        self.retry("leaf resources", node_id, || {
            self.inner.list_child_leaf_resources(node_id)
        })
    }

    fn describe_node(&self, node_id: i64) -> Result<NodeIdentity> {
        self.retry("describe", node_id, || self.inner.describe_node(node_id))
    }
}
