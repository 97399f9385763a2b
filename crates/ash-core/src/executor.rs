//! Bounded Action Executor
//!
//! Runs one action per item with at most `limit` actions in flight. A
//! counting semaphore admits each item; the permit travels into the task and
//! is released when the task ends, whether it returned an error or panicked.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{ActionError, Error, Result};

/// Items of a batch carry the label their result is reported under.
pub trait BatchItem {
    fn label(&self) -> String;
}

/// Result of one item.
#[derive(Debug)]
pub struct ItemResult<O> {
    pub label: String,
    pub result: std::result::Result<O, ActionError>,
}

/// Every item's result, sorted by label.
#[derive(Debug)]
pub struct BatchOutcome<O> {
    pub results: Vec<ItemResult<O>>,
}

impl<O> BatchOutcome<O> {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_err()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.len() - self.failed()
    }

    /// Fails only when the batch was non-empty and nothing succeeded.
    pub fn into_result(mut self) -> Result<Self> {
        if self.is_empty() || self.succeeded() > 0 {
            return Ok(self);
        }
        if self.len() == 1
            && let Some(ItemResult {
                result: Err(e), ..
            }) = self.results.pop()
        {
            return Err(Error::Action(e));
        }
        Err(Error::AllActionsFailed { count: self.len() })
    }
}

/// Fixed-size admission gate for independent per-item actions.
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    gate: Arc<Semaphore>,
    limit: usize,
}

impl BoundedExecutor {
    /// # Errors
    ///
    /// [`Error::InvalidOptions`] for a limit of zero, which would never admit
    /// anything.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(Error::InvalidOptions {
                message: "concurrency limit must be at least 1".to_string(),
            });
        }
        Ok(Self {
            gate: Arc::new(Semaphore::new(limit)),
            limit,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `action` once per item and collect every result.
    ///
    /// One item failing or panicking never cancels its siblings.
    ///
    /// # Errors
    ///
    /// [`Error::ExecutorUnavailable`] if the gate was closed or a worker could
    /// not report back.
    pub async fn run<T, O, F, Fut>(&self, items: Vec<T>, action: F) -> Result<BatchOutcome<O>>
    where
        T: BatchItem + Send + 'static,
        O: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<O, ActionError>> + Send + 'static,
    {
        let action = Arc::new(action);
        let mut workers = JoinSet::new();

        for item in items {
            let permit = self
                .gate
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::ExecutorUnavailable {
                    message: e.to_string(),
                })?;
            let action = Arc::clone(&action);
            let label = item.label();

            workers.spawn(async move {
                let _permit = permit;
                let result = tokio::spawn(async move { action(item).await })
                    .await
                    .map_err(ActionError::from_join)
                    .and_then(|r| r);
                if let Err(e) = &result {
                    tracing::debug!(item = %label, error = %e, "action failed");
                }
                ItemResult { label, result }
            });
        }

        let mut results = Vec::with_capacity(workers.len());
        while let Some(joined) = workers.join_next().await {
            let item = joined.map_err(|e| Error::ExecutorUnavailable {
                message: e.to_string(),
            })?;
            results.push(item);
        }
        results.sort_by(|a, b| a.label.cmp(&b.label));

        Ok(BatchOutcome { results })
    }
}
