//! Bounded fan-out of independent branches.
//!
//! A branch is one category or one text channel. Branches run as tokio tasks, at
//! most `workers` at a time, and never see each other's failures: a branch that
//! panics is logged and reported as such while its siblings keep running. Once the
//! run is cancelled no further branch is started.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// How a branch ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchOutcome<T> {
    Completed(T),
    /// The branch task panicked; the panic was logged.
    Panicked,
    /// The run was cancelled before the branch started.
    Skipped,
}

impl<T> BranchOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl WorkerPool {
    /// Creates a new WorkerPool.
    ///
    /// # Arguments
    /// - `workers` - Maximum number of branches running at once; zero acts as one
    /// - `cancel` - Run-wide cancellation token
    ///
    /// # Returns
    /// - `WorkerPool` - New pool instance
    pub fn new(workers: usize, cancel: CancellationToken) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Runs every branch and collects the outcomes in input order.
    ///
    /// Branch futures are lazy: each one only starts once a worker permit is free.
    ///
    /// # Arguments
    /// - `kind` - What a branch is, for log lines (e.g. "category")
    /// - `branches` - Branch name and future pairs
    ///
    /// # Returns
    /// - `Vec<BranchOutcome<T>>` - One outcome per branch, in the same order
    pub async fn fan_out<T, F>(
        &self,
        kind: &str,
        branches: Vec<(String, F)>,
    ) -> Vec<BranchOutcome<T>>
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
    {
        let mut handles = Vec::with_capacity(branches.len());

        for (name, branch) in branches {
            let permit = if self.cancel.is_cancelled() {
                None
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => None,
                    permit = self.semaphore.clone().acquire_owned() => permit.ok(),
                }
            };

            let handle = permit.map(|permit| {
                tokio::spawn(async move {
                    let _permit = permit;
                    branch.await
                })
            });
            handles.push((name, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let outcome = match handle {
                Some(handle) => match handle.await {
                    Ok(value) => BranchOutcome::Completed(value),
                    Err(e) => {
                        tracing::error!("{} branch {} panicked: {}", kind, name, e);
                        BranchOutcome::Panicked
                    }
                },
                None => {
                    tracing::debug!("Skipped {} {} after cancellation", kind, name);
                    BranchOutcome::Skipped
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
