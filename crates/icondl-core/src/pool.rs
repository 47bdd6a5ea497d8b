//! Fixed-ceiling worker pool used for both jobs and downloads.
//!
//! Keeps up to `limit` tasks in flight; when one finishes the next item is
//! started, until the input is exhausted. Tasks never talk to each other.

use std::future::Future;
use tokio::task::{JoinError, JoinSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    /// Create a pool with the given ceiling (at least 1).
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Runs `task` for every item with at most `limit` running at once.
    ///
    /// Returns one entry per item in completion order; a panicking task shows
    /// up as `Err(JoinError)` without affecting the others.
    pub async fn run<I, F, Fut, T>(&self, items: I, mut task: F) -> Vec<Result<T, JoinError>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let mut pending = items.into_iter();
        let mut join_set = JoinSet::new();
        let mut results = Vec::new();

        loop {
            while join_set.len() < self.limit {
                let Some(item) = pending.next() else {
                    break;
                };
                join_set.spawn(task(item));
            }

            let Some(res) = join_set.join_next().await else {
                break;
            };
            results.push(res);
        }

        results
    }
}
