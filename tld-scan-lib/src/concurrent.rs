//! Bounded concurrent dispatch of candidate lookups.
//!
//! One task is spawned per candidate. A semaphore caps how many of them
//! may be past the admission point at once, and a single collector drains
//! their results from a channel, so the result set has exactly one writer.

use crate::types::{CandidateQuery, ScanResult};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{trace, warn};

/// Runs one unit of work per candidate with at most `limit` in flight.
#[derive(Debug, Clone)]
pub struct ConcurrentProcessor {
    limit: usize,
}

impl ConcurrentProcessor {
    /// Create a new concurrent processor. A limit of 0 is treated as 1.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            limit: max_concurrency.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Process every candidate and return once all of them have a result.
    ///
    /// `on_result` is called from the collector as each result arrives, in
    /// completion order. The returned vector has exactly one entry per
    /// candidate: a task that dies without reporting is recorded as a failed
    /// (registered) result.
    pub async fn run<F, Fut, P>(
        &self,
        queries: Vec<CandidateQuery>,
        work: F,
        mut on_result: P,
    ) -> Vec<ScanResult>
    where
        F: Fn(CandidateQuery) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ScanResult> + Send + 'static,
        P: FnMut(&ScanResult),
    {
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let work = Arc::new(work);
        let (tx, mut rx) = mpsc::unbounded_channel::<ScanResult>();
        let mut workers = JoinSet::new();

        for query in queries.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let work = Arc::clone(&work);
            let tx = tx.clone();

            workers.spawn(async move {
                // Released when the task ends, however it ends.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                trace!(candidate = %query, "admitted");
                let result = (*work)(query).await;
                let _ = tx.send(result);
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(queries.len());
        while let Some(result) = rx.recv().await {
            on_result(&result);
            results.push(result);
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "lookup task did not complete");
            }
        }

        let reported: HashSet<String> = results.iter().map(|r| r.suffix.clone()).collect();
        for query in &queries {
            if !reported.contains(&query.suffix) {
                let result =
                    ScanResult::failed(query, None, "lookup task aborted".to_string());
                on_result(&result);
                results.push(result);
            }
        }

        results
    }
}
