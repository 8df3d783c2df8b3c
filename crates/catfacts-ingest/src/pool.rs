//! Fetch worker pool.
//!
//! Jobs (endpoints) go into a bounded queue sized to the job count. A fixed
//! number of workers drain it concurrently, and the pool waits for every
//! worker before returning. A failed or panicking job is logged and
//! contributes no facts; the worker moves on to the next job.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::source::FactSource;

/// What one pool run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    /// Facts from every successful job, in job order
    #[serde(skip)]
    pub facts: Vec<String>,
    /// Jobs queued
    pub jobs: usize,
    /// Jobs that returned facts
    pub succeeded: usize,
    /// Jobs that failed or were lost to a crashed worker
    pub failed: usize,
}

/// Pool of workers fetching from a shared source.
pub struct FetchPool {
    source: Arc<dyn FactSource>,
    worker_count: usize,
}

impl FetchPool {
    /// Create a pool with `worker_count` workers (at least one).
    pub fn new(source: Arc<dyn FactSource>, worker_count: usize) -> Self {
        Self {
            source,
            worker_count: worker_count.max(1),
        }
    }

    /// Run every job and wait for all workers.
    pub async fn run(&self, jobs: Vec<String>) -> PoolReport {
        let job_count = jobs.len();
        if job_count == 0 {
            return PoolReport::default();
        }

        let (tx, rx) = mpsc::channel::<(usize, String)>(job_count);
        for job in jobs.into_iter().enumerate() {
            // Capacity equals the job count and the receiver is alive.
            if tx.send(job).await.is_err() {
                break;
            }
        }
        drop(tx);

        let rx = Arc::new(Mutex::new(rx));
        let workers = self.worker_count.min(job_count);
        info!(jobs = job_count, workers, "Starting fetch workers");

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let rx = Arc::clone(&rx);
            let source = Arc::clone(&self.source);

            handles.push(tokio::spawn(async move {
                let mut done: Vec<(usize, Vec<String>)> = Vec::new();
                loop {
                    let next = rx.lock().await.recv().await;
                    let Some((job, endpoint)) = next else {
                        break;
                    };

                    debug!(worker_id, job, endpoint = %endpoint, "Fetching");
                    match AssertUnwindSafe(source.fetch(&endpoint)).catch_unwind().await {
                        Ok(Ok(facts)) => done.push((job, facts)),
                        Ok(Err(e)) => {
                            warn!(worker_id, job, endpoint = %endpoint, error = %e, "Fetch job failed");
                        }
                        Err(_) => {
                            error!(worker_id, job, endpoint = %endpoint, "Fetch job panicked");
                        }
                    }
                }
                done
            }));
        }

        let mut completed = Vec::with_capacity(job_count);
        for result in join_all(handles).await {
            match result {
                Ok(done) => completed.extend(done),
                Err(e) => error!(error = %e, "Fetch worker crashed"),
            }
        }
        completed.sort_by_key(|(job, _)| *job);

        let succeeded = completed.len();
        let facts: Vec<String> = completed.into_iter().flat_map(|(_, facts)| facts).collect();
        info!(
            succeeded,
            failed = job_count - succeeded,
            facts = facts.len(),
            "Finished fetching"
        );

        PoolReport {
            facts,
            jobs: job_count,
            succeeded,
            failed: job_count - succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::mock::MockFactSource;
    use async_trait::async_trait;

    #[tokio::test]
    async fn test_failing_job_does_not_abort_siblings() {
        let source = MockFactSource::new(["shared fact"])
            .with_endpoint("a", ["fact a"])
            .with_failure("b")
            .with_endpoint("c", ["fact c1", "fact c2"]);
        let pool = FetchPool::new(Arc::new(source), 2);

        let report = pool
            .run(vec!["a".to_string(), "b".to_string(), "c".to_string()])
            .await;
        assert_eq!(report.jobs, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.facts, vec!["fact a", "fact c1", "fact c2"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_job_runs_once_with_many_workers() {
        let source = Arc::new(MockFactSource::new(["x"]));
        let pool = FetchPool::new(source.clone(), 4);

        let jobs: Vec<String> = (0..10).map(|i| format!("job-{}", i)).collect();
        let report = pool.run(jobs).await;
        assert_eq!(source.calls(), 10);
        assert_eq!(report.facts.len(), 10);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_more_workers_than_jobs() {
        let source = Arc::new(MockFactSource::new(["x", "y"]));
        let pool = FetchPool::new(source.clone(), 8);
        let report = pool.run(vec!["only".to_string()]).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(report.facts, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn test_no_jobs() {
        let pool = FetchPool::new(Arc::new(MockFactSource::default()), 1);
        let report = pool.run(Vec::new()).await;
        assert_eq!(report, PoolReport::default());
    }

    struct PanickingSource;

    #[async_trait]
    impl FactSource for PanickingSource {
        async fn fetch(&self, endpoint: &str) -> Result<Vec<String>, SourceError> {
            if endpoint == "boom" {
                panic!("source exploded");
            }
            Ok(vec![endpoint.to_string()])
        }
    }

    #[tokio::test]
    async fn test_crashed_worker_loses_only_its_job() {
        let pool = FetchPool::new(Arc::new(PanickingSource), 2);
        let report = pool
            .run(vec!["boom".to_string(), "ok".to_string()])
            .await;
        assert_eq!(report.facts, vec!["ok"]);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_single_worker_survives_panicking_job() {
        let pool = FetchPool::new(Arc::new(PanickingSource), 1);
        let report = pool
            .run(vec!["ok1".to_string(), "boom".to_string(), "ok2".to_string()])
            .await;
        assert_eq!(report.facts, vec!["ok1", "ok2"]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
    }
}
