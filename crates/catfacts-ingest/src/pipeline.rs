//! Build pipeline: fetch, classify once, optionally persist.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use catfacts_storage::FactStore;
use catfacts_topics::{ClassificationStats, Classifier};
use catfacts_types::{SourceSettings, TreeResult};

use crate::error::SourceError;
use crate::pool::{FetchPool, PoolReport};
use crate::source::{FactSource, HttpFactSource};

/// Summary of one build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Fetch outcome
    pub fetch: PoolReport,
    /// Facts handed to the classifier
    pub facts_fetched: usize,
    /// Classification counters
    pub classification: ClassificationStats,
    /// Records written by the clean write (0 when not persisted)
    pub records_written: usize,
}

/// Fetches every queued job, then classifies the combined batch.
pub struct FactPipeline {
    pool: FetchPool,
    classifier: Classifier,
    jobs: Vec<String>,
}

impl FactPipeline {
    /// Create a pipeline over any source.
    ///
    /// The endpoint is queued `job_count` times.
    pub fn new(
        source: Arc<dyn FactSource>,
        classifier: Classifier,
        settings: &SourceSettings,
    ) -> Result<Self, SourceError> {
        settings.validate().map_err(SourceError::Config)?;

        Ok(Self {
            pool: FetchPool::new(source, settings.worker_count),
            classifier,
            jobs: vec![settings.endpoint.clone(); settings.job_count],
        })
    }

    /// Create a pipeline fetching over HTTP with the built-in model.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, SourceError> {
        let source = HttpFactSource::from_settings(settings)?;
        Self::new(Arc::new(source), Classifier::cat_facts(), settings)
    }

    /// Replace the job list with explicit endpoints.
    pub fn with_jobs(mut self, jobs: Vec<String>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Fetch and classify without persisting.
    pub async fn run(&self) -> TreeResult {
        self.build().await.0
    }

    /// Fetch, classify and replace the store contents with the result.
    #[instrument(skip(self, store))]
    pub async fn run_and_store(&self, store: &FactStore) -> Result<BuildReport, SourceError> {
        let (tree, mut report) = self.build().await;
        report.records_written = store.write_clean(&tree)?;
        info!(records = report.records_written, "Build stored");
        Ok(report)
    }

    async fn build(&self) -> (TreeResult, BuildReport) {
        let fetch = self.pool.run(self.jobs.clone()).await;
        let facts_fetched = fetch.facts.len();
        info!(
            facts = facts_fetched,
            "Building tree hierarchy using weighted keyword model"
        );

        let (tree, classification) = self.classifier.classify_with_stats(&fetch.facts);

        let report = BuildReport {
            fetch,
            facts_fetched,
            classification,
            records_written: 0,
        };
        (tree, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockFactSource;
    use tempfile::TempDir;

    fn settings(job_count: usize, worker_count: usize) -> SourceSettings {
        SourceSettings {
            endpoint: "mock://facts".to_string(),
            job_count,
            worker_count,
            ..Default::default()
        }
    }

    fn source() -> Arc<MockFactSource> {
        Arc::new(MockFactSource::new([
            "Cats are great hunters and very smart.",
            "Her fur is the softest I've ever felt.",
            "The sky is blue.",
        ]))
    }

    #[tokio::test]
    async fn test_run_concatenates_jobs_and_classifies_once() {
        let source = source();
        let pipeline =
            FactPipeline::new(source.clone(), Classifier::cat_facts(), &settings(3, 2)).unwrap();

        let tree = pipeline.run().await;
        assert_eq!(source.calls(), 3);
        assert_eq!(tree.facts("cat").len(), 3);
        assert_eq!(tree.facts("appearance").len(), 3);
        assert_eq!(tree.root_count(), 1);
    }

    #[tokio::test]
    async fn test_run_and_store_reports_counts() {
        let temp = TempDir::new().unwrap();
        let store = FactStore::open(temp.path()).unwrap();
        let pipeline =
            FactPipeline::new(source(), Classifier::cat_facts(), &settings(1, 1)).unwrap();

        let report = pipeline.run_and_store(&store).await.unwrap();
        assert_eq!(report.facts_fetched, 3);
        assert_eq!(report.classification.classified, 2);
        assert_eq!(report.classification.dropped, 1);
        // Two facts plus the cat root.
        assert_eq!(report.records_written, 3);
        assert_eq!(store.max_id().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_failed_jobs_still_build() {
        let source = Arc::new(
            MockFactSource::new(["Cats purr."])
                .with_failure("bad"),
        );
        let pipeline = FactPipeline::new(source, Classifier::cat_facts(), &settings(1, 2))
            .unwrap()
            .with_jobs(vec!["bad".to_string(), "good".to_string()]);

        let temp = TempDir::new().unwrap();
        let store = FactStore::open(temp.path()).unwrap();
        let report = pipeline.run_and_store(&store).await.unwrap();
        assert_eq!(report.fetch.failed, 1);
        assert_eq!(report.classification.classified, 1);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = FactPipeline::new(source(), Classifier::cat_facts(), &settings(0, 1));
        assert!(matches!(result, Err(SourceError::Config(_))));
    }
}
