//! End-to-end test infrastructure for the cat facts tree.
//!
//! Provides a shared TestHarness and helper functions for E2E tests
//! covering the full fetch -> classify -> store -> serve pipeline.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::Router;

use catfacts_ingest::{FactPipeline, MockFactSource};
use catfacts_service::{facts_router, AppState};
use catfacts_storage::FactStore;
use catfacts_topics::Classifier;
use catfacts_types::SourceSettings;

/// Facts with known classifications, one per built-in branch.
pub const SAMPLE_FACTS: &[&str] = &[
    "Cats are great hunters and very smart.",
    "Her fur is the softest I've ever felt.",
    "Kittens love playing with string.",
    "Owners should brush their pets.",
    "Their paws are very soft.",
    "Normal life expectancy is about 15 years.",
    "The sky is blue.",
    "This is a misc note.",
];

/// Shared test harness for E2E tests.
///
/// Owns a temporary store and hands out pipelines and routers over it.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Shared store instance
    pub store: Arc<FactStore>,
}

impl TestHarness {
    /// Create a new test harness with temp directory and store.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let store =
            Arc::new(FactStore::open(temp_dir.path()).expect("Failed to open test store"));

        Self {
            _temp_dir: temp_dir,
            store,
        }
    }

    /// HTTP router over this harness's store.
    pub fn router(&self) -> Router {
        facts_router(AppState::new(self.store.clone()))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline over an in-memory source serving `facts` for every job.
pub fn mock_pipeline(facts: &[&str], job_count: usize, worker_count: usize) -> FactPipeline {
    let settings = SourceSettings {
        endpoint: "mock://cat-facts".to_string(),
        job_count,
        worker_count,
        ..Default::default()
    };
    let source = Arc::new(MockFactSource::new(facts.iter().copied()));
    FactPipeline::new(source, Classifier::cat_facts(), &settings).expect("Failed to build pipeline")
}

/// GET request for the fetch route.
pub fn get_facts_request(topics: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/get_cat_facts/{}", topics))
        .body(Body::empty())
        .expect("Failed to build request")
}

/// POST request for the create route.
pub fn post_facts_request(body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/write_new_cat_fact")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// Collect a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}
