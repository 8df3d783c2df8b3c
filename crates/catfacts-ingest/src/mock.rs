//! In-memory fact source for tests and offline builds.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::SourceError;
use crate::source::FactSource;

/// Fact source serving fixed facts without network access.
///
/// Every endpoint returns the default batch unless it has its own batch or
/// is marked as failing.
#[derive(Debug, Default)]
pub struct MockFactSource {
    default_facts: Vec<String>,
    per_endpoint: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl MockFactSource {
    /// Create a source returning `facts` for every endpoint.
    pub fn new<I, S>(facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            default_facts: facts.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Serve a specific batch for one endpoint.
    pub fn with_endpoint<I, S>(mut self, endpoint: impl Into<String>, facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.per_endpoint
            .insert(endpoint.into(), facts.into_iter().map(Into::into).collect());
        self
    }

    /// Make an endpoint fail.
    pub fn with_failure(mut self, endpoint: impl Into<String>) -> Self {
        self.failing.insert(endpoint.into());
        self
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactSource for MockFactSource {
    async fn fetch(&self, endpoint: &str) -> Result<Vec<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(endpoint) {
            return Err(SourceError::Request(format!("mock failure for {}", endpoint)));
        }

        Ok(self
            .per_endpoint
            .get(endpoint)
            .unwrap_or(&self.default_facts)
            .clone())
    }
}
