//! Fact sources.
//!
//! A [`FactSource`] turns an endpoint into a batch of raw fact strings. The
//! HTTP implementation expects the `{"data": [{"fact": "..."}]}` shape and
//! retries transient failures with exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, warn};

use catfacts_types::SourceSettings;

use crate::error::SourceError;

/// Supplies raw fact strings for one fetch job.
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Fetch every fact available at the endpoint.
    async fn fetch(&self, endpoint: &str) -> Result<Vec<String>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct FactsResponse {
    data: Vec<FactItem>,
}

#[derive(Debug, Deserialize)]
struct FactItem {
    fact: String,
}

/// Fact source backed by an HTTP JSON endpoint.
pub struct HttpFactSource {
    client: Client,
    max_retries: u32,
    initial_backoff: Duration,
}

impl HttpFactSource {
    /// Create a source with a per-request timeout and retry budget.
    ///
    /// `max_retries` counts requests after the first one, so a job makes at
    /// most `max_retries + 1` attempts.
    pub fn new(timeout: Duration, max_retries: u32) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Config(e.to_string()))?;

        Ok(Self {
            client,
            max_retries,
            initial_backoff: Duration::from_millis(500),
        })
    }

    /// Create a source from settings.
    pub fn from_settings(settings: &SourceSettings) -> Result<Self, SourceError> {
        Self::new(Duration::from_secs(settings.timeout_secs), settings.max_retries)
    }

    /// Override the first retry delay.
    pub fn with_initial_backoff(mut self, delay: Duration) -> Self {
        self.initial_backoff = delay;
        self
    }

    /// Make a single request.
    async fn fetch_once(&self, endpoint: &str) -> Result<Vec<String>, SourceError> {
        let response = self.client.get(endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: FactsResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(body.data.into_iter().map(|item| item.fact).collect())
    }
}

#[async_trait]
impl FactSource for HttpFactSource {
    async fn fetch(&self, endpoint: &str) -> Result<Vec<String>, SourceError> {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, endpoint, "Fetching facts");

            match self.fetch_once(endpoint).await {
                Ok(facts) => {
                    debug!(count = facts.len(), endpoint, "Fetched facts");
                    return Ok(facts);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    if attempts > self.max_retries {
                        error!(error = %e, endpoint, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Fetch failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}
