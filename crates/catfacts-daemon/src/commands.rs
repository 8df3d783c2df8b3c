//! Command implementations for the cat facts daemon.
//!
//! Each `handle_*` function loads settings (defaults -> file -> env -> CLI),
//! initializes logging, does its work and prints JSON to stdout. The
//! undecorated functions below them hold the logic and are what tests call.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::signal;
use tracing::{error, info};

use catfacts_ingest::{BuildReport, FactPipeline};
use catfacts_service::{parse_topics, run_server_with_shutdown};
use catfacts_storage::{CreateReport, FactStore, FetchResult, StoreStats};
use catfacts_topics::Classifier;
use catfacts_types::{extract_new_facts, Settings, TreeResult};

/// CLI overrides applied on top of loaded settings.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub db_path: Option<String>,
    pub log_level: Option<String>,
    pub http_port: Option<u16>,
    pub http_host: Option<String>,
    pub endpoint: Option<String>,
    pub job_count: Option<usize>,
    pub worker_count: Option<usize>,
}

impl Overrides {
    /// Apply overrides (highest precedence).
    pub fn apply(self, settings: &mut Settings) {
        if let Some(db_path) = self.db_path {
            settings.db_path = db_path;
        }
        if let Some(log_level) = self.log_level {
            settings.log_level = log_level;
        }
        if let Some(port) = self.http_port {
            settings.http_port = port;
        }
        if let Some(host) = self.http_host {
            settings.http_host = host;
        }
        if let Some(endpoint) = self.endpoint {
            settings.source.endpoint = endpoint;
        }
        if let Some(jobs) = self.job_count {
            settings.source.job_count = jobs;
        }
        if let Some(workers) = self.worker_count {
            settings.source.worker_count = workers;
        }
    }
}

/// Load configuration and apply CLI overrides.
pub fn load_settings(config_path: Option<&str>, overrides: Overrides) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;
    overrides.apply(&mut settings);
    settings
        .source
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid source settings: {}", e))?;
    Ok(settings)
}

/// Initialize logging. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open the store named by the settings, creating parent directories.
pub fn open_store(settings: &Settings) -> Result<Arc<FactStore>> {
    let db_path = settings.expanded_db_path();
    info!("Opening storage at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let store = FactStore::open(&db_path).context("Failed to open storage")?;
    Ok(Arc::new(store))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", out);
    Ok(())
}

fn setup(config_path: Option<&str>, overrides: Overrides) -> Result<Settings> {
    let settings = load_settings(config_path, overrides)?;
    init_logging(&settings.log_level)?;
    Ok(settings)
}

// ==================== Build ====================

/// Fetch, classify and clean-write the store.
pub async fn build_tree(settings: &Settings) -> Result<BuildReport> {
    let store = open_store(settings)?;
    let pipeline =
        FactPipeline::from_settings(&settings.source).context("Failed to create pipeline")?;

    info!(
        endpoint = %settings.source.endpoint,
        jobs = settings.source.job_count,
        workers = settings.source.worker_count,
        "Building cat facts tree"
    );
    let report = pipeline
        .run_and_store(&store)
        .await
        .context("Failed to store cat facts tree")?;
    store.flush().context("Failed to flush storage")?;
    Ok(report)
}

pub async fn handle_build(config_path: Option<&str>, overrides: Overrides) -> Result<()> {
    let settings = setup(config_path, overrides)?;
    let report = build_tree(&settings).await?;
    print_json(&report)
}

// ==================== Serve ====================

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Serve the store over HTTP until Ctrl+C or SIGTERM.
pub async fn handle_serve(config_path: Option<&str>, overrides: Overrides) -> Result<()> {
    let settings = setup(config_path, overrides)?;

    info!("Cat facts server starting...");
    info!("  Database path: {}", settings.db_path);
    info!("  HTTP address: {}", settings.http_addr());

    let store = open_store(&settings)?;
    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    run_server_with_shutdown(addr, store, shutdown_signal())
        .await
        .context("Server error")
}

// ==================== Store commands ====================

/// Read stored records for `all` or a comma-separated topic list.
pub fn fetch_records(settings: &Settings, topics: &str) -> Result<FetchResult> {
    let store = open_store(settings)?;
    let filter = parse_topics(topics);
    store
        .fetch(filter.as_deref())
        .context("Failed to fetch records")
}

pub fn handle_fetch(config_path: Option<&str>, overrides: Overrides, topics: &str) -> Result<()> {
    let settings = setup(config_path, overrides)?;
    print_json(&fetch_records(&settings, topics)?)
}

/// Append records from a `{"new_cat_facts": [...]}` file.
pub fn add_from_file(settings: &Settings, file: &Path) -> Result<CreateReport> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let body: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", file.display()))?;
    let records = extract_new_facts(body)?;

    let store = open_store(settings)?;
    let report = store.create(records).context("Failed to store records")?;
    store.flush().context("Failed to flush storage")?;
    Ok(report)
}

pub fn handle_add(config_path: Option<&str>, overrides: Overrides, file: &str) -> Result<()> {
    let settings = setup(config_path, overrides)?;
    print_json(&add_from_file(&settings, Path::new(file))?)
}

pub fn store_stats(settings: &Settings) -> Result<StoreStats> {
    let store = open_store(settings)?;
    store.stats().context("Failed to read statistics")
}

pub fn handle_stats(config_path: Option<&str>, overrides: Overrides) -> Result<()> {
    let settings = setup(config_path, overrides)?;
    print_json(&store_stats(&settings)?)
}

pub fn handle_compact(config_path: Option<&str>, overrides: Overrides) -> Result<()> {
    let settings = setup(config_path, overrides)?;
    let store = open_store(&settings)?;
    store.compact().context("Compaction failed")?;
    info!(path = %store.path().display(), "Compacted storage");
    print_json(&store.stats().context("Failed to read statistics")?)
}

// ==================== Classify ====================

/// Classify ad-hoc facts with the built-in model.
pub fn classify_texts(texts: &[String]) -> TreeResult {
    Classifier::cat_facts().classify(texts)
}

pub fn handle_classify(log_level: Option<&str>, texts: &[String]) -> Result<()> {
    init_logging(log_level.unwrap_or("warn"))?;
    print_json(&classify_texts(texts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn test_settings(dir: &TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.db_path = dir.path().join("db").to_string_lossy().to_string();
        settings
    }

    #[test]
    fn test_overrides_apply() {
        let mut settings = Settings::default();
        Overrides {
            db_path: Some("/x".to_string()),
            http_port: Some(1234),
            job_count: Some(5),
            worker_count: Some(3),
            endpoint: Some("http://e".to_string()),
            ..Default::default()
        }
        .apply(&mut settings);

        assert_eq!(settings.db_path, "/x");
        assert_eq!(settings.http_port, 1234);
        assert_eq!(settings.source.job_count, 5);
        assert_eq!(settings.source.worker_count, 3);
        assert_eq!(settings.source.endpoint, "http://e");
        assert_eq!(settings.http_host, "0.0.0.0");
    }

    #[test]
    fn test_load_settings_rejects_zero_workers() {
        let result = load_settings(
            None,
            Overrides {
                worker_count: Some(0),
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_then_fetch_and_stats() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"new_cat_facts": [{{"depth": 1, "topic": "cat", "fact": "Cats purr."}}, {{"topic": "cat"}}]}}"#
        )
        .unwrap();

        let report = add_from_file(&settings, file.path()).unwrap();
        assert_eq!(report.ids, vec![0]);
        assert_eq!(report.rejected.len(), 1);

        let records = fetch_records(&settings, "cat").unwrap();
        assert_eq!(records["cat"][0].parents, "none");

        let stats = store_stats(&settings).unwrap();
        assert_eq!(stats.record_count, 1);
    }

    #[test]
    fn test_add_rejects_body_without_key() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"facts": []}}"#).unwrap();
        assert!(add_from_file(&settings, file.path()).is_err());
    }

    #[test]
    fn test_classify_texts() {
        let tree = classify_texts(&["Cats are great hunters and very smart.".to_string()]);
        assert_eq!(tree.facts("cat").len(), 1);
        assert!(tree.has_root("cat"));
    }
}
