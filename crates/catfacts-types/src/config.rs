//! Configuration loading for the cat facts tree.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/cat-facts-tree/config.toml.

use config::{Config, Environment, File};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CatFactsError;

const APP_NAME: &str = "cat-facts-tree";

/// Settings for the remote fact source and its worker pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Endpoint returning `{"data": [{"fact": ...}]}`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Number of fetch jobs queued against the endpoint.
    /// One request returns every fact the API has today.
    #[serde(default = "default_job_count")]
    pub job_count: usize,

    /// Number of workers draining the job queue
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt before a transient failure sticks
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_endpoint() -> String {
    "https://catfact.ninja/facts?limit=1000".to_string()
}

fn default_job_count() -> usize {
    1
}

fn default_worker_count() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            job_count: default_job_count(),
            worker_count: default_worker_count(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl SourceSettings {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.job_count == 0 {
            return Err("job_count must be > 0".to_string());
        }
        if self.worker_count == 0 {
            return Err("worker_count must be > 0".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be > 0".to_string());
        }
        Ok(())
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to RocksDB storage directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// HTTP server host
    #[serde(default = "default_http_host")]
    pub http_host: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Fact source configuration
    #[serde(default)]
    pub source: SourceSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", APP_NAME)
        .map(|p| p.data_local_dir().join("db"))
        .unwrap_or_else(|| PathBuf::from("./data"))
        .to_string_lossy()
        .to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            http_port: default_http_port(),
            http_host: default_http_host(),
            log_level: default_log_level(),
            source: SourceSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/cat-facts-tree/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (CATFACTS_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, CatFactsError> {
        let config_dir = ProjectDirs::from("", "", APP_NAME)
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");
        let source_defaults = SourceSettings::default();

        let mut builder = Config::builder()
            // 1. Built-in defaults
            .set_default("db_path", default_db_path())
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("http_port", default_http_port() as i64)
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("http_host", default_http_host())
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("source.endpoint", source_defaults.endpoint)
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("source.job_count", source_defaults.job_count as i64)
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("source.worker_count", source_defaults.worker_count as i64)
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("source.timeout_secs", source_defaults.timeout_secs as i64)
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            .set_default("source.max_retries", source_defaults.max_retries as i64)
            .map_err(|e| CatFactsError::Config(e.to_string()))?
            // 2. Default config file
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        // 3. CLI-specified config file (higher precedence than default)
        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // 4. Environment variables (highest precedence before CLI flags)
        // Format: CATFACTS_DB_PATH, CATFACTS_HTTP_PORT, CATFACTS_SOURCE__WORKER_COUNT
        builder = builder.add_source(
            Environment::with_prefix("CATFACTS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| CatFactsError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| CatFactsError::Config(e.to_string()))?;

        settings.source.validate().map_err(CatFactsError::Config)?;
        Ok(settings)
    }

    /// Get the socket address for the HTTP server
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Expand ~ in db_path to actual home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            if let Some(dirs) = BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(&self.db_path)
    }
}
