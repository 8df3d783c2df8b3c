//! Cat facts daemon
//!
//! Sorts cat facts into a weighted topic hierarchy and serves it over HTTP.
//!
//! # Usage
//!
//! ```bash
//! catfacts build [--db-path PATH] [--endpoint URL] [--jobs N] [--workers N]
//! catfacts serve [--port PORT] [--db-path PATH]
//! catfacts fetch [TOPICS]
//! catfacts add --file new_facts.json
//! catfacts stats
//! catfacts classify "Cats sleep a lot."
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/cat-facts-tree/config.toml)
//! 3. Environment variables (CATFACTS_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use catfacts_daemon::{
    handle_add, handle_build, handle_classify, handle_compact, handle_fetch, handle_serve,
    handle_stats, Cli, Commands, Overrides,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    let overrides = |db_path: Option<String>| Overrides {
        db_path,
        log_level: cli.log_level.clone(),
        ..Default::default()
    };

    match cli.command {
        Commands::Build {
            db_path,
            endpoint,
            jobs,
            workers,
        } => {
            let overrides = Overrides {
                endpoint,
                job_count: jobs,
                worker_count: workers,
                ..overrides(db_path)
            };
            handle_build(config, overrides).await?;
        }
        Commands::Serve {
            db_path,
            port,
            host,
        } => {
            let overrides = Overrides {
                http_port: port,
                http_host: host,
                ..overrides(db_path)
            };
            handle_serve(config, overrides).await?;
        }
        Commands::Fetch { db_path, topics } => {
            handle_fetch(config, overrides(db_path), &topics)?;
        }
        Commands::Add { db_path, file } => {
            handle_add(config, overrides(db_path), &file)?;
        }
        Commands::Stats { db_path } => {
            handle_stats(config, overrides(db_path))?;
        }
        Commands::Compact { db_path } => {
            handle_compact(config, overrides(db_path))?;
        }
        Commands::Classify { texts } => {
            handle_classify(cli.log_level.as_deref(), &texts)?;
        }
    }

    Ok(())
}
