//! CLI argument parsing for the cat facts daemon.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};

/// Cat facts topic tree
///
/// Fetches cat facts, sorts them into a topic hierarchy and serves the
/// result over HTTP.
#[derive(Parser, Debug)]
#[command(name = "catfacts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/cat-facts-tree/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Daemon commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch facts, classify them and rebuild the store
    Build {
        /// Override database path
        #[arg(long)]
        db_path: Option<String>,

        /// Override the fact source endpoint
        #[arg(short, long)]
        endpoint: Option<String>,

        /// Number of fetch jobs to queue
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Number of fetch workers
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Serve the store over HTTP
    Serve {
        /// Override database path
        #[arg(long)]
        db_path: Option<String>,

        /// Override HTTP port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override HTTP host
        #[arg(long)]
        host: Option<String>,
    },

    /// Print stored records as JSON
    Fetch {
        /// Override database path
        #[arg(long)]
        db_path: Option<String>,

        /// `all` or comma-separated topic names
        #[arg(default_value = "all")]
        topics: String,
    },

    /// Append pre-classified records from a JSON file
    Add {
        /// Override database path
        #[arg(long)]
        db_path: Option<String>,

        /// File containing `{"new_cat_facts": [...]}`
        #[arg(short, long)]
        file: String,
    },

    /// Show store statistics
    Stats {
        /// Override database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Compact the store
    Compact {
        /// Override database path
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Classify facts given on the command line and print the tree
    Classify {
        /// Fact texts
        #[arg(required = true)]
        texts: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_build_overrides() {
        let cli = Cli::parse_from([
            "catfacts",
            "build",
            "--db-path",
            "/tmp/db",
            "-e",
            "http://localhost:1234/facts",
            "--jobs",
            "4",
            "-w",
            "2",
        ]);
        match cli.command {
            Commands::Build {
                db_path,
                endpoint,
                jobs,
                workers,
            } => {
                assert_eq!(db_path, Some("/tmp/db".to_string()));
                assert_eq!(endpoint, Some("http://localhost:1234/facts".to_string()));
                assert_eq!(jobs, Some(4));
                assert_eq!(workers, Some(2));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_serve_with_port() {
        let cli = Cli::parse_from(["catfacts", "serve", "-p", "9999"]);
        match cli.command {
            Commands::Serve { port, host, .. } => {
                assert_eq!(port, Some(9999));
                assert_eq!(host, None);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_cli_fetch_defaults_to_all() {
        let cli = Cli::parse_from(["catfacts", "fetch"]);
        match cli.command {
            Commands::Fetch { topics, .. } => assert_eq!(topics, "all"),
            _ => panic!("Expected Fetch command"),
        }

        let cli = Cli::parse_from(["catfacts", "fetch", "cat,health"]);
        match cli.command {
            Commands::Fetch { topics, .. } => assert_eq!(topics, "cat,health"),
            _ => panic!("Expected Fetch command"),
        }
    }

    #[test]
    fn test_cli_add_requires_file() {
        assert!(Cli::try_parse_from(["catfacts", "add"]).is_err());
        let cli = Cli::parse_from(["catfacts", "add", "-f", "facts.json"]);
        assert!(matches!(cli.command, Commands::Add { file, .. } if file == "facts.json"));
    }

    #[test]
    fn test_cli_classify_requires_text() {
        assert!(Cli::try_parse_from(["catfacts", "classify"]).is_err());
        let cli = Cli::parse_from(["catfacts", "classify", "Cats purr.", "Dogs bark."]);
        match cli.command {
            Commands::Classify { texts } => assert_eq!(texts.len(), 2),
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_cli_with_config_and_log_level() {
        let cli = Cli::parse_from([
            "catfacts",
            "--config",
            "/path/to/config.toml",
            "stats",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::Stats { .. }));
    }

    #[test]
    fn test_cli_compact() {
        let cli = Cli::parse_from(["catfacts", "compact", "--db-path", "/x"]);
        assert!(matches!(cli.command, Commands::Compact { db_path } if db_path.as_deref() == Some("/x")));
    }
}
