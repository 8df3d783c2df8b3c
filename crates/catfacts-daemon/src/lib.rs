//! Cat facts daemon library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (build, serve, fetch, add, stats)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    add_from_file, build_tree, classify_texts, fetch_records, handle_add, handle_build,
    handle_classify, handle_compact, handle_fetch, handle_serve, handle_stats, init_logging,
    load_settings, open_store, store_stats, Overrides,
};
