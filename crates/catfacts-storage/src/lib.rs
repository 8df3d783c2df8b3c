//! Storage layer for the cat facts topic tree.
//!
//! Provides a RocksDB-backed [`FactStore`] with:
//! - Clean write: the facts table is dropped and rebuilt from a tree
//! - Incremental create: pre-classified records appended after the max id
//! - Fetch by topic through a secondary index
//! - Stats and manual compaction

pub mod column_families;
pub mod db;
pub mod error;
pub mod keys;

pub use db::{CreateReport, FactStore, FetchResult, StoreStats, ALL_KEY};
pub use error::StorageError;
pub use keys::{FactKey, TopicIndexKey};
