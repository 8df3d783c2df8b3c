//! # catfacts-ingest
//!
//! Acquires raw cat facts and turns them into a classified tree.
//!
//! - [`FactSource`]: async trait over anything that yields fact strings,
//!   with an HTTP implementation and an in-memory mock
//! - [`FetchPool`]: bounded job queue drained by concurrent workers
//! - [`FactPipeline`]: fetch, classify once, optionally clean-write the store

pub mod error;
pub mod mock;
pub mod pipeline;
pub mod pool;
pub mod source;

pub use error::SourceError;
pub use mock::MockFactSource;
pub use pipeline::{BuildReport, FactPipeline};
pub use pool::{FetchPool, PoolReport};
pub use source::{FactSource, HttpFactSource};
