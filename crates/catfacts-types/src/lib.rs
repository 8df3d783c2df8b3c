//! # catfacts-types
//!
//! Shared domain types for the cat facts topic tree.
//!
//! This crate defines the core data structures used throughout the system:
//! - Classified facts and synthetic root nodes produced by the classifier
//! - The tree result grouping them by topic
//! - Stored fact records and incremental-create payloads
//! - Settings: layered configuration
//!
//! ## Usage
//!
//! ```rust
//! use catfacts_types::{ClassifiedFact, TreeResult};
//!
//! let mut tree = TreeResult::new();
//! tree.push_fact(ClassifiedFact::new("cat", 1, vec!["cat_root".into()], "Cats purr."));
//! assert_eq!(tree.fact_count(), 1);
//! ```

pub mod config;
pub mod error;
pub mod fact;
pub mod record;

pub use config::{Settings, SourceSettings};
pub use error::CatFactsError;
pub use fact::{root_key, ClassifiedFact, RootNode, TreeNode, TreeResult, ROOT_SUFFIX};
pub use record::{
    extract_new_facts, FactRecord, NewFact, Parents, RejectedFact, NEW_FACTS_KEY, NONE,
};
